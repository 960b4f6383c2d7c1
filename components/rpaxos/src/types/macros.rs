/// Create a `Value` from an id and a str payload.
///
/// Example:
/// ```
/// #[macro_use] extern crate rpaxos;
/// use rpaxos::types::*;
///
/// let v = value!(3, "foo");
/// assert_eq!(3, v.value_id());
/// ```
#[macro_export]
#[allow(unused_macros)]
macro_rules! value {
    ($id:expr, $payload:expr) => {
        Value::from(($id as u64, $payload))
    };
}

/// Create a fail list of a BATCH command: `[(iid, highest_promised), ...]`.
#[macro_export]
#[allow(unused_macros)]
macro_rules! fails {
    [$(($iid:expr, $promised:expr)),* $(,)*] => {
        vec![$(BatchFail {
            instance_id: $iid as u64,
            highest_promised: $promised as u64,
        }),*]
    }
}
