use bytes::Bytes;

use crate::codec::LogicalValue;
use crate::ring::ProtocolError;
use crate::types::*;

pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::Malformed(field, reason.into())
}

/// expect_list returns the elements of a list of exactly `n` elements.
pub(crate) fn expect_list<'a>(
    v: &'a LogicalValue,
    n: usize,
    field: &'static str,
) -> Result<&'a [LogicalValue], ProtocolError> {
    let l = v
        .as_list()
        .ok_or_else(|| malformed(field, format!("expect list, got {}", v.type_name())))?;

    if l.len() != n {
        return Err(malformed(
            field,
            format!("expect {} elements, got {}", n, l.len()),
        ));
    }
    Ok(l)
}

pub(crate) fn expect_int(v: &LogicalValue, field: &'static str) -> Result<u64, ProtocolError> {
    v.as_int()
        .ok_or_else(|| malformed(field, format!("expect int, got {}", v.type_name())))
}

/// expect_valid_int is `expect_int` for an id that must not be the invalid id 0.
pub(crate) fn expect_valid_int(v: &LogicalValue, field: &'static str) -> Result<u64, ProtocolError> {
    let i = expect_int(v, field)?;
    if i == 0 {
        return Err(malformed(field, "must not be 0"));
    }
    Ok(i)
}

/// expect_ballot is `expect_int` for a ballot a host may have to raise: it must not be greater
/// than `MAX_BALLOT`.
pub(crate) fn expect_ballot(
    v: &LogicalValue,
    field: &'static str,
) -> Result<BallotId, ProtocolError> {
    let b = expect_int(v, field)?;
    if b > MAX_BALLOT {
        return Err(malformed(field, format!("{} > max ballot {}", b, MAX_BALLOT)));
    }
    Ok(b)
}

/// expect_valid_ballot is `expect_ballot` for a ballot that must not be the invalid ballot 0.
pub(crate) fn expect_valid_ballot(
    v: &LogicalValue,
    field: &'static str,
) -> Result<BallotId, ProtocolError> {
    let b = expect_ballot(v, field)?;
    if b == INVALID_BALLOT {
        return Err(malformed(field, "must not be 0"));
    }
    Ok(b)
}

pub(crate) fn expect_bytes(v: &LogicalValue, field: &'static str) -> Result<Bytes, ProtocolError> {
    v.as_bytes()
        .cloned()
        .ok_or_else(|| malformed(field, format!("expect bytes, got {}", v.type_name())))
}

/// A value is `[value_id, payload]`.
pub fn value_to_logical(v: &Value) -> LogicalValue {
    lv_list![v.value_id(), v.payload().clone()]
}

pub fn value_from_logical(v: &LogicalValue) -> Result<Value, ProtocolError> {
    let l = expect_list(v, 2, "value")?;
    let value_id = expect_valid_int(&l[0], "value_id")?;
    let payload = expect_bytes(&l[1], "payload")?;
    Ok(Value::new(value_id, payload))
}
