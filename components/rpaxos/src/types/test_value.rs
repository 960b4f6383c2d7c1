use super::*;

#[test]
fn test_value_invalid() {
    let v = Value::invalid();
    assert!(!v.is_valid());
    assert_eq!(INVALID_VALUE, v.value_id());
    assert_eq!(v, Value::default());
}

#[test]
fn test_value_from() {
    let v = value!(5, "foo");
    assert!(v.is_valid());
    assert_eq!(5, v.value_id());
    assert_eq!(&b"foo"[..], &v.payload()[..]);

    let w: Value = (5, b"foo".to_vec()).into();
    assert_eq!(v, w);

    assert_eq!("Value{id:5, len:3}", format!("{:?}", v));
}

#[test]
fn test_value_noop() {
    let n = Value::noop(3);
    assert!(n.is_valid());
    assert!(n.is_noop());
    assert_eq!(3, guid_host(n.value_id()));
    assert!(n.payload().is_empty());

    assert!(Value::noop(0).is_valid());
    assert!(!value!(5, "foo").is_noop());

    let g = GuidGenerator::new(3);
    assert!(!is_noop_guid(g.next()));
}
