//! Scenario tests for the sparse ordered vector

use std::cmp::Ordering;

use ordered_collections::{
    CollectionError, Result, SortOrder, Value, ValueKind, Vector, TYPE_I32, TYPE_STRING,
};

#[test]
fn test_marklar_set_and_remove() -> Result<()> {
    let mut vector = Vector::new(&TYPE_STRING);
    vector.set_entry(4, None, Value::from("marklar"), None)?;
    vector.set_entry(5, None, Value::Null, None)?;

    let node = vector.get_entry(4).expect("slot 4 is allocated");
    assert_eq!(node.value(), &Value::from("marklar"));

    vector.remove(4);
    assert_eq!(vector.len(), 1);
    assert!(vector.get_value(4).is_none());
    // The null entry shifted down into slot 4.
    assert_eq!(vector.get_entry(4).map(|n| n.value().kind()), Some(ValueKind::Null));
    vector.verify_links()
}

#[test]
fn test_gap_is_not_listed() -> Result<()> {
    let mut vector = Vector::new(&TYPE_I32);
    for i in 1..100i32 {
        vector.set_entry((i + 99) as usize, None, Value::I32(i), None)?;
    }
    for i in (-99..=-1i32).rev() {
        vector.set_entry((i + 99) as usize, None, Value::I32(i), None)?;
    }

    assert_eq!(vector.capacity(), 199);
    assert_eq!(vector.len(), 198);
    assert!(vector.get_entry(99).is_none());

    let list = vector.to_list();
    assert_eq!(list.len(), 198);
    assert_eq!(list[0], &Value::I32(-99));
    assert_eq!(list[197], &Value::I32(99));
    vector.verify_links()
}

#[test]
fn test_mostly_empty_vector_operations() -> Result<()> {
    let mut vector = Vector::with_capacity(&TYPE_STRING, 8)?;
    vector.set_entry(2, None, Value::from("lonely"), None)?;

    assert!(!vector.to_string().is_empty());
    assert_eq!(vector.to_list().len(), 1);
    assert!(vector.to_xml("root", true).starts_with("<root>"));
    assert_eq!(vector.sort(SortOrder::Ascending).len(), 1);
    assert_eq!(vector.sort(SortOrder::Descending).len(), 1);

    let empty = Vector::new(&TYPE_STRING);
    assert_eq!(vector.compare(&empty), Ordering::Greater);
    assert_eq!(empty.compare(&vector), Ordering::Less);

    let copy = vector.copy();
    assert_eq!(vector.compare(&copy), Ordering::Equal);
    Ok(())
}

#[test]
fn test_json_array_parse_and_render() -> Result<()> {
    let vector = Vector::from_json(r#"["value1",false,null]"#)?;
    assert_eq!(vector.len(), 3);
    assert_eq!(vector.get_value(0), Some(&Value::from("value1")));
    assert_eq!(vector.get_value(1), Some(&Value::Bool(false)));
    assert!(vector.get_value(2).is_none());
    assert_eq!(vector.to_json(), "[\n  \"value1\",\n  false,\n  null\n]");

    let reparsed = Vector::from_json(&vector.to_json())?;
    assert_eq!(reparsed.compare(&vector), Ordering::Equal);
    Ok(())
}

#[test]
fn test_nested_json_paths() -> Result<()> {
    let vector = Vector::from_json("[1, [2, [3, 4]], {\"k\": \"v\"}]")?;
    assert_eq!(vector.get_path("[1][1][0]").map(|n| n.value()), Some(&Value::I64(3)));
    let table = vector.get_value(2).and_then(Value::as_hash_table).expect("object element");
    assert_eq!(table.get_value(&"k".into()), Some(&Value::from("v")));
    Ok(())
}

#[test]
fn test_keyed_json_round_trips_in_place() -> Result<()> {
    let vector = Vector::from_json_object(
        r#"{"myVector1":{"key1":"value1","key2":"value2"},"key3":"value3"}"#,
    )?;
    assert_eq!(vector.len(), 2);

    let bytes = vector.to_bytes()?;
    let decoded = Vector::from_bytes(&bytes, true)?;
    assert!(decoded.is_complete());
    assert_eq!(decoded.consumed, bytes.len());
    let decoded = decoded.value;

    let value = decoded.get_value_by_key(&"key3".into()).expect("key3 present");
    assert_eq!(value, &Value::from("value3"));
    assert!(value.is_borrowed());

    let nested = decoded
        .get_value_by_key(&"myVector1".into())
        .and_then(Value::as_vector)
        .expect("nested keyed vector");
    assert_eq!(nested.get_value_by_key(&"key1".into()), Some(&Value::from("value1")));
    assert_eq!(decoded.compare(&vector), Ordering::Equal);
    Ok(())
}

#[test]
fn test_sparse_vector_decodes_compactly() -> Result<()> {
    let mut vector = Vector::new(&TYPE_I32);
    vector.set_entry(3, None, Value::I32(30), None)?;
    vector.set_entry(10, None, Value::from("ten"), None)?;

    let bytes = vector.to_bytes()?;
    let decoded = Vector::from_bytes_owned(&bytes)?.into_result()?;
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.get_value(0), Some(&Value::I32(30)));
    assert_eq!(decoded.get_value(1), Some(&Value::from("ten")));
    assert!(decoded.get_entry(0).unwrap().key().is_none());
    Ok(())
}

#[test]
fn test_truncated_input_keeps_prefix() -> Result<()> {
    let mut vector = Vector::new(&TYPE_STRING);
    for word in ["alpha", "beta", "gamma"] {
        vector.add_entry(Some(word.into()), Value::from(word), None)?;
    }
    let bytes = vector.to_bytes()?;
    let cut = &bytes[..bytes.len() - 3];

    let decoded = Vector::from_bytes(cut, false)?;
    assert_eq!(decoded.value.len(), 2);
    assert!(matches!(decoded.error, Some(CollectionError::Truncated { .. })));
    // Header plus two `i16 type, u64 len + text, u64 len + key` entries.
    let two_entries = 16 + (2 + 8 + 5 + 8 + 5) + (2 + 8 + 4 + 8 + 4);
    assert_eq!(decoded.consumed, two_entries);
    decoded.value.verify_links()
}

#[test]
fn test_header_errors_fail_outright() {
    assert!(Vector::from_bytes(&[], false).is_err());
    assert!(Vector::from_bytes(&[0x44, 0x53, 9, 0, 0, 0], false).is_err());
}

#[test]
fn test_write_to_matches_to_bytes() -> Result<()> {
    let mut vector = Vector::new(&TYPE_I32);
    vector.add_entry(None, Value::I32(1), None)?;
    vector.add_entry(None, Value::from(vec![1u8, 2, 3]), None)?;

    let mut sink = Vec::new();
    let written = vector.write_to(&mut sink)?;
    assert_eq!(written as usize, sink.len());
    assert_eq!(sink, vector.to_bytes()?);
    Ok(())
}
