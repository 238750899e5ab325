//! Scenario tests for the globally ordered hash table

use std::cmp::Ordering;

use ordered_collections::types::ValueKind;
use ordered_collections::{
    registry, CollectionConfig, Config, HashTable, Result, Value, Vector, TYPE_I32, TYPE_STRING,
};

fn words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("word-{:04}", i)).collect()
}

#[test]
fn test_nested_json_round_trip_in_place() -> Result<()> {
    let table = HashTable::from_json(
        r#"{"myVector1":{"key1":"value1","key2":"value2"},"key3":"value3"}"#,
    )?;
    let bytes = table.to_bytes()?;
    let decoded = HashTable::from_bytes(&bytes, true)?.into_result()?;

    assert_eq!(decoded.get_value(&"key3".into()), Some(&Value::from("value3")));
    let nested = decoded
        .get_value(&"myVector1".into())
        .and_then(Value::as_hash_table)
        .expect("nested table");
    assert_eq!(nested.get_value(&"key1".into()), Some(&Value::from("value1")));
    assert_eq!(nested.get_value(&"key2".into()), Some(&Value::from("value2")));
    Ok(())
}

#[test]
fn test_iteration_visits_every_entry_once() -> Result<()> {
    let mut table = HashTable::new(&TYPE_STRING, 64);
    let keys = words(1000);
    for (i, key) in keys.iter().enumerate() {
        table.add_entry(Value::from(key.as_str()), Value::I32(i as i32), None)?;
    }
    assert_eq!(table.len(), 1000);

    let mut seen: Vec<&str> = table.keys().filter_map(Value::as_str).collect();
    assert_eq!(seen.len(), 1000);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 1000);

    let forward: Vec<_> = table.keys().collect();
    let mut backward: Vec<_> = table.iter().rev().map(|n| n.key()).collect();
    backward.reverse();
    assert_eq!(forward, backward);
    table.verify_links()
}

#[test]
fn test_removing_whole_buckets_keeps_chain() -> Result<()> {
    let mut table = HashTable::new(&TYPE_I32, 64);
    for i in 0..640 {
        table.add_entry(Value::I32(i), Value::I32(i), None)?;
    }
    let layout = table.bucket_layout();

    // Empty every other non-empty bucket completely.
    let doomed: Vec<usize> = layout.iter().step_by(2).map(|(bucket, _)| *bucket).collect();
    let victims: Vec<Value<'static>> = table
        .iter()
        .filter(|node| doomed.contains(&bucket_of(&table, node.key())))
        .map(|node| node.key().to_owned_value())
        .collect();
    for key in &victims {
        assert!(table.remove_entry(key).is_some());
        table.verify_links()?;
    }
    assert_eq!(table.len(), 640 - victims.len());
    assert_eq!(table.bucket_layout().len(), layout.len() - doomed.len());
    Ok(())
}

fn bucket_of(table: &HashTable<'_>, key: &Value<'_>) -> usize {
    ordered_collections::hash_map::bucket_index(table.key_type().hash(key), table.bucket_count())
}

#[test]
fn test_custom_hash_and_order() -> Result<()> {
    fn by_length(a: &Value<'_>, b: &Value<'_>) -> Ordering {
        let (a, b) = (a.as_str().unwrap_or(""), b.as_str().unwrap_or(""));
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
    fn single_bucket(_: &Value<'_>) -> u64 {
        0
    }
    let key_type = registry().register(
        "hash_table_test_length_ordered",
        ValueKind::Str,
        by_length,
        Some(single_bucket),
    )?;

    let mut table = HashTable::new(key_type, 0);
    for key in ["ccc", "a", "bb", "dddd", "ab"] {
        table.add_entry(Value::from(key), Value::Null, None)?;
    }
    assert_eq!(table.bucket_layout(), vec![(0, 5)]);
    let order: Vec<&str> = table.keys().filter_map(Value::as_str).collect();
    assert_eq!(order, vec!["a", "ab", "bb", "ccc", "dddd"]);

    let bytes = table.to_bytes()?;
    let decoded = HashTable::from_bytes(&bytes, true)?.into_result()?;
    assert_eq!(decoded.key_type(), key_type.no_copy());
    let order: Vec<&str> = decoded.keys().filter_map(Value::as_str).collect();
    assert_eq!(order, vec!["a", "ab", "bb", "ccc", "dddd"]);
    Ok(())
}

#[test]
fn test_from_keyed_vector_and_config() -> Result<()> {
    let vector = Vector::from_json_object(r#"{"a": 1, "b": {"c": true}}"#)?;
    let table = HashTable::from_vector(&vector, 0)?;
    assert_eq!(table.len(), 2);
    assert!(table.get_value(&"b".into()).and_then(Value::as_vector).is_some());

    let config = CollectionConfig {
        bucket_count: 128,
        ..CollectionConfig::default()
    };
    let table = HashTable::with_config(&TYPE_STRING, &config)?;
    assert_eq!(table.bucket_count(), config.effective_bucket_count());

    let invalid = CollectionConfig {
        bucket_count: usize::MAX,
        ..CollectionConfig::default()
    };
    assert!(invalid.validate().is_err());
    assert!(HashTable::with_config(&TYPE_STRING, &invalid).is_err());
    Ok(())
}

#[test]
fn test_render_formats() -> Result<()> {
    let table = HashTable::from_json(r#"{"list": [1, 2], "empty": {}}"#)?;
    let json = table.to_json();
    assert!(json.starts_with("{\n"));
    assert!(json.contains("\"list\": [\n    1,\n    2\n  ]"));
    assert!(json.contains("\"empty\": {}"));

    let reparsed = HashTable::from_json(&json)?;
    assert_eq!(reparsed.compare(&table), Ordering::Equal);

    let xml = table.to_xml("doc", false);
    assert!(xml.starts_with("<doc>"));
    assert!(xml.contains("<list><item>1</item><item>2</item></list>"));
    assert!(xml.contains("<empty></empty>"));
    Ok(())
}

#[test]
fn test_xml_round_trip_through_rendering() -> Result<()> {
    let table = HashTable::from_json(r#"{"name": "widget", "size": {"w": 3, "h": 4}, "note": "a < b"}"#)?;
    let xml = table.to_xml("order", true);
    let parsed = HashTable::from_xml(&xml)?;

    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.get_value(&"name".into()).and_then(Value::as_bytes), Some(&b"widget"[..]));
    assert_eq!(parsed.get_value(&"note".into()).and_then(Value::as_bytes), Some(&b"a < b"[..]));
    let size = parsed
        .get_value(&"size".into())
        .and_then(Value::as_hash_table)
        .expect("nested size table");
    assert_eq!(size.get_value(&"h".into()).and_then(Value::as_bytes), Some(&b"4"[..]));

    let bytes = parsed.to_bytes()?;
    let decoded = HashTable::from_bytes(&bytes, true)?.into_result()?;
    assert_eq!(decoded.compare(&parsed), Ordering::Equal);
    Ok(())
}
