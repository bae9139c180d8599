use opentelemetry_proto::tonic::common::v1::any_value;
use serde_json::json;

use super::*;

fn node(value: serde_json::Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn find<'a>(attrs: &'a [KeyValue], key: &str) -> Option<&'a any_value::Value> {
    attrs
        .iter()
        .find(|kv| kv.key == key)
        .and_then(|kv| kv.value.as_ref())
        .and_then(|v| v.value.as_ref())
}

fn expect_str(attrs: &[KeyValue], key: &str) -> String {
    match find(attrs, key) {
        Some(any_value::Value::StringValue(s)) => s.clone(),
        other => panic!("expected string for {key}, got {other:?}"),
    }
}

fn expect_int(attrs: &[KeyValue], key: &str) -> i64 {
    match find(attrs, key) {
        Some(any_value::Value::IntValue(i)) => *i,
        other => panic!("expected int for {key}, got {other:?}"),
    }
}

fn expect_double(attrs: &[KeyValue], key: &str) -> f64 {
    match find(attrs, key) {
        Some(any_value::Value::DoubleValue(d)) => *d,
        other => panic!("expected double for {key}, got {other:?}"),
    }
}

fn expect_bool(attrs: &[KeyValue], key: &str) -> bool {
    match find(attrs, key) {
        Some(any_value::Value::BoolValue(b)) => *b,
        other => panic!("expected bool for {key}, got {other:?}"),
    }
}

// ============================================================================
// Table typing
// ============================================================================

#[test]
fn test_known_string_fields() {
    let attrs = map_plan_attributes(&node(json!({
        "Node Type": "Hash Join",
        "Relation Name": "users",
        "Alias": "u",
        "Join Type": "Inner",
        "Hash Cond": "(u.id = o.user_id)"
    })));
    assert_eq!(expect_str(&attrs, "node_type"), "Hash Join");
    assert_eq!(expect_str(&attrs, "relation_name"), "users");
    assert_eq!(expect_str(&attrs, "alias"), "u");
    assert_eq!(expect_str(&attrs, "join_type"), "Inner");
    assert_eq!(expect_str(&attrs, "hash_cond"), "(u.id = o.user_id)");
}

#[test]
fn test_known_double_fields() {
    let attrs = map_plan_attributes(&node(json!({
        "Startup Cost": 0.42,
        "Total Cost": 155.0,
        "Actual Startup Time": 0.031,
        "Actual Total Time": 12.9
    })));
    assert_eq!(expect_double(&attrs, "startup_cost"), 0.42);
    assert_eq!(expect_double(&attrs, "total_cost"), 155.0);
    assert_eq!(expect_double(&attrs, "actual_startup_time"), 0.031);
    assert_eq!(expect_double(&attrs, "actual_total_time"), 12.9);
}

#[test]
fn test_known_integer_fields() {
    let attrs = map_plan_attributes(&node(json!({
        "Plan Rows": 1000,
        "Plan Width": 48,
        "Actual Rows": 997,
        "Actual Loops": 1,
        "Hash Buckets": 1024,
        "Hash Batches": 1,
        "Rows Removed by Filter": 3
    })));
    assert_eq!(expect_int(&attrs, "plan_rows"), 1000);
    assert_eq!(expect_int(&attrs, "plan_width"), 48);
    assert_eq!(expect_int(&attrs, "actual_rows"), 997);
    assert_eq!(expect_int(&attrs, "actual_loops"), 1);
    assert_eq!(expect_int(&attrs, "hash_buckets"), 1024);
    assert_eq!(expect_int(&attrs, "hash_batches"), 1);
    assert_eq!(expect_int(&attrs, "rows_removed_by_filter"), 3);
}

#[test]
fn test_integer_field_truncates_float_encoding() {
    // JSON encoders are free to emit whole numbers as floats
    let attrs = map_plan_attributes(&node(json!({"Plan Rows": 12345.0})));
    assert_eq!(expect_int(&attrs, "plan_rows"), 12345);
}

#[test]
fn test_integer_field_truncates_fractional_value() {
    let attrs = map_plan_attributes(&node(json!({"Actual Rows": 7.9})));
    assert_eq!(expect_int(&attrs, "actual_rows"), 7);
}

#[test]
fn test_boolean_field() {
    let attrs = map_plan_attributes(&node(json!({"Inner Unique": true})));
    assert!(expect_bool(&attrs, "inner_unique"));
}

// ============================================================================
// Fallback typing
// ============================================================================

#[test]
fn test_unknown_number_becomes_double() {
    let attrs = map_plan_attributes(&node(json!({"Workers Planned": 4})));
    assert_eq!(expect_double(&attrs, "Workers Planned"), 4.0);
}

#[test]
fn test_unknown_string_keeps_original_key() {
    let attrs = map_plan_attributes(&node(json!({"Subplan Name": "InitPlan 1"})));
    assert_eq!(expect_str(&attrs, "Subplan Name"), "InitPlan 1");
}

#[test]
fn test_unknown_bool() {
    let attrs = map_plan_attributes(&node(json!({"Parallel Aware": false})));
    assert!(!expect_bool(&attrs, "Parallel Aware"));
}

// ============================================================================
// Drop policy
// ============================================================================

#[test]
fn test_child_plans_key_never_emitted() {
    let attrs = map_plan_attributes(&node(json!({
        "Node Type": "Seq Scan",
        "Plans": [{"Node Type": "Sort"}]
    })));
    assert!(find(&attrs, "Plans").is_none());
    assert_eq!(attrs.len(), 1);
}

#[test]
fn test_nested_values_are_dropped() {
    let attrs = map_plan_attributes(&node(json!({
        "Node Type": "Seq Scan",
        "Sort Key": ["created_at"],
        "Workers": {"Launched": 2}
    })));
    assert!(find(&attrs, "Sort Key").is_none());
    assert!(find(&attrs, "Workers").is_none());
    assert_eq!(attrs.len(), 1);
}

#[test]
fn test_table_field_with_wrong_value_kind_is_dropped() {
    let attrs = map_plan_attributes(&node(json!({
        "Startup Cost": "cheap",
        "Relation Name": 7
    })));
    assert!(attrs.is_empty());
}

#[test]
fn test_null_value_is_dropped() {
    let attrs = map_plan_attributes(&node(json!({"Filter": null})));
    assert!(attrs.is_empty());
}

#[test]
fn test_empty_node_yields_no_attributes() {
    let attrs = map_plan_attributes(&Map::new());
    assert!(attrs.is_empty());
}
