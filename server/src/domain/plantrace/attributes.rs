//! Attribute typing for plan node fields.
//!
//! A fixed table maps well-known plan fields to declared attribute types and
//! snake_case names. Fields outside the table fall back to their runtime
//! value kind; values that fit neither policy are dropped so one odd field
//! never blocks the rest of the node.

use opentelemetry_proto::tonic::common::v1::KeyValue;
use serde_json::{Map, Value};

use crate::utils::otlp::{make_bool_attr, make_double_attr, make_int_attr, make_str_attr};

use super::plan_keys;

// ============================================================================
// FIELD TABLE
// ============================================================================

#[derive(Clone, Copy)]
enum AttrKind {
    Str,
    Int,
    Double,
    Bool,
}

struct PlanField {
    name: &'static str,
    attribute: &'static str,
    kind: AttrKind,
}

const fn field(name: &'static str, attribute: &'static str, kind: AttrKind) -> PlanField {
    PlanField {
        name,
        attribute,
        kind,
    }
}

/// Well-known plan fields and their declared attribute types
const PLAN_FIELDS: &[PlanField] = &[
    field(plan_keys::NODE_TYPE, "node_type", AttrKind::Str),
    field("Relation Name", "relation_name", AttrKind::Str),
    field("Alias", "alias", AttrKind::Str),
    field("Startup Cost", "startup_cost", AttrKind::Double),
    field("Total Cost", "total_cost", AttrKind::Double),
    field("Plan Rows", "plan_rows", AttrKind::Int),
    field("Plan Width", "plan_width", AttrKind::Int),
    field("Actual Startup Time", "actual_startup_time", AttrKind::Double),
    field("Actual Total Time", "actual_total_time", AttrKind::Double),
    field("Actual Rows", "actual_rows", AttrKind::Int),
    field("Actual Loops", "actual_loops", AttrKind::Int),
    field("Output", "output", AttrKind::Str),
    field("Filter", "filter", AttrKind::Str),
    field("Recheck Cond", "recheck_cond", AttrKind::Str),
    field("Rows Removed by Filter", "rows_removed_by_filter", AttrKind::Int),
    field("Inner Unique", "inner_unique", AttrKind::Bool),
    field("Index Name", "index_name", AttrKind::Str),
    field("Index Cond", "index_cond", AttrKind::Str),
    field("Join Type", "join_type", AttrKind::Str),
    field("Hash Cond", "hash_cond", AttrKind::Str),
    field("Hash Buckets", "hash_buckets", AttrKind::Int),
    field("Hash Batches", "hash_batches", AttrKind::Int),
    field("Group Key", "group_key", AttrKind::Str),
];

fn lookup(name: &str) -> Option<&'static PlanField> {
    PLAN_FIELDS.iter().find(|f| f.name == name)
}

// ============================================================================
// VALUE CONVERSION
// ============================================================================

/// Truncating integer conversion: accepts both integer and float encodings,
/// so `"Plan Rows": 12345.0` still lands as the integer `12345`.
fn json_to_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

fn typed_attr(field: &PlanField, value: &Value) -> Option<KeyValue> {
    match field.kind {
        AttrKind::Str => value.as_str().map(|s| make_str_attr(field.attribute, s)),
        AttrKind::Int => json_to_i64(value).map(|i| make_int_attr(field.attribute, i)),
        AttrKind::Double => value.as_f64().map(|d| make_double_attr(field.attribute, d)),
        AttrKind::Bool => value.as_bool().map(|b| make_bool_attr(field.attribute, b)),
    }
}

/// Type an unknown field by its runtime value kind, keeping the original key.
fn fallback_attr(key: &str, value: &Value) -> Option<KeyValue> {
    match value {
        Value::String(s) => Some(make_str_attr(key, s)),
        Value::Bool(b) => Some(make_bool_attr(key, *b)),
        Value::Number(n) => n.as_f64().map(|d| make_double_attr(key, d)),
        _ => None,
    }
}

// ============================================================================
// NODE MAPPING
// ============================================================================

/// Map every field on a plan node to a typed span attribute.
///
/// The reserved child-list key is never emitted; unconvertible values are
/// dropped with a trace-level diagnostic.
pub(super) fn map_plan_attributes(node: &Map<String, Value>) -> Vec<KeyValue> {
    let mut attrs = Vec::with_capacity(node.len());
    for (key, value) in node {
        if key == plan_keys::CHILD_PLANS {
            continue;
        }
        let attr = match lookup(key) {
            Some(field) => typed_attr(field, value),
            None => fallback_attr(key, value),
        };
        match attr {
            Some(kv) => attrs.push(kv),
            None => {
                tracing::trace!(key = %key, "Dropping plan field with unsupported value")
            }
        }
    }
    attrs
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
