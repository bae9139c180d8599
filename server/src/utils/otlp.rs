//! OTLP utility functions
//!
//! Helpers for working with OTLP protobuf attribute types: typed `KeyValue`
//! construction and type-checked attribute lookup.

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};

// ============================================================================
// SHARED ATTRIBUTE KEYS
// ============================================================================

/// Resource attribute keys stamped onto emitted trace batches
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
    pub const DB_SYSTEM: &str = "db.system";
    pub const DB_NAME: &str = "db.name";
}

// ============================================================================
// ATTRIBUTE LOOKUP
// ============================================================================

/// Look up an attribute by key, returning its value only when string-typed.
///
/// A non-string value under the key is treated the same as an absent key.
pub fn get_string_attr<'a>(attrs: &'a [KeyValue], key: &str) -> Option<&'a str> {
    let value = attrs.iter().find(|kv| kv.key == key)?.value.as_ref()?;
    match value.value.as_ref()? {
        any_value::Value::StringValue(s) => Some(s.as_str()),
        _ => None,
    }
}

// ============================================================================
// TYPED ATTRIBUTE CONSTRUCTION
// ============================================================================

fn make_attr(key: &str, value: any_value::Value) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue { value: Some(value) }),
    }
}

pub fn make_str_attr(key: &str, value: &str) -> KeyValue {
    make_attr(key, any_value::Value::StringValue(value.to_string()))
}

pub fn make_int_attr(key: &str, value: i64) -> KeyValue {
    make_attr(key, any_value::Value::IntValue(value))
}

pub fn make_double_attr(key: &str, value: f64) -> KeyValue {
    make_attr(key, any_value::Value::DoubleValue(value))
}

pub fn make_bool_attr(key: &str, value: bool) -> KeyValue {
    make_attr(key, any_value::Value::BoolValue(value))
}
