//! Per-record extraction: plan-log grammar match, duration, trace context,
//! and the embedded JSON plan payload.
//!
//! A message converts only when it matches the `auto_explain` shape:
//!
//! ```text
//! duration: 12.5 ms  plan: ... traceparent='00-<32hex>-<16hex>-01' ... {"Plan": {...}}
//! ```
//!
//! Only the first traceparent token and the outermost brace pair are
//! considered; surrounding text is otherwise unconstrained.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use crate::utils::time::millis_to_duration;

use super::error::PlanTraceError;
use super::plan_keys;

// ============================================================================
// PARSED RECORD TYPES
// ============================================================================

/// Parsed W3C trace-context token carried inside the log line.
///
/// Each field decodes from a fixed-width lowercase hex group of the
/// `traceparent='vv-tttttttttttttttttttttttttttttttt-pppppppppppppppp-ff'`
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub version: [u8; 1],
    pub trace_id: [u8; 16],
    pub parent_span_id: [u8; 8],
    pub flags: [u8; 1],
}

/// Shared timing window for every span built from one record.
///
/// Plans captured without ANALYZE carry no per-node wall-clock data, so the
/// whole tree reuses the outer statement duration.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One fully extracted plan log record, ready for span building.
#[derive(Debug)]
pub struct PlanRecord {
    pub context: TraceContext,
    pub window: TimeWindow,
    /// Root plan node; `None` when the payload carries no plan object.
    pub plan: Option<Map<String, Value>>,
}

// ============================================================================
// GRAMMAR MATCHING
// ============================================================================

fn plan_message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^duration: (\d+\.\d+) ms  plan:").expect("Invalid regex")
    })
}

fn traceparent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"traceparent='([^']+)'").expect("Invalid regex"))
}

/// Match the plan-log grammar and extract the statement duration in
/// milliseconds. `None` means the record is not a plan log line.
pub(super) fn match_plan_message(message: &str) -> Option<f64> {
    let caps = plan_message_regex().captures(message)?;
    caps[1].parse().ok()
}

// ============================================================================
// TRACE CONTEXT
// ============================================================================

fn decode_hex_group<const N: usize>(group: &str) -> Result<[u8; N], PlanTraceError> {
    if group.len() != N * 2 {
        return Err(PlanTraceError::Traceparent(format!(
            "group '{}' must be {} hex characters, found {}",
            group,
            N * 2,
            group.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(group, &mut out)
        .map_err(|e| PlanTraceError::Traceparent(format!("group '{group}': {e}")))?;
    Ok(out)
}

/// Decode the first traceparent token in the message.
pub(super) fn extract_trace_context(message: &str) -> Result<TraceContext, PlanTraceError> {
    let caps = traceparent_regex()
        .captures(message)
        .ok_or_else(|| PlanTraceError::Traceparent("no traceparent token in message".to_string()))?;

    let token = &caps[1];
    let groups: Vec<&str> = token.split('-').collect();
    if groups.len() != 4 {
        return Err(PlanTraceError::Traceparent(format!(
            "expected 4 hyphen-separated groups, found {}",
            groups.len()
        )));
    }

    Ok(TraceContext {
        version: decode_hex_group(groups[0])?,
        trace_id: decode_hex_group(groups[1])?,
        parent_span_id: decode_hex_group(groups[2])?,
        flags: decode_hex_group(groups[3])?,
    })
}

// ============================================================================
// PLAN PAYLOAD
// ============================================================================

/// Isolate the candidate JSON object: first `{` through last `}`.
pub(super) fn extract_plan_payload(message: &str) -> Result<&str, PlanTraceError> {
    let start = message
        .find('{')
        .ok_or_else(|| PlanTraceError::Payload("no JSON object in message".to_string()))?;
    let end = message
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| PlanTraceError::Payload("no closing brace in message".to_string()))?;
    Ok(&message[start..=end])
}

/// Decode the payload and pull out the root plan node.
///
/// A payload without a plan object yields `Ok(None)`: the record produces
/// zero spans but is not an error.
pub(super) fn decode_plan_tree(payload: &str) -> Result<Option<Map<String, Value>>, PlanTraceError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| PlanTraceError::Payload(e.to_string()))?;
    let Value::Object(mut top) = value else {
        return Err(PlanTraceError::Payload(
            "top-level JSON value is not an object".to_string(),
        ));
    };
    match top.remove(plan_keys::PLAN_ROOT) {
        Some(Value::Object(plan)) => Ok(Some(plan)),
        _ => Ok(None),
    }
}

// ============================================================================
// FULL RECORD EXTRACTION
// ============================================================================

/// Run the full per-record extraction against a log message.
///
/// `Ok(None)` means the message is not a plan log line (not an error); the
/// timing window anchors at `now` and spans the extracted duration.
pub(super) fn parse_plan_record(
    message: &str,
    now: DateTime<Utc>,
) -> Result<Option<PlanRecord>, PlanTraceError> {
    let Some(duration_ms) = match_plan_message(message) else {
        return Ok(None);
    };
    let context = extract_trace_context(message)?;
    let payload = extract_plan_payload(message)?;
    let plan = decode_plan_tree(payload)?;
    let window = TimeWindow {
        start: now,
        end: now + millis_to_duration(duration_ms),
    };
    Ok(Some(PlanRecord {
        context,
        window,
        plan,
    }))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
