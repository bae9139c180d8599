//! Span tree construction from a decoded plan tree.
//!
//! Walks the plan in preorder, minting one span per operator node. Every
//! span shares the record's trace id and timing window; parent links follow
//! the plan's syntactic nesting, rooted at the propagated parent span.

use opentelemetry_proto::tonic::trace::v1::span::SpanKind;
use opentelemetry_proto::tonic::trace::v1::Span;
use serde_json::{Map, Value};

use crate::utils::time::datetime_to_nanos;

use super::attributes::map_plan_attributes;
use super::error::PlanTraceError;
use super::plan_keys;
use super::record::{TimeWindow, TraceContext};

/// Fixed name for the first span emitted per record
pub(crate) const ROOT_SPAN_NAME: &str = "Query Plan";

/// Placeholder name for nodes without a "Node Type" field
pub(crate) const DEFAULT_SPAN_NAME: &str = "Plan Step";

// ============================================================================
// SPAN IDENTIFIERS
// ============================================================================

/// Source of freshly minted 8-byte span identifiers.
///
/// Injected so deterministic tests can substitute a sequential source for
/// the process RNG.
pub trait SpanIdGenerator: Send + Sync {
    fn span_id(&self) -> [u8; 8];
}

/// Default generator backed by the thread-local RNG
pub struct RandomSpanIds;

impl SpanIdGenerator for RandomSpanIds {
    fn span_id(&self) -> [u8; 8] {
        rand::random()
    }
}

// ============================================================================
// TREE BUILDER
// ============================================================================

/// Builds the flattened preorder span sequence for one plan tree.
pub(super) struct SpanTreeBuilder<'a> {
    context: &'a TraceContext,
    window: &'a TimeWindow,
    ids: &'a dyn SpanIdGenerator,
    max_depth: usize,
}

impl<'a> SpanTreeBuilder<'a> {
    pub(super) fn new(
        context: &'a TraceContext,
        window: &'a TimeWindow,
        ids: &'a dyn SpanIdGenerator,
        max_depth: usize,
    ) -> Self {
        Self {
            context,
            window,
            ids,
            max_depth,
        }
    }

    /// Build all spans for the tree rooted at `root`.
    ///
    /// The root span's parent is the propagated parent span id; the first
    /// emitted span always carries the fixed root name.
    pub(super) fn build(&self, root: &Map<String, Value>) -> Result<Vec<Span>, PlanTraceError> {
        let mut spans = Vec::new();
        self.walk(root, self.context.parent_span_id, 1, &mut spans)?;
        if let Some(first) = spans.first_mut() {
            first.name = ROOT_SPAN_NAME.to_string();
        }
        Ok(spans)
    }

    fn walk(
        &self,
        node: &Map<String, Value>,
        parent_span_id: [u8; 8],
        depth: usize,
        out: &mut Vec<Span>,
    ) -> Result<(), PlanTraceError> {
        if depth > self.max_depth {
            return Err(PlanTraceError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let span_id = self.ids.span_id();
        let name = node
            .get(plan_keys::NODE_TYPE)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SPAN_NAME)
            .to_string();

        out.push(Span {
            trace_id: self.context.trace_id.to_vec(),
            span_id: span_id.to_vec(),
            parent_span_id: parent_span_id.to_vec(),
            name,
            kind: SpanKind::Client as i32,
            start_time_unix_nano: datetime_to_nanos(self.window.start),
            end_time_unix_nano: datetime_to_nanos(self.window.end),
            attributes: map_plan_attributes(node),
            ..Span::default()
        });

        if let Some(Value::Array(children)) = node.get(plan_keys::CHILD_PLANS) {
            for child in children {
                match child {
                    Value::Object(child_node) => {
                        self.walk(child_node, span_id, depth + 1, out)?;
                    }
                    other => {
                        tracing::trace!(value = %other, "Skipping non-object plan child");
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
