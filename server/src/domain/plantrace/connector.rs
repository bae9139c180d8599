//! Log-to-trace connector.
//!
//! Walks OTLP log batches record by record, converts plan log lines into
//! span trees, and hands the assembled trace batch to the downstream
//! consumer. Record-level failures are reported and skipped; only a
//! downstream delivery failure reaches the caller.

use std::sync::Arc;

use chrono::Utc;
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::{InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};

use crate::core::config::ConnectorConfig;
use crate::core::constants::{
    DB_SYSTEM_POSTGRESQL, MESSAGE_SNIPPET_MAX_LEN, TRACE_SCOPE_NAME, TRACE_SCOPE_VERSION,
};
use crate::export::{ExportError, TraceConsumer};
use crate::utils::otlp::{get_string_attr, keys as otlp_keys, make_str_attr};

use super::build::{RandomSpanIds, SpanIdGenerator, SpanTreeBuilder};
use super::error::PlanTraceError;
use super::record::parse_plan_record;
use super::{plan_keys, truncate_bytes};

/// Consumer-facing behavior flags, reported to the host at registration
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub mutates_data: bool,
}

pub struct PlanTraceConnector {
    config: ConnectorConfig,
    ids: Arc<dyn SpanIdGenerator>,
    consumer: Arc<dyn TraceConsumer>,
}

impl PlanTraceConnector {
    pub fn new(config: ConnectorConfig, consumer: Arc<dyn TraceConsumer>) -> Self {
        Self::with_id_generator(config, consumer, Arc::new(RandomSpanIds))
    }

    /// Construct with an explicit span-id source (deterministic in tests)
    pub fn with_id_generator(
        config: ConnectorConfig,
        consumer: Arc<dyn TraceConsumer>,
        ids: Arc<dyn SpanIdGenerator>,
    ) -> Self {
        tracing::debug!(
            attribute_name = %config.attribute_name,
            max_plan_depth = config.max_plan_depth,
            "Building plan trace connector"
        );
        Self {
            config,
            ids,
            consumer,
        }
    }

    /// The connector reads log batches without modifying them
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            mutates_data: false,
        }
    }

    /// Convert one OTLP logs batch into spans and deliver them downstream.
    ///
    /// An empty conversion result skips the downstream call entirely.
    pub async fn consume_logs(
        &self,
        request: &ExportLogsServiceRequest,
    ) -> Result<(), ExportError> {
        let traces = self.build_traces(request);
        if traces.resource_spans.is_empty() {
            return Ok(());
        }
        self.consumer.consume(traces).await
    }

    fn build_traces(&self, request: &ExportLogsServiceRequest) -> ExportTraceServiceRequest {
        let mut resource_spans = Vec::new();

        for resource_logs in &request.resource_logs {
            let mut scope_spans = Vec::new();

            for scope_logs in &resource_logs.scope_logs {
                let mut spans = Vec::new();
                for log_record in &scope_logs.log_records {
                    spans.extend(self.convert_record(&log_record.attributes));
                }
                if !spans.is_empty() {
                    scope_spans.push(ScopeSpans {
                        scope: Some(InstrumentationScope {
                            name: TRACE_SCOPE_NAME.to_string(),
                            version: TRACE_SCOPE_VERSION.to_string(),
                            ..InstrumentationScope::default()
                        }),
                        spans,
                        ..ScopeSpans::default()
                    });
                }
            }

            if !scope_spans.is_empty() {
                resource_spans.push(ResourceSpans {
                    resource: Some(self.database_resource()),
                    scope_spans,
                    ..ResourceSpans::default()
                });
            }
        }

        ExportTraceServiceRequest { resource_spans }
    }

    /// Convert a single log record; failures yield zero spans and keep the
    /// batch moving.
    fn convert_record(&self, attributes: &[KeyValue]) -> Vec<Span> {
        let Some(message) = get_string_attr(attributes, plan_keys::MESSAGE) else {
            tracing::debug!("Log record has no string message attribute");
            return Vec::new();
        };

        match self.convert_message(message) {
            Ok(spans) => spans,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    message = %truncate_bytes(message, MESSAGE_SNIPPET_MAX_LEN),
                    "Skipping plan log record"
                );
                Vec::new()
            }
        }
    }

    fn convert_message(&self, message: &str) -> Result<Vec<Span>, PlanTraceError> {
        let Some(record) = parse_plan_record(message, Utc::now())? else {
            tracing::debug!(
                message = %truncate_bytes(message, MESSAGE_SNIPPET_MAX_LEN),
                "Log message is not a plan line"
            );
            return Ok(Vec::new());
        };

        tracing::trace!(
            trace_id = %hex::encode(record.context.trace_id),
            parent_span_id = %hex::encode(record.context.parent_span_id),
            version = record.context.version[0],
            flags = record.context.flags[0],
            "Continuing propagated trace context"
        );

        let Some(plan) = record.plan else {
            tracing::debug!("Plan payload carries no plan object");
            return Ok(Vec::new());
        };

        SpanTreeBuilder::new(
            &record.context,
            &record.window,
            self.ids.as_ref(),
            self.config.max_plan_depth,
        )
        .build(&plan)
    }

    /// Resource stamped onto every emitted trace batch
    fn database_resource(&self) -> Resource {
        Resource {
            attributes: vec![
                make_str_attr(otlp_keys::DB_SYSTEM, DB_SYSTEM_POSTGRESQL),
                make_str_attr(otlp_keys::DB_NAME, &self.config.database_name),
                make_str_attr(otlp_keys::SERVICE_NAME, &self.config.database_name),
            ],
            ..Resource::default()
        }
    }
}

#[cfg(test)]
#[path = "connector_tests.rs"]
mod tests;
