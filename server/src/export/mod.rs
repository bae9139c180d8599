//! Downstream trace delivery.
//!
//! The connector hands finished span batches to a [`TraceConsumer`]; the
//! production implementation forwards them to an OTLP/HTTP endpoint. No
//! retry happens here — a delivery failure propagates to the caller.

use async_trait::async_trait;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use prost::Message;
use thiserror::Error;

use crate::core::config::ExporterConfig;

/// Downstream acceptor contract: accept a finished batch, return success or
/// failure.
#[async_trait]
pub trait TraceConsumer: Send + Sync {
    async fn consume(&self, request: ExportTraceServiceRequest) -> Result<(), ExportError>;
}

/// Failure delivering a span batch downstream
#[derive(Debug, Error)]
pub enum ExportError {
    /// Request could not be sent or timed out
    #[error("trace export transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("trace export rejected with HTTP status {status}")]
    Rejected { status: u16 },
}

/// OTLP/HTTP exporter posting protobuf-encoded trace batches
pub struct OtlpHttpExporter {
    client: reqwest::Client,
    endpoint: String,
}

impl OtlpHttpExporter {
    pub fn new(config: &ExporterConfig) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl TraceConsumer for OtlpHttpExporter {
    async fn consume(&self, request: ExportTraceServiceRequest) -> Result<(), ExportError> {
        let body = request.encode_to_vec();
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/x-protobuf")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                endpoint = %self.endpoint,
                "Downstream rejected span batch"
            );
            return Err(ExportError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::trace!(endpoint = %self.endpoint, "Span batch delivered");
        Ok(())
    }
}
