//! Logs export endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use tokio::sync::mpsc;

use crate::core::constants::BACKPRESSURE_RETRY_AFTER_SECS;

use super::encoding::{OtlpContentType, decode_request, success_response};

/// Shared state for the logs endpoint: the pipeline's bounded queue
#[derive(Clone)]
pub struct LogsState {
    pub queue: mpsc::Sender<ExportLogsServiceRequest>,
}

pub async fn export(
    State(state): State<LogsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = OtlpContentType::from_headers(&headers);

    // Parse request (protobuf or JSON based on content type)
    let request: ExportLogsServiceRequest = match decode_request(&body, content_type) {
        Ok(req) => req,
        Err(e) => return e.into_response(content_type),
    };

    if let Err(e) = state.queue.try_send(request) {
        tracing::warn!(error = %e, "Failed to queue log batch for the pipeline");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(
                HeaderName::from_static("retry-after"),
                BACKPRESSURE_RETRY_AFTER_SECS.to_string(),
            )],
        )
            .into_response();
    }

    // Return OTLP-compliant response (matching request content type)
    let response = ExportLogsServiceResponse {
        partial_success: None,
    };
    success_response(&response, content_type)
}
