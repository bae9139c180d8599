//! Log pipeline orchestrator.
//!
//! Receives OTLP log batches from the receiver's bounded queue and drives
//! them through the connector one at a time:
//!
//! 1. Extract plan records (filter, duration, trace context, payload)
//! 2. Build span trees
//! 3. Deliver the span batch downstream
//!
//! A batch either completes its full single pass or is abandoned at
//! shutdown; there is no partial-record resumption.

use std::sync::Arc;

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::connector::PlanTraceConnector;

pub struct LogPipeline {
    connector: Arc<PlanTraceConnector>,
}

impl LogPipeline {
    pub fn new(connector: Arc<PlanTraceConnector>) -> Self {
        Self { connector }
    }

    /// Start the pipeline task.
    ///
    /// Runs until shutdown is signalled or the queue closes; batches still
    /// queued at shutdown are drained before the task exits.
    pub fn start(
        self,
        mut queue: mpsc::Receiver<ExportLogsServiceRequest>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::debug!("LogPipeline started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("LogPipeline received shutdown, draining...");
                            break;
                        }
                    }
                    batch = queue.recv() => {
                        match batch {
                            Some(request) => self.run(&request).await,
                            None => {
                                tracing::debug!("Log queue closed");
                                break;
                            }
                        }
                    }
                }
            }

            while let Ok(request) = queue.try_recv() {
                self.run(&request).await;
            }

            tracing::debug!("LogPipeline shutdown complete");
        })
    }

    async fn run(&self, request: &ExportLogsServiceRequest) {
        if let Err(e) = self.connector.consume_logs(request).await {
            tracing::error!(error = %e, "Failed to deliver span batch downstream");
        }
    }
}
