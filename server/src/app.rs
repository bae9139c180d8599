//! Core application

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::api::{self, LogsState};
use crate::core::cli;
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, LOG_QUEUE_CAPACITY};
use crate::core::shutdown::ShutdownService;
use crate::domain::plantrace::{LogPipeline, PlanTraceConnector};
use crate::export::OtlpHttpExporter;

pub struct CoreApp {
    pub config: AppConfig,
    pub shutdown: ShutdownService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let config = AppConfig::load(&cli_config)?;

        let app = Self {
            config,
            shutdown: ShutdownService::new(),
        };
        app.start().await
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start(self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        self.shutdown.install_signal_handlers();

        let exporter = Arc::new(
            OtlpHttpExporter::new(&self.config.exporter)
                .context("Failed to build trace exporter")?,
        );
        let connector = Arc::new(PlanTraceConnector::new(
            self.config.connector.clone(),
            exporter,
        ));
        tracing::debug!(
            mutates_data = connector.capabilities().mutates_data,
            "Connector ready"
        );

        let (queue_tx, queue_rx) = mpsc::channel(LOG_QUEUE_CAPACITY);
        let pipeline = LogPipeline::new(connector);
        self.shutdown
            .register(pipeline.start(queue_rx, self.shutdown.subscribe()))
            .await;

        let router = api::routes(LogsState { queue: queue_tx });

        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .context("Invalid server host")?,
            self.config.server.port,
        );
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!(
            %addr,
            exporter = %self.config.exporter.endpoint,
            "pgbridge listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(self.shutdown.wait())
            .await
            .context("Server error")?;

        self.shutdown.shutdown().await;

        Ok(())
    }
}
