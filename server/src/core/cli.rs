use std::path::PathBuf;

use clap::Parser;

use super::constants::{
    ENV_ATTRIBUTE_NAME, ENV_CONFIG, ENV_DATABASE_NAME, ENV_EXPORTER_ENDPOINT,
    ENV_EXPORTER_TIMEOUT_SECS, ENV_HOST, ENV_MAX_PLAN_DEPTH, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "pgbridge")]
#[command(version, about = "Postgres plan-log to trace bridge", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Downstream OTLP/HTTP traces endpoint
    #[arg(long, env = ENV_EXPORTER_ENDPOINT)]
    pub exporter_endpoint: Option<String>,

    /// Export request timeout in seconds
    #[arg(long, env = ENV_EXPORTER_TIMEOUT_SECS)]
    pub exporter_timeout_secs: Option<u64>,

    /// Attribute key used by the trace-to-metric signaling direction
    #[arg(long, env = ENV_ATTRIBUTE_NAME)]
    pub attribute_name: Option<String>,

    /// Maximum plan tree nesting accepted per record
    #[arg(long, env = ENV_MAX_PLAN_DEPTH)]
    pub max_plan_depth: Option<usize>,

    /// Database name reported on emitted trace resources
    #[arg(long, env = ENV_DATABASE_NAME)]
    pub database_name: Option<String>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub exporter_endpoint: Option<String>,
    pub exporter_timeout_secs: Option<u64>,
    pub attribute_name: Option<String>,
    pub max_plan_depth: Option<usize>,
    pub database_name: Option<String>,
}

/// Parse CLI arguments (with env var fallbacks via clap)
pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        exporter_endpoint: cli.exporter_endpoint,
        exporter_timeout_secs: cli.exporter_timeout_secs,
        attribute_name: cli.attribute_name,
        max_plan_depth: cli.max_plan_depth,
        database_name: cli.database_name,
    }
}
