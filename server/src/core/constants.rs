// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "pgbridge";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "pgbridge.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PGBRIDGE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PGBRIDGE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PGBRIDGE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PGBRIDGE_LOG";

// =============================================================================
// Environment Variables - Exporter
// =============================================================================

/// Environment variable for the downstream OTLP traces endpoint
pub const ENV_EXPORTER_ENDPOINT: &str = "PGBRIDGE_EXPORTER_ENDPOINT";

/// Environment variable for the export request timeout (seconds)
pub const ENV_EXPORTER_TIMEOUT_SECS: &str = "PGBRIDGE_EXPORTER_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Connector
// =============================================================================

/// Environment variable for the trace-to-metric signaling attribute key
pub const ENV_ATTRIBUTE_NAME: &str = "PGBRIDGE_ATTRIBUTE_NAME";

/// Environment variable for the plan recursion bound
pub const ENV_MAX_PLAN_DEPTH: &str = "PGBRIDGE_MAX_PLAN_DEPTH";

/// Environment variable for the database resource name
pub const ENV_DATABASE_NAME: &str = "PGBRIDGE_DATABASE_NAME";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port (standard OTLP/HTTP)
pub const DEFAULT_PORT: u16 = 4318;

/// Maximum OTLP request body size in bytes
pub const OTLP_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Retry-after hint returned when the ingestion queue is full (seconds)
pub const BACKPRESSURE_RETRY_AFTER_SECS: u64 = 5;

/// Capacity of the bounded queue between the receiver and the pipeline
pub const LOG_QUEUE_CAPACITY: usize = 256;

// =============================================================================
// Exporter Defaults
// =============================================================================

/// Default downstream OTLP/HTTP traces endpoint
pub const DEFAULT_EXPORTER_ENDPOINT: &str = "http://127.0.0.1:4317/v1/traces";

/// Default export request timeout in seconds
pub const DEFAULT_EXPORTER_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Connector Defaults
// =============================================================================

/// Default attribute key consumed by the trace-to-metric signaling direction
pub const DEFAULT_ATTRIBUTE_NAME: &str = "request.n";

/// Default bound on plan tree nesting
pub const DEFAULT_MAX_PLAN_DEPTH: usize = 64;

/// Default database name reported on emitted resources
pub const DEFAULT_DATABASE_NAME: &str = "knexdb";

/// Value of the `db.system` resource attribute
pub const DB_SYSTEM_POSTGRESQL: &str = "postgresql";

/// Instrumentation scope name on emitted spans
pub const TRACE_SCOPE_NAME: &str = "dbquery";

/// Instrumentation scope version on emitted spans
pub const TRACE_SCOPE_VERSION: &str = "0.0.1";

/// Maximum bytes of an offending log message echoed into diagnostics
pub const MESSAGE_SNIPPET_MAX_LEN: usize = 256;

// =============================================================================
// Shutdown
// =============================================================================

/// Seconds to wait for background tasks during graceful shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
