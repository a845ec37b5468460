//! Server configuration.
//!
//! Settings come from command line arguments, falling back to environment
//! variables and then to the defaults below.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CAREBRIDGE_PORT` | 8080 | Server port |
//! | `CAREBRIDGE_HOST` | 127.0.0.1 | Host to bind |
//! | `CAREBRIDGE_LOG_LEVEL` | info | Log level |
//! | `CAREBRIDGE_DATABASE_PATH` | (in-memory) | SQLite database file |
//! | `CAREBRIDGE_MAX_CONNECTIONS` | 10 | Connection pool size |
//! | `CAREBRIDGE_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `CAREBRIDGE_ENABLE_CORS` | true | Enable CORS |
//! | `CAREBRIDGE_CORS_ORIGINS` | * | Allowed origins |
//! | `CAREBRIDGE_BASE_URL` | http://localhost:8080 | Base URL used in Bundle links |
//! | `CAREBRIDGE_DEFAULT_PAGE_SIZE` | 20 | Search page size when `_count` is absent |
//! | `CAREBRIDGE_MAX_PAGE_SIZE` | 1000 | Upper bound for `_count` |
//!
//! # Example
//!
//! ```rust
//! use carebridge_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     database_path: Some("carebridge.db".to_string()),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use carebridge_persistence::backends::sqlite::SqliteBackendConfig;
use clap::Parser;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "carebridge")]
#[command(about = "CareBridge EpisodeOfCare server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "CAREBRIDGE_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "CAREBRIDGE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "CAREBRIDGE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// SQLite database file. An in-memory database is used when unset.
    #[arg(long, env = "CAREBRIDGE_DATABASE_PATH")]
    pub database_path: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "CAREBRIDGE_MAX_CONNECTIONS", default_value = "10")]
    pub max_connections: u32,

    /// Request timeout in seconds.
    #[arg(long, env = "CAREBRIDGE_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "CAREBRIDGE_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "CAREBRIDGE_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Base URL of the server, used in Bundle links.
    #[arg(long, env = "CAREBRIDGE_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Default page size for search results.
    #[arg(long, env = "CAREBRIDGE_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for search results.
    #[arg(long, env = "CAREBRIDGE_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            database_path: None,
            max_connections: 10,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            base_url: "http://localhost:8080".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the environment only, ignoring the
    /// command line.
    pub fn from_env() -> Self {
        Self::try_parse_from(["carebridge"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the SQLite backend.
    pub fn backend_config(&self) -> SqliteBackendConfig {
        SqliteBackendConfig {
            max_connections: self.max_connections,
            ..Default::default()
        }
    }

    /// Page size for a requested `_count`, clamped to the configured maximum.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_connections == 0 {
            errors.push("Max connections cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if self.database_path.as_deref().is_some_and(str::is_empty) {
            errors.push("Database path cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            base_url: "http://localhost:0".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}
