//! Server configuration, loaded from environment variables at startup and
//! optionally overridden from the command line.

use clap::{Parser, Subcommand};

/// Runtime configuration for chatlog-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// sqlx database URL (default: `"sqlite://chatlog.db?mode=rwc"`).
    /// `mode=rwc` creates the file on first start.
    pub database_url: String,

    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, log records are also written to a daily-rolling file in
    /// this directory.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            database_url: "sqlite://chatlog.db?mode=rwc".to_owned(),
            db_max_connections: 5,
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            enable_swagger: true,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("CHATLOG_BIND", &defaults.bind_address),
            database_url: env_or("CHATLOG_DATABASE_URL", &defaults.database_url),
            db_max_connections: parse_env("CHATLOG_DB_MAX_CONNECTIONS", defaults.db_max_connections),
            log_level: env_or("CHATLOG_LOG", &defaults.log_level),
            log_json: env_flag("CHATLOG_LOG_JSON", defaults.log_json),
            log_dir: env_opt("CHATLOG_LOG_DIR"),
            cors_allowed_origins: env_opt("CHATLOG_CORS_ORIGINS"),
            enable_swagger: env_flag("CHATLOG_ENABLE_SWAGGER", defaults.enable_swagger),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(bind) = &cli.bind {
            self.bind_address = bind.clone();
        }
        if let Some(url) = &cli.database_url {
            self.database_url = url.clone();
        }
        self
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "chatlog-server", version, about = "Room-scoped chat message history service")]
pub struct Cli {
    /// Address to bind, overrides `CHATLOG_BIND`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Database URL, overrides `CHATLOG_DATABASE_URL`.
    #[arg(long)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create the database and apply pending migrations, then exit.
    Migrate,
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
