use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use sitedesk_api_types::SingletonKind;

/// Command-line arguments for the sitedesk binary.
#[derive(Debug, Parser)]
#[command(name = "sitedesk", version, about = "Marketing site content service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SITEDESK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and admin HTTP listeners.
    Serve(Box<ServeArgs>),
    /// Ask a running admin listener to delete a singleton document.
    Reset(ResetArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct ResetArgs {
    /// Base URL of the admin listener; defaults to the configured admin address.
    #[arg(long = "admin-url", env = "SITEDESK_ADMIN_URL", value_name = "URL")]
    pub admin_url: Option<String>,

    /// Which document to clear.
    #[arg(value_enum, value_name = "KIND")]
    pub kind: ResetTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResetTarget {
    Shared,
    Homepage,
    Aboutus,
}

impl From<ResetTarget> for SingletonKind {
    fn from(target: ResetTarget) -> Self {
        match target {
            ResetTarget::Shared => SingletonKind::Shared,
            ResetTarget::Homepage => SingletonKind::Homepage,
            ResetTarget::Aboutus => SingletonKind::Aboutus,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Toggle the public response cache.
    #[arg(
        long = "cache-enable-response-cache",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enable_response_cache: Option<bool>,

    /// Override the number of cached responses.
    #[arg(long = "cache-response-limit", value_name = "COUNT")]
    pub cache_response_limit: Option<u64>,

    /// Override the background cache consume interval.
    #[arg(long = "cache-auto-consume-interval-ms", value_name = "MILLIS")]
    pub cache_auto_consume_interval_ms: Option<u64>,
}
