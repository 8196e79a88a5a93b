use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Access-control decision engine configuration.
#[derive(Debug, Parser)]
#[command(name = "redactr")]
#[command(about = "Field-level access-control decision engine")]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP decision service
    Serve(ServeConfig),

    /// Evaluate a policy file against a test resource and print the result
    Check(CheckConfig),
}

/// Configuration for the decision service.
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "REDACTR_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to a policy YAML file; repeat to merge several in order
    #[arg(
        long = "policy",
        required = true,
        env = "REDACTR_POLICY_PATHS",
        value_delimiter = ','
    )]
    pub policy_paths: Vec<PathBuf>,

    /// Policy reload check interval in seconds
    #[arg(long, default_value = "30", env = "REDACTR_POLICY_RELOAD_SECS")]
    pub policy_reload_secs: u64,

    /// Field names redacted from logged audit records
    #[arg(
        long,
        default_value = "justification",
        env = "REDACTR_AUDIT_REDACT_FIELDS",
        value_delimiter = ','
    )]
    pub audit_redact_fields: Vec<String>,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "REDACTR_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,
}

impl ServeConfig {
    /// Get policy reload interval as Duration.
    pub fn policy_reload_interval(&self) -> Duration {
        Duration::from_secs(self.policy_reload_secs)
    }
}

/// Configuration for one-shot policy checks.
#[derive(Debug, Clone, Args)]
pub struct CheckConfig {
    /// Policy YAML file(s), merged in order
    #[arg(required = true, value_name = "POLICY_FILE")]
    pub policy_files: Vec<PathBuf>,

    /// Path to a JSON file holding the resource to evaluate
    #[arg(long)]
    pub input: PathBuf,

    /// Requester role
    #[arg(long)]
    pub role: String,

    /// Declared access intent
    #[arg(long)]
    pub intent: String,

    /// JSON object of runtime attributes
    #[arg(long, default_value = "{}")]
    pub attributes: String,

    /// Comma-separated field names to redact in the logged decision
    #[arg(long, value_delimiter = ',')]
    pub redact_fields: Vec<String>,
}
