//! CLI configuration and argument parsing.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use crate::status::Selectors;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

pub const LONG_VERSION: &str = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION,
    COMMIT,
    BUILD_DATE
);

// Environment variable names shared by flag parsing and the docs.
pub mod env {
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const APISERVER_URL: &str = "PGO_APISERVER_URL";
    pub const NAMESPACE: &str = "PGO_NAMESPACE";
    pub const CA_CERT: &str = "PGO_CA_CERT";
    pub const USERNAME: &str = "PGOUSERNAME";
    pub const PASSWORD: &str = "PGOPASSWORD";
    pub const REQUEST_TIMEOUT_SECS: &str = "PGO_REQUEST_TIMEOUT_SECS";
    pub const SERVER_PORT: &str = "SERVER_PORT";
    pub const KUBECONFIG_CONTEXT: &str = "KUBECONFIG_CONTEXT";
    pub const WATCHED_NAMESPACES: &str = "WATCHED_NAMESPACES";
    pub const QUERY_TIMEOUT_SECS: &str = "QUERY_TIMEOUT_SECS";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Status reports for PostgreSQL operator namespaces.
///
/// `serve` runs the status API inside the cluster; the other subcommands
/// query a running API server.
#[derive(Parser, Debug, Clone)]
#[command(name = "pgo-status")]
#[command(about = "Status reports for PostgreSQL operator namespaces")]
#[command(version = LONG_VERSION)]
pub struct Args {
    /// Log format: json or pretty
    #[arg(long, global = true, env = env::LOG_FORMAT, default_value = "pretty")]
    pub log_format: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = env::LOG_LEVEL, default_value = "info")]
    pub log_level: String,

    /// Operator API server URL
    #[arg(long, global = true, env = env::APISERVER_URL)]
    pub apiserver_url: Option<String>,

    /// Namespace to report on
    #[arg(short, long, global = true, env = env::NAMESPACE)]
    pub namespace: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// CA certificate file (PEM) used to verify the API server
    #[arg(long, global = true, env = env::CA_CERT)]
    pub pgo_ca_cert: Option<String>,

    /// Basic auth username
    #[arg(long, global = true, env = env::USERNAME)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long, global = true, env = env::PASSWORD, hide_env_values = true, value_parser = parse_secret)]
    pub password: Option<SecretString>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = env::REQUEST_TIMEOUT_SECS, default_value = "30")]
    pub request_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the status API server
    Serve(ServeArgs),

    /// Print the status report for a namespace
    Status,

    /// Show operator documents
    #[command(subcommand)]
    Show(ShowCommand),

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShowCommand {
    /// Show a workflow by id
    Workflow {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show pgBackRest info for one or more clusters
    #[command(after_help = r#"Examples:
  pgo-status show backup hippo          Show backups of one cluster
  pgo-status show backup --selector name=hippo
                                        Show backups of matching clusters"#)]
    Backup {
        #[arg(value_name = "CLUSTER")]
        clusters: Vec<String>,

        /// Select clusters by label instead of name
        #[arg(short = 's', long)]
        selector: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Status API listen port
    #[arg(long, env = env::SERVER_PORT, default_value = "8080")]
    pub port: u16,

    /// Kubernetes context to use
    #[arg(long, env = env::KUBECONFIG_CONTEXT)]
    pub context: Option<String>,

    /// Namespaces that may be queried, comma-separated (empty = any)
    #[arg(long, env = env::WATCHED_NAMESPACES, value_delimiter = ',')]
    pub watched_namespaces: Vec<String>,

    /// Per-listing Kubernetes query timeout in seconds
    #[arg(long, env = env::QUERY_TIMEOUT_SECS, default_value = "10")]
    pub query_timeout_secs: u64,

    #[arg(long, default_value = "name=postgres-operator")]
    pub operator_selector: String,

    #[arg(long, default_value = "pgbackup")]
    pub backup_selector: String,

    #[arg(long, default_value = "pgremove")]
    pub claim_selector: String,

    #[arg(long, default_value = "pg-cluster")]
    pub cluster_selector: String,
}

impl ServeArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query_timeout_secs == 0 {
            return Err("--query-timeout-secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn selectors(&self) -> Selectors {
        Selectors {
            operator: self.operator_selector.clone(),
            backup: self.backup_selector.clone(),
            claim: self.claim_selector.clone(),
            cluster: self.cluster_selector.clone(),
        }
    }

    /// Watched namespaces with blank entries removed.
    pub fn watched_namespaces(&self) -> Vec<String> {
        self.watched_namespaces
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_secret(value: &str) -> Result<SecretString, std::convert::Infallible> {
    Ok(SecretString::from(value))
}

impl Args {
    /// Validate the options needed by the selected subcommand.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Serve(serve) => serve.validate(),
            Command::Version => Ok(()),
            Command::Status | Command::Show(_) => {
                if self.apiserver_url.as_deref().is_none_or(str::is_empty) {
                    return Err("The PGO_APISERVER_URL environment variable or the --apiserver-url flag needs to be supplied.".to_string());
                }
                if self.namespace.as_deref().is_none_or(str::is_empty) {
                    return Err(
                        "The PGO_NAMESPACE environment variable or the --namespace flag needs to be supplied."
                            .to_string(),
                    );
                }
                if let Command::Show(ShowCommand::Backup { clusters, selector }) = &self.command
                    && clusters.is_empty()
                    && selector.is_none()
                {
                    return Err("a cluster name or --selector is required".to_string());
                }
                Ok(())
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Namespace after validation; empty when none was given.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}
