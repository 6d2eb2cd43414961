//! CLI entry point for Newstler.

pub mod auth;
pub mod news;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::FileCredentialStore;
use crate::config::ServiceConfig;
use crate::error::{RecoverySuggestion, Result};
use crate::flow::{AuthorizationFlow, FlowError};
use crate::registry::{self, ConfigDrivenRegistry, ServiceRegistry};

/// Newstler CLI
#[derive(Parser, Debug)]
#[command(name = "newstler", version, about = "News feed personalized by your LinkedIn profile")]
pub struct Cli {
    /// Config file (default: ~/.newstler/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link a LinkedIn account
    Link(UserArgs),
    /// Show the personalized news feed
    News(UserArgs),
    /// Show the stored LinkedIn credential
    Status(UserArgs),
    /// Forget the stored LinkedIn credential
    Unlink(UserArgs),
}

/// Selects the local user the command acts for.
#[derive(Parser, Debug)]
pub struct UserArgs {
    /// Local user id
    #[arg(short, long, default_value = "default")]
    pub user: String,
}

/// Composition root: load config, install the process registry and wire
/// the flow controller.
pub fn build_flow(config_path: Option<&Path>) -> Result<AuthorizationFlow> {
    let config = ServiceConfig::load(config_path)?;
    let credentials = Arc::new(FileCredentialStore::new(config.storage.credentials_dir()));
    let registry: Arc<dyn ServiceRegistry> = Arc::new(ConfigDrivenRegistry::new(config)?);
    registry::configure_global(registry.clone())?;
    Ok(AuthorizationFlow::new(registry, credentials))
}

/// Print a flow failure with a hint on what to do next.
pub fn report_failure(err: &FlowError) {
    tracing::debug!(error = ?err, "command failed");
    if err.is_retryable() {
        eprintln!("⏳ {}", err.user_message());
    } else {
        eprintln!("❌ {}", err.user_message());
    }
    eprintln!("💡 {}", recovery_hint(err));
}

fn recovery_hint(err: &FlowError) -> &'static str {
    match err.recovery_suggestion() {
        RecoverySuggestion::RestartFlow => "Run `newstler link` to link your account again.",
        RecoverySuggestion::RetryLater => "This is usually temporary; try again in a moment.",
        RecoverySuggestion::CheckConfiguration => {
            "Check the [linkedin] section of ~/.newstler/config.toml or NEWSTLER_* variables."
        }
        RecoverySuggestion::CheckStorage => "Check that the credentials directory is writable.",
    }
}
