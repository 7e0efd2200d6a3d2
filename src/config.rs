use clap::Parser;
use std::path::PathBuf;

/// Command-line configuration for the sidecar. Requests still arrive on stdin.
#[derive(Debug, Parser)]
#[command(name = "rankbookd", version, about = "Class ranking and grading sidecar")]
pub struct Config {
    /// Workspace directory to open before reading requests
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "rankbookd=info")]
    pub log_filter: String,
}
