use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vyx_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "vyx", author, version, about = "Turn a video into posts and clips", long_about = None)]
pub struct Cli {
    /// RON config file (defaults to ./vyx.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the result mailbox
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,
    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    pub log: LogTarget,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether a URL is an accepted video link
    Validate { url: String },
    /// Generate written content from a video
    Content {
        #[command(flatten)]
        job: JobArgs,
        /// Content type to generate (repeatable; see `vyx types`)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
    },
    /// Cut short clips from a video
    Clips {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Show the last successful result once
    Results,
    /// List the available content types
    Types,
}

#[derive(Debug, Args)]
pub struct JobArgs {
    /// Video URL
    pub url: String,
    /// Override the webhook endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Override the client-side timeout
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Exit after a failure instead of offering a retry
    #[arg(long)]
    pub no_retry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
