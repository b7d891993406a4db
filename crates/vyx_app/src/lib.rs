//! The `vyx` command-line client: configuration, the driver loop around the
//! controller, terminal rendering and the results view.
mod app;
pub mod cli;
pub mod driver;
pub mod prompt;
pub mod render;
pub mod results;
pub mod settings;

use std::path::Path;

use log::LevelFilter;

pub use app::run;
pub use cli::{Cli, Command, JobArgs, LogTarget};
pub use driver::{Driver, Frontend};
pub use prompt::read_retry_answer;
pub use render::{progress_line, status_line, TerminalFrontend};
pub use results::{format_results, open_results};
pub use settings::{ConfigError, FileConfig, Settings};

pub const LOG_FILENAME: &str = "vyx.log";

/// Installs the global logger for the binary.
pub fn init_logging(target: LogTarget, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    vyx_logging::initialize(target.into(), level, Path::new(LOG_FILENAME));
}
