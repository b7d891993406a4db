use std::process::ExitCode;

use clap::Parser;
use vyx_app::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    vyx_app::init_logging(cli.log, cli.verbose);
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    vyx_app::run(cli).await
}
