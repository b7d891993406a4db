use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use vyx_core::{is_valid_video_url, ControllerPhase, ProfileKind, CONTENT_TYPES};
use vyx_engine::{EngineHandle, FileMailbox, Mailbox, ReqwestSubmitter, TokioClock};
use vyx_logging::{vyx_info, vyx_warn};

use crate::cli::{Cli, Command, JobArgs};
use crate::driver::Driver;
use crate::prompt::read_retry_answer;
use crate::render::TerminalFrontend;
use crate::results::{format_results, open_results};
use crate::settings::Settings;

/// Runs one `vyx` invocation.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Validate { url } => {
            if is_valid_video_url(&url) {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Types => {
            for content_type in CONTENT_TYPES {
                println!("{:<24}{}", content_type.id, content_type.label);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Results => {
            let settings = load_settings(cli.config.as_deref())?;
            let state_dir = cli.state_dir.unwrap_or(settings.state_dir);
            show_results(&FileMailbox::new(state_dir))
        }
        Command::Content { job, types } => {
            run_job(ProfileKind::Content, job, types, cli.config.as_deref(), cli.state_dir).await
        }
        Command::Clips { job } => {
            run_job(ProfileKind::Clips, job, Vec::new(), cli.config.as_deref(), cli.state_dir).await
        }
    }
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    Settings::load(config, |name| std::env::var(name).ok()).context("loading configuration")
}

fn show_results(mailbox: &dyn Mailbox) -> anyhow::Result<ExitCode> {
    match open_results(mailbox) {
        Ok(payload) => {
            println!("{}", format_results(&payload));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_job(
    kind: ProfileKind,
    job: JobArgs,
    types: Vec<String>,
    config: Option<&Path>,
    state_dir: Option<std::path::PathBuf>,
) -> anyhow::Result<ExitCode> {
    let settings =
        load_settings(config)?.with_overrides(kind, job.endpoint, job.timeout_secs, state_dir);
    let profile = settings.profile(kind);
    let submitter = ReqwestSubmitter::new(settings.submit_settings(&profile))?;
    let mailbox = Arc::new(FileMailbox::new(settings.state_dir.clone()));

    let mut driver = Driver::new(
        profile,
        EngineHandle::new(Arc::new(submitter)),
        mailbox.clone(),
        Arc::new(TokioClock::new()),
        Box::new(TerminalFrontend::new()),
        StdRng::from_entropy(),
    );

    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel_tx.send(()).is_err() {
                break;
            }
        }
    });

    driver.submit(&job.url, &types);
    loop {
        driver.run_until_settled(&mut cancel_rx).await;
        match driver.phase() {
            ControllerPhase::Succeeded => return show_results(mailbox.as_ref()),
            ControllerPhase::Idle => return Ok(ExitCode::FAILURE),
            phase => {
                vyx_info!("job ended {:?}", phase);
                if job.no_retry {
                    return Ok(ExitCode::FAILURE);
                }
                // Signals from the finished run must not answer the prompt.
                while cancel_rx.try_recv().is_ok() {}
                if !prompt_retry(&mut cancel_rx).await? {
                    return Ok(ExitCode::FAILURE);
                }
                if !driver.retry() {
                    vyx_warn!("retry not available in {:?}", phase);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
}

async fn prompt_retry(cancel_rx: &mut mpsc::UnboundedReceiver<()>) -> anyhow::Result<bool> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(b"Retry the same request? [y/N] ").await?;
    stderr.flush().await?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let retry = read_retry_answer(&mut stdin, cancel_rx).await?;
    if !retry {
        stderr.write_all(b"\n").await?;
    }
    Ok(retry)
}
