use std::io::{self, Write};

use vyx_core::{format_elapsed, AppViewModel, ControllerPhase, ProgressSnapshot};

use crate::driver::Frontend;

/// One-line progress readout for a running job.
pub fn progress_line(progress: &ProgressSnapshot) -> String {
    format!(
        "[{}/{}] {} {} ({} elapsed, {} left) {}",
        progress.stage_index + 1,
        progress.stage_count,
        progress.stage_label,
        progress.stage_description,
        format_elapsed(progress.elapsed_secs),
        format_elapsed(progress.remaining_secs),
        progress.animation_id
    )
}

/// Final line for a job that has stopped, if there is anything to say.
pub fn status_line(view: &AppViewModel) -> Option<String> {
    match view.phase {
        ControllerPhase::Idle | ControllerPhase::Running => view.error_message.clone(),
        ControllerPhase::Succeeded => Some("Done.".to_string()),
        ControllerPhase::Failed | ControllerPhase::Cancelled | ControllerPhase::TimedOut => Some(
            view.error_message
                .clone()
                .unwrap_or_else(|| format!("{:?}", view.phase)),
        ),
    }
}

/// Renders to stderr, rewriting the progress line in place.
#[derive(Debug, Default)]
pub struct TerminalFrontend {
    last_line: Option<String>,
    line_open: bool,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, view: &AppViewModel) -> io::Result<()> {
        let mut err = io::stderr().lock();
        if let Some(progress) = &view.progress {
            let line = progress_line(progress);
            if self.last_line.as_deref() != Some(line.as_str()) {
                write!(err, "\r{line}\x1b[K")?;
                self.last_line = Some(line);
                self.line_open = true;
            }
        } else {
            if std::mem::take(&mut self.line_open) {
                writeln!(err)?;
            }
            self.last_line = None;
            if let Some(status) = status_line(view) {
                writeln!(err, "{status}")?;
            }
        }
        err.flush()
    }
}

impl Frontend for TerminalFrontend {
    fn render(&mut self, view: &AppViewModel) {
        // A closed stderr leaves nothing to report to.
        let _ = self.write(view);
    }

    fn navigate_to_results(&mut self) {
        let _ = writeln!(io::stderr(), "Opening results…");
    }
}
