use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use smbrowse_common::events::ScanEvent;
use smbrowse_common::lookup::{TaskKey, TaskOutcome};
use tokio::sync::mpsc::UnboundedReceiver;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub struct SpinnerHandle {
    pub spinner: ProgressBar,
}

impl SpinnerHandle {
    pub fn println(&self, msg: &str) {
        self.spinner.println(msg);
    }

    pub fn set_message(&self, msg: String) {
        self.spinner.set_message(msg);
    }

    /// Hides the spinner while `f` owns the terminal.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.spinner.suspend(f)
    }
}

static SPINNER: OnceLock<SpinnerHandle> = OnceLock::new();

pub fn get_spinner() -> &'static SpinnerHandle {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> SpinnerHandle {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(TICK_STRINGS));
    }
    SpinnerHandle { spinner: pb }
}

/// Shows what the scanner is doing until the event channel closes.
pub async fn follow_events(mut events: UnboundedReceiver<ScanEvent>) {
    let handle = get_spinner();
    let mut running: Vec<TaskKey> = Vec::new();

    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::RunStateChanged { busy: true } => {
                handle.spinner.enable_steady_tick(Duration::from_millis(100));
            }
            ScanEvent::RunStateChanged { busy: false } => {
                running.clear();
                handle.spinner.disable_steady_tick();
                handle.spinner.set_message("");
                handle.spinner.tick();
            }
            ScanEvent::AboutToStart { key } => {
                running.push(key);
                report_progress(handle, &running);
            }
            ScanEvent::Finished { key, outcome } => {
                running.retain(|k| *k != key);
                if outcome == TaskOutcome::Aborted {
                    handle.println(&format!("{} {}", "aborted".yellow(), key));
                }
                report_progress(handle, &running);
            }
            ScanEvent::ToolNotFound { .. } | ScanEvent::ModelChanged { .. } => {}
        }
    }

    handle.spinner.finish_and_clear();
}

fn report_progress(handle: &SpinnerHandle, running: &[TaskKey]) {
    let Some(latest) = running.last() else {
        return;
    };
    let message = match running.len() {
        1 => format!("Looking up {latest}..."),
        n => format!(
            "Looking up {latest} and {} more...",
            (n - 1).to_string().green().bold()
        ),
    };
    handle.set_message(message);
}

/// Routes log output above the spinner line.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // A hidden bar drops printed lines, e.g. when stdout is a pipe.
        if get_spinner().spinner.is_hidden() {
            return std::io::stdout().write(buf);
        }
        let msg = String::from_utf8_lossy(buf);
        get_spinner().println(msg.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
