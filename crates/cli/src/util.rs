//! Shared utilities for CLI commands

use indicatif::{ProgressBar, ProgressStyle};
use sieve_core::{CancelFlag, SelectionSink};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, warn, Level};

/// Install the stderr tracing subscriber
///
/// Default level is WARN so cache warnings surface without drowning the
/// progress bars; each `-v` raises it one step, `-q` drops to ERROR.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit status for a run aborted by a second Ctrl-C
const ABORT_EXIT_CODE: i32 = 130;

/// Set `cancel` on the first Ctrl-C; a second Ctrl-C exits immediately
pub fn watch_interrupts(cancel: CancelFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, stopping at the next file or step (Ctrl-C again to abort)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Second interrupt, aborting");
            std::process::exit(ABORT_EXIT_CODE);
        }
    })
}

/// Progress bar on stderr, or a hidden one when `show` is false
pub fn progress_bar(len: u64, message: &'static str, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{msg:>14} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed}, eta {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(250));
    bar
}

/// Selection sink that ticks a progress bar before delegating
pub struct ProgressSink<'a, S: SelectionSink + ?Sized> {
    inner: &'a mut S,
    bar: &'a ProgressBar,
}

impl<'a, S: SelectionSink + ?Sized> ProgressSink<'a, S> {
    pub fn new(inner: &'a mut S, bar: &'a ProgressBar) -> Self {
        Self { inner, bar }
    }
}

impl<S: SelectionSink + ?Sized> SelectionSink for ProgressSink<'_, S> {
    fn record(&mut self, identifier: &str) -> sieve_core::Result<()> {
        self.inner.record(identifier)?;
        self.bar.inc(1);
        Ok(())
    }
}

/// Format a duration as "1m 05s" / "3.21s"
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}
