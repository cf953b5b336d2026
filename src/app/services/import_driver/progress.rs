//! Progress reporting for import runs
//!
//! Progress is measured in bytes of the source file, since the number of
//! rows is not known until the file has been read.

use super::stats::ImportStatistics;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Rows between progress bar message refreshes
const MESSAGE_INTERVAL_ROWS: usize = 500;

pub struct ImportProgress {
    progress_bar: Option<ProgressBar>,
}

impl ImportProgress {
    /// A progress bar over `total_bytes`, or nothing when disabled or the
    /// size is unknown
    pub fn new(total_bytes: u64, enabled: bool) -> Self {
        if !enabled || total_bytes == 0 {
            return Self::disabled();
        }

        let pb = ProgressBar::new(total_bytes);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) | {msg}",
        )
        .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Importing");

        debug!("Progress bar initialized for {} bytes", total_bytes);
        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn disabled() -> Self {
        Self { progress_bar: None }
    }

    /// Move to `bytes_read`, refreshing the message every few hundred rows
    pub fn update(&self, bytes_read: u64, stats: &ImportStatistics) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(bytes_read);
            if stats.rows_processed % MESSAGE_INTERVAL_ROWS == 0 {
                pb.set_message(format!(
                    "{} rows, {} observations written, {} errors",
                    stats.rows_processed,
                    stats.observations_written(),
                    stats.errors
                ));
            }
        }
    }

    pub fn finish(&self, stats: &ImportStatistics) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!(
                "Completed: {} rows, {} batches",
                stats.rows_processed, stats.batches_committed
            ));
        }
    }

    pub fn finish_with_error(&self, error_message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message(format!("Failed: {}", error_message));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.progress_bar.is_some()
    }

    /// Run `f` with the bar hidden so log output stays readable
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl Drop for ImportProgress {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
