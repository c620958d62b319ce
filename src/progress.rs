//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del batch.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking esiti per file (passthrough, rescale, skip, errori)
//! - Report finale con statistiche aggregate
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [████████████████████████████████████████] 4/4 (100%) ✅ clip.mp4: rescaled
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a conformance batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for a batch run
#[derive(Debug, Default)]
pub struct ConformanceStats {
    pub files_processed: usize,
    pub files_passthrough: usize,
    pub files_rescaled: usize,
    pub files_skipped: usize,
    pub errors: usize,
}

impl ConformanceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_passthrough(&mut self) {
        self.files_processed += 1;
        self.files_passthrough += 1;
    }

    pub fn add_rescaled(&mut self) {
        self.files_processed += 1;
        self.files_rescaled += 1;
    }

    pub fn add_skipped(&mut self) {
        self.files_processed += 1;
        self.files_skipped += 1;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Passthrough: {} | Rescaled: {} | Skipped: {} | Errors: {}",
            self.files_processed,
            self.files_passthrough,
            self.files_rescaled,
            self.files_skipped,
            self.errors,
        )
    }
}
