// ============================================================================
// mediaforge-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif bar fed by core progress updates
//
// Starts as a spinner showing the processed media time and turns into a
// percentage bar on the first update that carries a percentage (the engine
// only knows the duration after probing). Positions never move backwards;
// ffmpeg occasionally reports an earlier time after a seek.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use mediaforge_core::ProgressUpdate;
use mediaforge_core::utils::format_duration;

const SPINNER_TEMPLATE: &str = "  {spinner} {msg} {prefix} ({elapsed})";
const BAR_TEMPLATE: &str = "  {msg} {percent:>3}% [{bar:30}] ({elapsed} / {duration})";

/// Drives one progress display for the lifetime of an operation.
pub struct OperationProgress {
    bar: ProgressBar,
    determinate: bool,
    max_position: u64,
}

impl OperationProgress {
    /// Creates the display. Nothing is drawn when `enabled` is false or
    /// stderr is not a terminal.
    pub fn new(label: &str, enabled: bool) -> Self {
        let visible = enabled && console::Term::stderr().is_term();
        let bar = if visible { ProgressBar::new_spinner() } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());
        if visible {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        Self { bar, determinate: false, max_position: 0 }
    }

    /// Applies one update from the running process.
    pub fn update(&mut self, update: &ProgressUpdate) {
        let Some(percent) = update.percent else {
            self.bar.set_prefix(format!(
                "{} processed, {:.1}x",
                format_duration(update.processed_secs),
                update.speed
            ));
            return;
        };

        if !self.determinate {
            self.determinate = true;
            self.bar.set_length(100);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                self.bar.set_style(style.progress_chars("##."));
            }
        }

        let position = percent.round().clamp(0.0, 100.0) as u64;
        if position >= self.max_position {
            self.max_position = position;
            self.bar.set_position(position);
        } else {
            log::trace!("Ignoring backward progress: {position} < {}", self.max_position);
        }
    }

    /// Clears the display from the terminal.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
