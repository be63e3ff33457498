//! Progress reporting for the analyzer-boundary load phase.
//!
//! A narrow callback interface rather than a global hook, so nothing
//! outside the owner of the screen can scribble on shared display state.

use crate::screen::{Screen, Style};

/// Receives status updates from a long-running load or analysis phase.
pub trait ProgressSink {
    /// `fraction` is in `[0, 1]`; `message` is a short status line.
    fn report(&mut self, fraction: f32, message: &str);
}

/// Discards every update. Used by non-interactive paths like `--save`.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _fraction: f32, _message: &str) {}
}

/// Low-fi progress bar: ` [######    ] message`.
pub fn progress_line(fraction: f32, message: &str) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * 10.0) as usize;
    format!(" [{}{}] {}", "#".repeat(filled), " ".repeat(10 - filled), message)
}

/// Draws the progress bar on one screen row, clearing the rest.
pub struct ScreenProgress<'a> {
    screen: &'a mut dyn Screen,
    row: u16,
}

impl<'a> ScreenProgress<'a> {
    pub fn new(screen: &'a mut dyn Screen, row: u16) -> Self {
        Self { screen, row }
    }
}

impl ProgressSink for ScreenProgress<'_> {
    fn report(&mut self, fraction: f32, message: &str) {
        let line = progress_line(fraction, message);
        let drawn = self
            .screen
            .clear()
            .and_then(|_| self.screen.put(self.row, 0, &line, Style::Plain))
            .and_then(|_| self.screen.flush());
        if let Err(e) = drawn {
            log::warn!("progress display failed: {e}");
        }
    }
}
