//! Beat-synchronized playback scheduler.
//!
//! One thread walks the play vector: queue the beat's buffer on the
//! output device, let the visualizer draw, then sleep for the beat's
//! duration minus whatever the drawing cost. Submission order alone
//! encodes playback order, so nothing else may queue to the device
//! while a run is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::beats::{BeatStore, PlayStep, PlayVector};
use crate::error::{JukeboxError, Result};
use crate::output::OutputDevice;

/// Granularity of the inter-beat wait. Small enough that an interrupt
/// lands within a slice, large enough not to busy-wait.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The play vector was exhausted.
    Finished,
    /// The interrupt flag fired; remaining steps were never queued and
    /// the device was stopped. This is a clean return, not an error.
    Interrupted,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaybackOptions {
    /// Beat id to begin at. Playback starts at its first occurrence in
    /// the play vector; ids outside the store or never played are input
    /// errors.
    pub start_beat: Option<usize>,
}

pub struct Scheduler {
    interrupt: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(interrupt: Arc<AtomicBool>) -> Self {
        Self { interrupt }
    }

    /// Drive playback to completion or until interrupted.
    ///
    /// `on_step` is the visualizer hook; it returns its own wall-clock
    /// cost, which is deducted from the beat's sleep so playback pacing
    /// is independent of rendering cost. A hook slower than the beat
    /// itself clamps the sleep to zero and the run keeps going.
    pub fn run<F>(
        &self,
        store: &BeatStore,
        play: &PlayVector,
        device: &mut dyn OutputDevice,
        mut on_step: F,
        options: PlaybackOptions,
    ) -> Result<Outcome>
    where
        F: FnMut(&PlayStep) -> Result<Duration>,
    {
        if device.sample_rate() != store.sample_rate() {
            return Err(JukeboxError::SampleRateMismatch {
                store: store.sample_rate(),
                device: device.sample_rate(),
            });
        }

        let first = match options.start_beat {
            Some(id) => {
                store.get(id)?;
                play.first_occurrence(id)
                    .ok_or(JukeboxError::StartBeatNotPlayed { id })?
            }
            None => 0,
        };

        log::info!(
            "playback starting at step {first} of {} ({} beats in store)",
            play.len(),
            store.len()
        );

        for step in &play.steps()[first..] {
            if self.interrupt.load(Ordering::Relaxed) {
                return self.shut_down(device);
            }

            let beat = store.get(step.beat)?;
            device.queue(&beat.buffer)?;

            let spent = on_step(step)?;
            let remaining = remaining_sleep(beat.duration, spent);
            if self.sleep_unless_interrupted(remaining) {
                return self.shut_down(device);
            }
        }

        log::info!("play vector exhausted");
        Ok(Outcome::Finished)
    }

    fn shut_down(&self, device: &mut dyn OutputDevice) -> Result<Outcome> {
        device.stop();
        log::info!("playback interrupted, device stopped");
        Ok(Outcome::Interrupted)
    }

    /// Block for `remaining`, waking every slice to check the interrupt
    /// flag. Returns true if the flag fired.
    fn sleep_unless_interrupted(&self, mut remaining: Duration) -> bool {
        while remaining > Duration::ZERO {
            if self.interrupt.load(Ordering::Relaxed) {
                return true;
            }
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
        self.interrupt.load(Ordering::Relaxed)
    }
}

/// Sleep left for a beat after its render took `spent`: never negative,
/// exactly zero once rendering overruns the beat.
pub fn remaining_sleep(beat_duration: f64, spent: Duration) -> Duration {
    Duration::from_secs_f64(beat_duration.max(0.0)).saturating_sub(spent)
}
