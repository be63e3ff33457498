//! Beat store and play vector, consumed read-only from the analyzer.
//!
//! The store is a plain owned array indexed by beat id. Jump candidates
//! are ids into that array rather than references, so there are no
//! cycles to manage and the whole structure stays trivially immutable
//! for the lifetime of a run.

use serde::{Deserialize, Serialize};

use crate::error::{JukeboxError, Result};

/// One discrete, independently playable slice of audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beat {
    /// Position of this beat in the store (0-based).
    pub id: usize,
    /// Offset within the source track, in seconds.
    pub start: f64,
    /// Playable length in seconds. Always positive.
    pub duration: f64,
    /// Structural grouping id. Only its parity matters for display.
    pub segment: usize,
    /// Timbre cluster id. Shown in the verbose summary, never used for
    /// playback decisions.
    pub cluster: usize,
    /// Ids of beats musically similar enough to jump to. May be empty.
    #[serde(default)]
    pub jump_candidates: Vec<usize>,
    /// Interleaved samples, sliced out of the decoded track by the
    /// loader. Not part of the serialized form.
    #[serde(skip)]
    pub buffer: Vec<f32>,
}

/// One playback event in the precomputed play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStep {
    /// Beat id to play.
    pub beat: usize,
    /// Length of the current uninterrupted run before a jump is attempted.
    pub seq_len: usize,
    /// How far into that run this step is, in `[0, seq_len]`.
    pub seq_pos: usize,
}

impl PlayStep {
    /// Beats remaining before the analyzer's next jump attempt. Zero or
    /// negative means a jump was due but no target was available.
    pub fn beats_until_jump(&self) -> i64 {
        self.seq_len as i64 - self.seq_pos as i64
    }
}

/// The analyzer's beat records plus the track-wide audio parameters.
#[derive(Debug, Clone)]
pub struct BeatStore {
    beats: Vec<Beat>,
    sample_rate: u32,
    channels: u16,
    tempo: f64,
}

impl BeatStore {
    /// Build a store, rejecting inconsistent analyzer output up front:
    /// ids must equal positions, durations must be positive, and every
    /// jump candidate must index the store.
    pub fn new(beats: Vec<Beat>, sample_rate: u32, channels: u16, tempo: f64) -> Result<Self> {
        let len = beats.len();
        for (i, beat) in beats.iter().enumerate() {
            if beat.id != i {
                return Err(JukeboxError::InvalidBeat(format!(
                    "beat at position {i} carries id {}",
                    beat.id
                )));
            }
            if !(beat.duration > 0.0) {
                return Err(JukeboxError::InvalidBeat(format!(
                    "beat {i} has non-positive duration {}",
                    beat.duration
                )));
            }
            if let Some(&bad) = beat.jump_candidates.iter().find(|&&c| c >= len) {
                return Err(JukeboxError::BeatOutOfRange { id: bad, len });
            }
        }
        Ok(Self {
            beats,
            sample_rate,
            channels,
            tempo,
        })
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Look up a beat by id, failing loudly on a bad reference.
    pub fn get(&self, id: usize) -> Result<&Beat> {
        self.beats.get(id).ok_or(JukeboxError::BeatOutOfRange {
            id,
            len: self.beats.len(),
        })
    }

    pub fn beats(&self) -> impl Iterator<Item = &Beat> {
        self.beats.iter()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Track tempo in beats per minute.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }
}

/// The precomputed, ordered list of beats to play.
#[derive(Debug, Clone, Default)]
pub struct PlayVector {
    steps: Vec<PlayStep>,
}

impl PlayVector {
    /// Wrap the analyzer's step list, rejecting any step that references
    /// a beat outside the store or carries impossible run bookkeeping.
    pub fn new(steps: Vec<PlayStep>, store: &BeatStore) -> Result<Self> {
        for (i, step) in steps.iter().enumerate() {
            if step.beat >= store.len() {
                return Err(JukeboxError::BeatOutOfRange {
                    id: step.beat,
                    len: store.len(),
                });
            }
            if step.seq_len == 0 {
                return Err(JukeboxError::InvalidPlayVector(format!(
                    "step {i} has zero seq_len"
                )));
            }
            if step.seq_pos > step.seq_len {
                return Err(JukeboxError::InvalidPlayVector(format!(
                    "step {i} has seq_pos {} past seq_len {}",
                    step.seq_pos, step.seq_len
                )));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PlayStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the first step that plays `beat`.
    pub fn first_occurrence(&self, beat: usize) -> Option<usize> {
        self.steps.iter().position(|s| s.beat == beat)
    }
}
