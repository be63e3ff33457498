//! Jukebox Core
//!
//! Beat-synchronized playback of a pre-analyzed track, with a live
//! terminal map of where the remix can jump next.
//!
//! The analysis itself (beat detection, clustering, the jump graph, the
//! play vector) happens elsewhere; this crate consumes that output
//! read-only and turns it into synchronized sound plus display:
//!
//! - [`BeatStore`] / [`PlayVector`] — the analyzer's validated output
//! - [`Scheduler`] — queues beat buffers in order and paces them against
//!   wall-clock time, deducting render cost from each beat's sleep
//! - [`draw_progress`] — the wrapped glyph map with jump-candidate
//!   highlighting and the countdown/stuck marker
//! - [`load_bundle`] / [`save_remix`] — the analyzer-file boundary and
//!   offline rendering

pub use beats::{Beat, BeatStore, PlayStep, PlayVector};
pub use error::{JukeboxError, Result};
pub use load::load_bundle;
pub use output::{default_device_name, OutputDevice, RodioOutput};
pub use progress::{progress_line, NullProgress, ProgressSink, ScreenProgress};
pub use save::{save_remix, steps_for_duration};
pub use scheduler::{remaining_sleep, Outcome, PlaybackOptions, Scheduler};
pub use screen::{Screen, Style, TerminalScreen};
pub use visualizer::{
    cluster_map, draw_progress, grid_cell, marker_for, segment_map, track_summary, Marker,
    TrackInfo,
};

mod beats;
mod error;
mod load;
mod output;
mod progress;
mod save;
mod scheduler;
mod screen;
mod visualizer;
