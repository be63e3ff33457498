//! Terminal progress visualizer.
//!
//! Each playback step redraws a wrapped map of the whole beat store:
//! one glyph per beat (alternating by segment parity), the current
//! beat's jump candidates in reverse video, and a countdown-or-stuck
//! marker over the current beat's cell. The layout is recomputed from
//! the screen width on every call, so resizes just re-wrap the map on
//! the next beat.

use std::time::{Duration, Instant};

use crate::beats::{Beat, BeatStore, PlayStep};
use crate::error::Result;
use crate::screen::{Screen, Style};

const SEGMENT_GLYPHS: [char; 2] = ['#', '-'];

/// Shown when a jump was due but the analyzer found no usable target.
const STUCK_GLYPH: &str = ":(";

/// Fixed alphabet for the verbose cluster map, one glyph per cluster id.
const CLUSTER_GLYPHS: &str = "A1b2c3D4e5F6G7h8I9j0kLMnoPQrsTuVwXyZ~!@#$%^&*()_+-=";

/// Marker shown at the current beat's cell. Recomputed fresh from the
/// step's run bookkeeping; no state survives between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Beats left until the next jump opportunity.
    Counting(u32),
    /// The jump came due with nowhere to go; playback continues
    /// sequentially.
    Stuck,
}

pub fn marker_for(step: &PlayStep) -> Marker {
    let remaining = step.beats_until_jump();
    if remaining > 0 {
        Marker::Counting(remaining as u32)
    } else {
        Marker::Stuck
    }
}

/// (row, column) of beat `id` in a map wrapped at `width` columns.
pub fn grid_cell(id: usize, width: usize) -> (usize, usize) {
    (id / width, id % width)
}

pub fn segment_glyph(beat: &Beat) -> char {
    SEGMENT_GLYPHS[beat.segment % 2]
}

/// The whole store as one unwrapped glyph string.
pub fn segment_map(store: &BeatStore) -> String {
    store.beats().map(segment_glyph).collect()
}

/// The verbose companion map, one cluster glyph per beat.
pub fn cluster_map(store: &BeatStore) -> String {
    let glyphs: Vec<char> = CLUSTER_GLYPHS.chars().collect();
    store
        .beats()
        .map(|b| glyphs[b.cluster % glyphs.len()])
        .collect()
}

/// Draw one playback step onto `screen`, with the map's first row at
/// `row_offset`. Returns the wall-clock time this call took so the
/// scheduler can deduct it from the beat's sleep.
pub fn draw_progress(
    store: &BeatStore,
    step: &PlayStep,
    screen: &mut dyn Screen,
    row_offset: u16,
) -> Result<Duration> {
    let started = Instant::now();
    let width = screen.width().max(1);

    // Base map, wrapped into rows of `width` glyphs.
    let mut row = 0u16;
    let mut line = String::with_capacity(width);
    for beat in store.beats() {
        line.push(segment_glyph(beat));
        if line.len() == width {
            screen.put(row_offset + row, 0, &line, Style::Plain)?;
            line.clear();
            row += 1;
        }
    }
    if !line.is_empty() {
        screen.put(row_offset + row, 0, &line, Style::Plain)?;
    }

    // Light up everywhere a jump from this beat could land.
    let current = store.get(step.beat)?;
    for &candidate in &current.jump_candidates {
        let target = store.get(candidate)?;
        let (r, c) = grid_cell(target.id, width);
        screen.put(
            row_offset + r as u16,
            c as u16,
            segment_glyph(target).encode_utf8(&mut [0u8; 4]),
            Style::Reverse,
        )?;
    }

    // Countdown or stuck marker over the current cell.
    let (r, c) = grid_cell(step.beat, width);
    let marker = match marker_for(step) {
        Marker::Counting(n) => format!("{n:02}"),
        Marker::Stuck => STUCK_GLYPH.to_string(),
    };
    screen.put(row_offset + r as u16, c as u16, &marker, Style::Marker)?;
    screen.flush()?;

    Ok(started.elapsed())
}

/// Extra per-track context loaded alongside the store, used only by the
/// summary display.
#[derive(Debug, Clone)]
pub struct TrackInfo {
    pub name: String,
    /// Full track length in seconds.
    pub duration: f64,
    pub clusters: usize,
    pub segments: usize,
}

/// Human-readable stats block shown above the map.
pub fn track_summary(store: &BeatStore, info: &TrackInfo, verbose: bool) -> String {
    let total = info.duration.round() as u64;
    let (hours, rem) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);

    let mut out = format!(
        "  filename: {}\n  duration: {:02}:{:02}:{:02}\n     beats: {}\n     tempo: {} bpm\n  clusters: {}\n  segments: {}\nsamplerate: {}",
        info.name,
        hours,
        minutes,
        seconds,
        store.len(),
        store.tempo().round() as i64,
        info.clusters,
        info.segments,
        store.sample_rate(),
    );
    if verbose {
        out.push('\n');
        out.push_str(&cluster_map(store));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// In-memory screen capturing per-cell glyphs and styles.
    struct MemoryScreen {
        width: usize,
        cells: HashMap<(u16, u16), (char, Style)>,
    }

    impl MemoryScreen {
        fn new(width: usize) -> Self {
            Self {
                width,
                cells: HashMap::new(),
            }
        }

        fn row_text(&self, row: u16) -> String {
            let mut cols: Vec<_> = self
                .cells
                .iter()
                .filter(|((r, _), _)| *r == row)
                .map(|((_, c), (ch, _))| (*c, *ch))
                .collect();
            cols.sort();
            cols.into_iter().map(|(_, ch)| ch).collect()
        }

        fn style_at(&self, row: u16, col: u16) -> Option<Style> {
            self.cells.get(&(row, col)).map(|(_, s)| *s)
        }
    }

    impl Screen for MemoryScreen {
        fn width(&self) -> usize {
            self.width
        }

        fn clear(&mut self) -> Result<()> {
            self.cells.clear();
            Ok(())
        }

        fn put(&mut self, row: u16, col: u16, text: &str, style: Style) -> Result<()> {
            for (i, ch) in text.chars().enumerate() {
                self.cells.insert((row, col + i as u16), (ch, style));
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn beat(id: usize, segment: usize, jump_candidates: Vec<usize>) -> Beat {
        Beat {
            id,
            start: id as f64 * 0.5,
            duration: 0.5,
            segment,
            cluster: id % 3,
            jump_candidates,
            buffer: vec![],
        }
    }

    fn four_beat_store() -> BeatStore {
        let beats = vec![
            beat(0, 0, vec![]),
            beat(1, 1, vec![3]),
            beat(2, 0, vec![]),
            beat(3, 1, vec![]),
        ];
        BeatStore::new(beats, 44100, 2, 120.0).unwrap()
    }

    #[test]
    fn test_grid_cell_math() {
        assert_eq!(grid_cell(0, 80), (0, 0));
        assert_eq!(grid_cell(79, 80), (0, 79));
        assert_eq!(grid_cell(80, 80), (1, 0));
        assert_eq!(grid_cell(163, 80), (2, 3));
    }

    #[test]
    fn test_marker_selection() {
        let counting = PlayStep {
            beat: 0,
            seq_len: 8,
            seq_pos: 3,
        };
        assert_eq!(marker_for(&counting), Marker::Counting(5));

        let stuck = PlayStep {
            beat: 0,
            seq_len: 8,
            seq_pos: 8,
        };
        assert_eq!(marker_for(&stuck), Marker::Stuck);
    }

    #[test]
    fn test_segment_map_parity() {
        assert_eq!(segment_map(&four_beat_store()), "#-#-");
    }

    #[test]
    fn test_wrapped_grid_scenario() {
        // 4 beats with segments [0,1,0,1] at width 2 wrap into two
        // identical "#-" rows.
        let store = four_beat_store();
        let step = PlayStep {
            beat: 0,
            seq_len: 8,
            seq_pos: 0,
        };
        let mut screen = MemoryScreen::new(2);
        draw_progress(&store, &step, &mut screen, 0).unwrap();

        // beat 0 is under the marker; the rest of the base map survives
        assert_eq!(screen.row_text(0).len(), 2);
        assert_eq!(screen.row_text(1), "#-");
    }

    #[test]
    fn test_candidates_highlighted_in_reverse() {
        let store = four_beat_store();
        let step = PlayStep {
            beat: 1,
            seq_len: 8,
            seq_pos: 2,
        };
        let mut screen = MemoryScreen::new(4);
        draw_progress(&store, &step, &mut screen, 0).unwrap();

        // beat 3 is a candidate of beat 1: same glyph, reverse style
        assert_eq!(screen.style_at(0, 3), Some(Style::Reverse));
        assert_eq!(screen.row_text(0).chars().nth(3), Some('-'));
    }

    #[test]
    fn test_countdown_marker_is_zero_padded() {
        let store = four_beat_store();
        let step = PlayStep {
            beat: 0,
            seq_len: 8,
            seq_pos: 3,
        };
        let mut screen = MemoryScreen::new(80);
        draw_progress(&store, &step, &mut screen, 0).unwrap();

        assert_eq!(&screen.row_text(0)[0..2], "05");
        assert_eq!(screen.style_at(0, 0), Some(Style::Marker));
        assert_eq!(screen.style_at(0, 1), Some(Style::Marker));
    }

    #[test]
    fn test_stuck_marker_replaces_countdown() {
        // Jump was due (seq_pos == seq_len) and the next step is not a
        // candidate of the current beat, so the map shows the stuck
        // glyph rather than "00".
        let store = four_beat_store();
        let step = PlayStep {
            beat: 2,
            seq_len: 8,
            seq_pos: 8,
        };
        let mut screen = MemoryScreen::new(80);
        draw_progress(&store, &step, &mut screen, 0).unwrap();

        assert_eq!(&screen.row_text(0)[2..4], ":(");
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = four_beat_store();
        let step = PlayStep {
            beat: 1,
            seq_len: 8,
            seq_pos: 4,
        };

        let mut first = MemoryScreen::new(3);
        draw_progress(&store, &step, &mut first, 5).unwrap();
        let mut second = MemoryScreen::new(3);
        draw_progress(&store, &step, &mut second, 5).unwrap();

        assert_eq!(first.cells.len(), second.cells.len());
        for (pos, cell) in &first.cells {
            assert_eq!(second.cells.get(pos), Some(cell));
        }
    }

    #[test]
    fn test_row_offset_applies_to_all_rows() {
        let store = four_beat_store();
        let step = PlayStep {
            beat: 3,
            seq_len: 2,
            seq_pos: 0,
        };
        let mut screen = MemoryScreen::new(2);
        draw_progress(&store, &step, &mut screen, 10).unwrap();

        assert_eq!(screen.row_text(10), "#-");
        assert!(screen.row_text(0).is_empty());
    }

    #[test]
    fn test_track_summary_formats_duration() {
        let store = four_beat_store();
        let info = TrackInfo {
            name: "song.mp3".to_string(),
            duration: 3723.0,
            clusters: 3,
            segments: 2,
        };
        let summary = track_summary(&store, &info, false);
        assert!(summary.contains("01:02:03"));
        assert!(summary.contains("song.mp3"));
        assert!(summary.contains("44100"));
        assert!(!summary.contains(&cluster_map(&store)));

        let verbose = track_summary(&store, &info, true);
        assert!(verbose.contains(&cluster_map(&store)));
    }
}
