//! Offline remix rendering.
//!
//! Writes the same buffers the scheduler would have queued, concatenated
//! without real-time pacing, to a WAV file.

use std::path::Path;

use crate::beats::{BeatStore, PlayVector};
use crate::error::Result;

/// Number of play-vector steps that cover roughly `seconds` of audio at
/// the store's tempo.
pub fn steps_for_duration(store: &BeatStore, seconds: f64) -> usize {
    let avg_beat = 60.0 / store.tempo();
    (seconds / avg_beat) as usize
}

/// Render the first `seconds` of the remix to `path`.
pub fn save_remix(store: &BeatStore, play: &PlayVector, seconds: f64, path: &Path) -> Result<usize> {
    let spec = hound::WavSpec {
        channels: store.channels(),
        sample_rate: store.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let count = steps_for_duration(store, seconds).min(play.len());
    for step in &play.steps()[..count] {
        let beat = store.get(step.beat)?;
        for &sample in &beat.buffer {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    log::info!("saved {count} beats to {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beats::{Beat, PlayStep};

    fn store() -> BeatStore {
        let beats = (0..3)
            .map(|i| Beat {
                id: i,
                start: i as f64 * 0.5,
                duration: 0.5,
                segment: 0,
                cluster: 0,
                jump_candidates: vec![],
                buffer: vec![i as f32; 4],
            })
            .collect();
        BeatStore::new(beats, 8, 1, 120.0).unwrap()
    }

    #[test]
    fn test_steps_for_duration_uses_tempo() {
        // 120 bpm -> 0.5s per beat -> 10s covers 20 beats
        assert_eq!(steps_for_duration(&store(), 10.0), 20);
        assert_eq!(steps_for_duration(&store(), 0.4), 0);
    }

    #[test]
    fn test_save_concatenates_in_play_order() {
        let s = store();
        let steps = [2, 0, 1]
            .iter()
            .map(|&b| PlayStep {
                beat: b,
                seq_len: 4,
                seq_pos: 0,
            })
            .collect();
        let play = PlayVector::new(steps, &s).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remix.wav");
        // ask for more audio than the vector holds; the write truncates
        let written = save_remix(&s, &play, 60.0, &path).unwrap();
        assert_eq!(written, 3);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        let expected: Vec<f32> = [2.0f32, 0.0, 1.0]
            .iter()
            .flat_map(|&v| std::iter::repeat(v).take(4))
            .collect();
        assert_eq!(samples, expected);
    }
}
