//! Loads the analyzer's bundle: beat metadata plus the decoded track.
//!
//! The analyzer writes a JSON file describing the beats, the play
//! vector, and the track-wide parameters, next to a WAV holding the
//! decoded audio. This module glues the two back together by slicing
//! each beat's buffer out of the WAV.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::beats::{Beat, BeatStore, PlayStep, PlayVector};
use crate::error::{JukeboxError, Result};
use crate::progress::ProgressSink;
use crate::visualizer::TrackInfo;

/// Serialized shape of the analyzer's output file.
#[derive(Debug, Deserialize)]
struct BundleFile {
    /// Display name of the analyzed track.
    track: String,
    /// Path to the decoded WAV, relative to the bundle file.
    audio: String,
    sample_rate: u32,
    /// Track tempo in bpm.
    tempo: f64,
    clusters: usize,
    segments: usize,
    beats: Vec<Beat>,
    play_vector: Vec<PlayStep>,
}

/// Read a bundle and return the validated store, play vector, and the
/// summary info block.
pub fn load_bundle(
    path: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<(BeatStore, PlayVector, TrackInfo)> {
    progress.report(0.0, "Reading analysis bundle...");
    let file = File::open(path)
        .map_err(|e| JukeboxError::Bundle(format!("{}: {e}", path.display())))?;
    let bundle: BundleFile = serde_json::from_reader(BufReader::new(file))?;

    progress.report(0.2, "Reading decoded audio...");
    let wav_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&bundle.audio);
    let mut reader = hound::WavReader::open(&wav_path)?;
    let spec = reader.spec();
    if spec.sample_rate != bundle.sample_rate {
        return Err(JukeboxError::Bundle(format!(
            "bundle says {} Hz but {} is {} Hz",
            bundle.sample_rate,
            wav_path.display(),
            spec.sample_rate
        )));
    }
    let samples = read_samples(&mut reader)?;

    progress.report(0.6, "Slicing beats...");
    let channels = spec.channels as usize;
    let total_frames = samples.len() / channels.max(1);
    let mut beats = bundle.beats;
    for beat in &mut beats {
        let first = ((beat.start * spec.sample_rate as f64) as usize).min(total_frames);
        let count = (beat.duration * spec.sample_rate as f64) as usize;
        let last = (first + count).min(total_frames);
        beat.buffer = samples[first * channels..last * channels].to_vec();
    }

    let track_duration = beats.last().map(|b| b.start + b.duration).unwrap_or(0.0);
    let store = BeatStore::new(beats, bundle.sample_rate, spec.channels, bundle.tempo)?;
    let play = PlayVector::new(bundle.play_vector, &store)?;
    let info = TrackInfo {
        name: bundle.track,
        duration: track_duration,
        clusters: bundle.clusters,
        segments: bundle.segments,
    };

    log::info!(
        "loaded '{}': {} beats, {} steps, {} Hz",
        info.name,
        store.len(),
        play.len(),
        store.sample_rate()
    );
    progress.report(1.0, "Ready.");
    Ok((store, play, info))
}

/// Decode the WAV body to f32 regardless of its stored sample format.
fn read_samples(reader: &mut hound::WavReader<BufReader<File>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(JukeboxError::from),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(JukeboxError::from)
        }
    }
}
