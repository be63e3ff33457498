use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use jukebox_core::{
    draw_progress, load_bundle, save_remix, segment_map, track_summary, NullProgress, Outcome,
    PlaybackOptions, RodioOutput, Scheduler, Screen, ScreenProgress, Style, TerminalScreen,
};

/// Plays an infinite, never-repeating remix of a pre-analyzed track.
#[derive(Parser, Debug)]
#[command(name = "jukebox")]
#[command(about = "Infinite remix playback with a live terminal map")]
struct Args {
    /// Analysis bundle (JSON written by the analyzer, next to its WAV)
    bundle: PathBuf,

    /// Start playback on a specific beat id
    #[arg(long)]
    start: Option<usize>,

    /// Save the remix to <LABEL>.wav instead of playing it
    #[arg(long, value_name = "LABEL")]
    save: Option<String>,

    /// Length in seconds to save. Used with --save
    #[arg(long, default_value_t = 180.0)]
    save_duration: f64,

    /// Also show the cluster map in the track summary
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("args: {args:?}");

    // Saving never touches the terminal map or the audio device.
    if let Some(label) = &args.save {
        let (store, play, info) =
            load_bundle(&args.bundle, &mut NullProgress).context("failed to load bundle")?;
        let out = PathBuf::from(format!("{label}.wav"));
        let written = save_remix(&store, &play, args.save_duration, &out)?;
        println!("{}", track_summary(&store, &info, args.verbose));
        println!("\n{}\n", segment_map(&store));
        println!("saved {written} beats to {}", out.display());
        return Ok(());
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupt);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("failed to install interrupt handler")?;
    }

    let mut screen = TerminalScreen::enter().context("failed to take over the terminal")?;

    let loaded = {
        let mut progress = ScreenProgress::new(&mut screen, 1);
        load_bundle(&args.bundle, &mut progress)
    };
    let (store, play, info) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            screen.restore()?;
            return Err(e).context("failed to load bundle");
        }
    };

    // Summary block above the map, mirroring what --save prints.
    let summary = track_summary(&store, &info, args.verbose);
    screen.clear()?;
    let mut row = 2u16;
    for line in summary.lines() {
        screen.put(row, 0, line, Style::Plain)?;
        row += 1;
    }
    screen.flush()?;
    let map_row = row + 1;

    let outcome = (|| -> Result<Outcome, anyhow::Error> {
        let mut device = RodioOutput::open(store.sample_rate(), store.channels())
            .context("failed to open audio output")?;
        let scheduler = Scheduler::new(Arc::clone(&interrupt));
        let outcome = scheduler.run(
            &store,
            &play,
            &mut device,
            |step| draw_progress(&store, step, &mut screen, map_row),
            PlaybackOptions {
                start_beat: args.start,
            },
        )?;
        Ok(outcome)
    })();

    let map_rows = (store.len() / screen.width().max(1) + 2) as u16;
    screen.move_below(map_row + map_rows)?;
    screen.restore()?;

    match outcome? {
        Outcome::Finished => println!("play vector exhausted"),
        Outcome::Interrupted => println!("interrupted"),
    }
    Ok(())
}
