use thiserror::Error;

/// Errors surfaced by the playback core.
#[derive(Debug, Error)]
pub enum JukeboxError {
    /// The output device was opened at a different rate than the beat
    /// store was sampled at. Playing through it would shift pitch and
    /// tempo, so this aborts before any buffer is queued.
    #[error("sample rate mismatch: beat store is {store} Hz but output device is {device} Hz")]
    SampleRateMismatch { store: u32, device: u32 },

    #[error("beat id {id} is out of range (store holds {len} beats)")]
    BeatOutOfRange { id: usize, len: usize },

    #[error("start beat {id} never occurs in the play vector")]
    StartBeatNotPlayed { id: usize },

    #[error("invalid beat data: {0}")]
    InvalidBeat(String),

    #[error("invalid play vector: {0}")]
    InvalidPlayVector(String),

    #[error("malformed analysis bundle: {0}")]
    Bundle(String),

    #[error("audio output error: {0}")]
    Output(String),

    #[error("terminal error: {0}")]
    Screen(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, JukeboxError>;
