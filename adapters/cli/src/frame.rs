use lasergrid_core::Snapshot;
use lasergrid_system_decision::EngineError;
use thiserror::Error;

/// Optional key the game server places in front of each board record.
pub(crate) const FRAME_PREFIX: &str = "board=";

/// Reasons a frame could not be answered with a decision.
#[derive(Debug, Error)]
pub(crate) enum FrameError {
    /// The line held no record.
    #[error("frame is empty")]
    Empty,
    /// The record was not valid snapshot JSON.
    #[error("invalid snapshot record: {0}")]
    Record(#[from] serde_json::Error),
    /// The decision loop rejected the snapshot.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Decodes one input line into a snapshot.
pub(crate) fn parse(line: &str) -> Result<Snapshot, FrameError> {
    let trimmed = line.trim();
    let record = trimmed.strip_prefix(FRAME_PREFIX).unwrap_or(trimmed).trim();
    if record.is_empty() {
        return Err(FrameError::Empty);
    }
    Ok(serde_json::from_str(record)?)
}
