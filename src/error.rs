use thiserror::Error;

use crate::notes::MidiByte;

/// Everything that can go wrong inside the engine. Build-time problems
/// (unparsable symbols) and range problems are recoverable and left to the
/// caller; internal invariant violations are bugs and panic instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown chord symbol: {0}")]
    UnknownChordSymbol(String),
    #[error("unknown chord structure: {0}")]
    UnknownChordStructure(String),
    #[error("pitch {pitch} is outside the playable range 0-127")]
    PitchOutOfRange { pitch: MidiByte },
    #[error("measure {measure} is beyond the progression length {length}")]
    MeasureOutOfRange { measure: usize, length: usize },
}
