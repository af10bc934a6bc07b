//! Error types for the drum remapper

use std::fmt;
use std::path::PathBuf;

/// Custom error type for drum remapping
#[derive(Debug, Clone)]
pub enum RemapError {
    /// E001: Mapping file not found
    MappingNotFound(PathBuf),
    /// E002: Mapping file parsed but yielded no usable rules, or was not valid XML
    MappingFormat(String),
    /// E003: Failed to read or decode an input MIDI file
    MidiRead(PathBuf, String),
    /// E004: Failed to encode or write an output MIDI file
    MidiWrite(PathBuf, String),
    /// E005: File I/O error
    Io(String),
}

impl fmt::Display for RemapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemapError::MappingNotFound(path) => {
                write!(f, "E001: Mapping file not found: {}", path.display())
            }
            RemapError::MappingFormat(msg) => {
                write!(f, "E002: Invalid mapping file - {}", msg)
            }
            RemapError::MidiRead(path, msg) => {
                write!(f, "E003: Failed to read MIDI file {} - {}", path.display(), msg)
            }
            RemapError::MidiWrite(path, msg) => {
                write!(f, "E004: Failed to write MIDI file {} - {}", path.display(), msg)
            }
            RemapError::Io(msg) => {
                write!(f, "E005: File I/O error - {}", msg)
            }
        }
    }
}

impl std::error::Error for RemapError {}

impl From<std::io::Error> for RemapError {
    fn from(err: std::io::Error) -> Self {
        RemapError::Io(err.to_string())
    }
}

/// Result type alias for remapper operations
pub type Result<T> = std::result::Result<T, RemapError>;
