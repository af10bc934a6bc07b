//! MIDI Drum Remapper
//!
//! Rewrites percussion notes inside MIDI files according to an XML
//! conversion table, forcing every rewritten note onto the drum channel
//! (MIDI channel 10), over a batch of files with interactive handling of
//! output-file conflicts.

pub mod batch;
pub mod error;
pub mod inspect;
pub mod loader;
pub mod mapping;
pub mod prefs;
pub mod rewrite;

pub use batch::{
    resolve_output_path, BatchOutcome, BatchRequest, BatchRunner, BlanketPrompt, ConflictDecision,
    ConflictPrompt, FileResult, ProgressSink,
};
pub use error::{RemapError, Result};
pub use inspect::{inspect_file, InspectReport};
pub use loader::{MappingLoader, PASS_THROUGH_NAME};
pub use mapping::{ConditionalTarget, RuleSet};
pub use prefs::Preferences;
pub use rewrite::{Rewriter, DRUM_CHANNEL};

/// Default suffix appended to output filenames when no template names one.
pub const DEFAULT_SUFFIX: &str = "_remap";
