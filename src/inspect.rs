//! MIDI file inspection
//!
//! Summarizes the sounding note-ons of a MIDI file so remapper output can be
//! checked: which notes occur, on which channels, and whether everything
//! landed on the drum channel.

use crate::error::{RemapError, Result};
use crate::rewrite::DRUM_CHANNEL;
use midly::{MidiMessage, Smf, TrackEventKind};
use std::collections::BTreeSet;
use std::path::Path;

/// Summary of the sounding note-on events in one MIDI file.
#[derive(Debug, Clone)]
pub struct InspectReport {
    /// Count of note-on events with velocity > 0.
    pub note_count: usize,
    /// Distinct note numbers, sorted.
    pub notes: BTreeSet<u8>,
    /// Distinct channels carrying those notes, sorted.
    pub channels: BTreeSet<u8>,
}

impl InspectReport {
    /// True when every sounding note is on the drum channel.
    pub fn all_on_drum_channel(&self) -> bool {
        !self.channels.is_empty() && self.channels.iter().all(|&c| c == DRUM_CHANNEL)
    }
}

/// Parse a MIDI file and report its sounding note-ons.
pub fn inspect_file(path: &Path) -> Result<InspectReport> {
    let bytes = std::fs::read(path)
        .map_err(|e| RemapError::MidiRead(path.to_path_buf(), e.to_string()))?;
    let smf = Smf::parse(&bytes)
        .map_err(|e| RemapError::MidiRead(path.to_path_buf(), e.to_string()))?;

    let mut report = InspectReport {
        note_count: 0,
        notes: BTreeSet::new(),
        channels: BTreeSet::new(),
    };

    for track in &smf.tracks {
        for event in track {
            if let TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            } = event.kind
            {
                if vel.as_int() > 0 {
                    report.note_count += 1;
                    report.notes.insert(key.as_int());
                    report.channels.insert(channel.as_int());
                }
            }
        }
    }

    Ok(report)
}
