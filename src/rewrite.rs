//! Per-event rewrite transform
//!
//! Applies the active rule set to a single MIDI event in place. Only
//! note-on/note-off events are touched; every other event kind passes
//! through untouched.

use crate::mapping::RuleSet;
use midly::num::u4;
use midly::{MidiMessage, TrackEventKind};

/// Fixed output channel for all rewritten note events (MIDI channel 10).
pub const DRUM_CHANNEL: u8 = 9;

/// Stateless per-event rewriter for one batch.
///
/// `rules` is `None` in pass-through mode: notes and velocities are kept
/// as-is and only the channel is forced.
pub struct Rewriter {
    rules: Option<RuleSet>,
}

impl Rewriter {
    pub fn new(rules: Option<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn pass_through() -> Self {
        Self { rules: None }
    }

    pub fn is_pass_through(&self) -> bool {
        self.rules.is_none()
    }

    /// Rewrite one event in place.
    ///
    /// For note-on and note-off events the channel is always forced to
    /// [`DRUM_CHANNEL`], the note goes through the rule tables, and the
    /// velocity is adjusted only for a sounding note-on (velocity > 0; a
    /// velocity-0 note-on is a conventional note-off and keeps its
    /// velocity). All other event kinds are left untouched.
    pub fn rewrite_event(&self, kind: &mut TrackEventKind) {
        let TrackEventKind::Midi { channel, message } = kind else {
            return;
        };

        match message {
            MidiMessage::NoteOn { key, vel } => {
                *channel = u4::from(DRUM_CHANNEL);
                if let Some(rules) = &self.rules {
                    let source = key.as_int();
                    let velocity = vel.as_int();
                    *key = rules.target_note(source, velocity).into();
                    if velocity > 0 {
                        *vel = rules.output_velocity(source, velocity).into();
                    }
                }
            }
            MidiMessage::NoteOff { key, vel } => {
                *channel = u4::from(DRUM_CHANNEL);
                if let Some(rules) = &self.rules {
                    // Note-off velocity is never rewritten
                    *key = rules.target_note(key.as_int(), vel.as_int()).into();
                }
            }
            _ => {}
        }
    }

    /// Rewrite every event of every track of a parsed MIDI file, preserving
    /// track and event order.
    pub fn rewrite_file(&self, smf: &mut midly::Smf) {
        for track in smf.tracks.iter_mut() {
            for event in track.iter_mut() {
                self.rewrite_event(&mut event.kind);
            }
        }
    }
}
