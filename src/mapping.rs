//! Conversion table data model
//!
//! A [`RuleSet`] holds the three lookup tables loaded from one mapping file:
//! the unconditional note table, the unconditional velocity overrides, and
//! the velocity-conditional tables. It is built once per batch and read-only
//! afterwards, so it can be shared across files without locking.

use std::collections::HashMap;

/// Target of one conditional entry: the remapped note, plus an optional
/// explicit output velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalTarget {
    pub note: u8,
    pub velocity: Option<u8>,
}

/// Immutable lookup tables for one conversion mapping.
///
/// Lookup precedence, applied per event:
/// 1. A conditional table whose condition velocity equals the incoming
///    velocity exactly, if it has an entry for the source note.
/// 2. The unconditional note table.
/// 3. The source note unchanged.
///
/// Output velocity: a matching conditional entry's explicit velocity, else
/// the unconditional override for the source note, else the input velocity.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    notes: HashMap<u8, u8>,
    velocities: HashMap<u8, u8>,
    conditionals: HashMap<u8, HashMap<u8, ConditionalTarget>>,
}

impl RuleSet {
    pub fn new(
        notes: HashMap<u8, u8>,
        velocities: HashMap<u8, u8>,
        conditionals: HashMap<u8, HashMap<u8, ConditionalTarget>>,
    ) -> Self {
        Self {
            notes,
            velocities,
            conditionals,
        }
    }

    /// True when no table holds any entry. The loader rejects such a set;
    /// an empty `RuleSet` never reaches the rewriter.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
            && self.velocities.is_empty()
            && self.conditionals.values().all(|m| m.is_empty())
    }

    /// Number of entries in the unconditional note table.
    pub fn note_rule_count(&self) -> usize {
        self.notes.len()
    }

    /// Number of conditional tables (distinct condition velocities).
    pub fn conditional_count(&self) -> usize {
        self.conditionals.len()
    }

    fn conditional_entry(&self, note: u8, velocity: u8) -> Option<&ConditionalTarget> {
        self.conditionals.get(&velocity).and_then(|m| m.get(&note))
    }

    /// Remapped note for a source note at the given incoming velocity.
    pub fn target_note(&self, note: u8, velocity: u8) -> u8 {
        if let Some(target) = self.conditional_entry(note, velocity) {
            return target.note;
        }
        self.notes.get(&note).copied().unwrap_or(note)
    }

    /// Output velocity for a source note at the given incoming velocity.
    ///
    /// Callers apply this only to note-on events with velocity > 0; the
    /// table itself has no notion of event kind.
    pub fn output_velocity(&self, note: u8, velocity: u8) -> u8 {
        if let Some(target) = self.conditional_entry(note, velocity) {
            if let Some(vel) = target.velocity {
                return vel;
            }
        }
        self.velocities.get(&note).copied().unwrap_or(velocity)
    }
}
