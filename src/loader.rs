//! Mapping loader
//!
//! Loads conversion tables from XML mapping files. Three element kinds are
//! accepted, freely mixed in one document:
//!
//! - `<Note from="38" to="40" velocity="100"/>` - a bare rule
//! - `<Group to="40" velocity="100"> <Note from="38"/> ... </Group>` - members
//!   inherit the group's target and velocity unless they carry their own
//! - `<If velocity="100"> <Note from="38" to="40" velocity="127"/> </If>` -
//!   rules that apply only when the incoming velocity equals the condition
//!
//! Bad entries are skipped with a warning and never abort the load; a file
//! that produces no usable entry at all is rejected.

use crate::error::{RemapError, Result};
use crate::mapping::{ConditionalTarget, RuleSet};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reserved mapping name selecting pass-through mode: no table is loaded and
/// only the drum channel is forced.
pub const PASS_THROUGH_NAME: &str = "as Source";

/// Loads mapping files from a mappings directory.
pub struct MappingLoader {
    mappings_dir: PathBuf,
}

impl MappingLoader {
    pub fn new<P: AsRef<Path>>(mappings_dir: P) -> Self {
        Self {
            mappings_dir: mappings_dir.as_ref().to_path_buf(),
        }
    }

    /// Default mappings directory: `mappings/` next to the executable, or
    /// relative to the working directory if the executable path is unknown.
    pub fn default_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("mappings")))
            .unwrap_or_else(|| PathBuf::from("mappings"))
    }

    pub fn mappings_dir(&self) -> &Path {
        &self.mappings_dir
    }

    /// List available conversion table files, sorted, with the pass-through
    /// pseudo-entry first.
    pub fn list_available(&self) -> Vec<String> {
        let mut tables = Vec::new();

        if let Ok(entries) = std::fs::read_dir(&self.mappings_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_xml = path
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case("xml"))
                    .unwrap_or(false);
                // Conversion table naming convention, e.g. "ssd5_to_musescore.xml"
                let is_table = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.contains("to"))
                    .unwrap_or(false);
                if is_xml && is_table {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        tables.push(name.to_string());
                    }
                }
            }
        }

        tables.sort();
        tables.insert(0, PASS_THROUGH_NAME.to_string());
        tables
    }

    /// Load a conversion table by file name.
    ///
    /// Returns `Ok(None)` for the reserved pass-through name. Fails with
    /// [`RemapError::MappingNotFound`] if the file is absent and
    /// [`RemapError::MappingFormat`] if it holds no usable entries.
    pub fn load(&self, name: &str) -> Result<Option<RuleSet>> {
        if name == PASS_THROUGH_NAME {
            return Ok(None);
        }

        let filepath = self.mappings_dir.join(name);
        if !filepath.exists() {
            return Err(RemapError::MappingNotFound(filepath));
        }

        let text = std::fs::read_to_string(&filepath)?;
        parse_rules(&text).map(Some)
    }
}

/// Parse an XML mapping document into a [`RuleSet`].
pub fn parse_rules(text: &str) -> Result<RuleSet> {
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| RemapError::MappingFormat(format!("XML parse error: {}", e)))?;

    let mut notes: HashMap<u8, u8> = HashMap::new();
    let mut velocities: HashMap<u8, u8> = HashMap::new();
    let mut conditionals: HashMap<u8, HashMap<u8, ConditionalTarget>> = HashMap::new();

    for elem in doc.root_element().children().filter(|n| n.is_element()) {
        match elem.tag_name().name() {
            "Note" => {
                if let Some((source, target, velocity)) = parse_note(&elem, None, None) {
                    notes.insert(source, target);
                    if let Some(vel) = velocity {
                        velocities.insert(source, vel);
                    }
                }
            }
            "Group" => {
                let group_to = match elem.attribute("to").map(parse_midi_value) {
                    Some(Ok(v)) => v,
                    Some(Err(raw)) => {
                        eprintln!("Warning: Invalid 'to' value in Group: {}", raw);
                        continue;
                    }
                    None => {
                        eprintln!("Warning: Group element missing 'to' attribute. Skipping.");
                        continue;
                    }
                };
                let group_velocity = match elem.attribute("velocity").map(parse_midi_value) {
                    Some(Ok(v)) => Some(v),
                    Some(Err(raw)) => {
                        eprintln!("Warning: Invalid 'velocity' value in Group: {}", raw);
                        None
                    }
                    None => None,
                };

                for note_elem in elem.children().filter(|n| n.has_tag_name("Note")) {
                    if let Some((source, target, velocity)) =
                        parse_note(&note_elem, Some(group_to), group_velocity)
                    {
                        notes.insert(source, target);
                        if let Some(vel) = velocity {
                            velocities.insert(source, vel);
                        }
                    }
                }
            }
            "If" => {
                let condition = match elem.attribute("velocity").map(parse_midi_value) {
                    Some(Ok(v)) => v,
                    Some(Err(raw)) => {
                        eprintln!("Warning: Skipped invalid If condition: velocity={}", raw);
                        continue;
                    }
                    None => {
                        eprintln!("Warning: If element has no velocity attribute. Skipping.");
                        continue;
                    }
                };

                let table = conditionals.entry(condition).or_default();
                for note_elem in elem.children().filter(|n| n.has_tag_name("Note")) {
                    if let Some((source, target, velocity)) = parse_note(&note_elem, None, None) {
                        table.insert(
                            source,
                            ConditionalTarget {
                                note: target,
                                velocity,
                            },
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let rules = RuleSet::new(notes, velocities, conditionals);
    if rules.is_empty() {
        return Err(RemapError::MappingFormat(
            "no conversion entries found; <Note from=\"XX\" to=\"YY\"/> entries are required"
                .to_string(),
        ));
    }
    Ok(rules)
}

/// Parse a `Note` element into (source, target, velocity).
///
/// `default_to`/`default_velocity` come from an enclosing Group; the
/// element's own attributes win. Returns `None` when the entry is unusable
/// (missing or unparsable source/target), after printing a warning. An
/// out-of-range velocity only drops the velocity field.
fn parse_note(
    elem: &roxmltree::Node,
    default_to: Option<u8>,
    default_velocity: Option<u8>,
) -> Option<(u8, u8, Option<u8>)> {
    let from_str = elem.attribute("from")?;

    let source = match parse_midi_value(from_str) {
        Ok(v) => v,
        Err(raw) => {
            eprintln!("Warning: Skipped invalid conversion entry: from={}", raw);
            return None;
        }
    };

    let target = match elem.attribute("to") {
        Some(to_str) => match parse_midi_value(to_str) {
            Ok(v) => v,
            Err(raw) => {
                eprintln!(
                    "Warning: Skipped invalid conversion entry: from={} to={}",
                    from_str, raw
                );
                return None;
            }
        },
        None => default_to?,
    };

    // Note's own velocity wins over the group default
    let velocity = match elem.attribute("velocity") {
        Some(vel_str) => match vel_str.parse::<i64>() {
            Ok(v) if (0..=127).contains(&v) => Some(v as u8),
            Ok(v) => {
                eprintln!("Warning: Velocity value out of range (0-127): {}", v);
                None
            }
            Err(_) => {
                eprintln!("Warning: Skipped invalid conversion entry: from={}", from_str);
                return None;
            }
        },
        None => default_velocity,
    };

    Some((source, target, velocity))
}

/// Parse an attribute that must be a MIDI data value (0-127).
///
/// Returns the raw text on failure so callers can include it in a warning.
fn parse_midi_value(raw: &str) -> std::result::Result<u8, &str> {
    match raw.parse::<i64>() {
        Ok(v) if (0..=127).contains(&v) => Ok(v as u8),
        _ => Err(raw),
    }
}
