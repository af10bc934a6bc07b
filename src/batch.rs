//! Batch remapping pipeline
//!
//! Resolves output paths for a batch of input files, walks the user through
//! pre-existing-file conflicts, then remaps each surviving file in input
//! order. One file failing never stops the rest of the batch; cancelling a
//! conflict prompt aborts everything before any file is written.

use crate::error::{RemapError, Result};
use crate::loader::MappingLoader;
use crate::rewrite::Rewriter;
use midly::Smf;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// Recognized MIDI file extensions (lowercase, without the dot).
pub const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

/// Answer to one output-file conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    Overwrite,
    /// Overwrite this conflict and all remaining undecided ones.
    OverwriteAll,
    Skip,
    /// Skip this conflict and all remaining undecided ones.
    SkipAll,
    /// Abort the whole batch; nothing is processed.
    Cancel,
}

/// Asks the user what to do about one conflicting output file.
///
/// `multiple` is false when the batch has exactly one conflict; Skip and
/// SkipAll are only offered when it is true. Implementations may block; the
/// batch worker suspends until a decision arrives.
pub trait ConflictPrompt {
    fn decide(&mut self, input: &Path, output: &Path, multiple: bool) -> ConflictDecision;
}

/// Prompt that answers every conflict with the same decision, for
/// non-interactive runs.
pub struct BlanketPrompt(pub ConflictDecision);

impl ConflictPrompt for BlanketPrompt {
    fn decide(&mut self, _input: &Path, _output: &Path, _multiple: bool) -> ConflictDecision {
        self.0
    }
}

/// Observer for per-file progress; purely informational.
pub trait ProgressSink {
    fn on_progress(&mut self, current: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn on_progress(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Outcome of one file in a batch.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: Vec<FileResult>,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// One batch request: what to remap, with which mapping, to where.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Input files, in the order conflicts are decided and files processed.
    pub files: Vec<PathBuf>,
    /// Mapping file name, or the pass-through pseudo-name.
    pub mapping: String,
    /// Output path template; see [`resolve_output_path`].
    pub output_template: String,
    /// Suffix appended to the input stem when the template names no file.
    pub default_suffix: String,
}

/// Resolve the destination path for one input file.
///
/// Tiers, in order:
/// 1. Empty template: sibling file `{stem}{suffix}{ext}` next to the input.
/// 2. Template containing `{filename}`, `{ext}` or `{input_dir}`: substitute
///    all placeholders and use the result as the literal destination.
/// 3. Template with a recognized MIDI extension: literal fixed destination
///    for every input (last write wins across a batch).
/// 4. Anything else: treat the template as a directory and append
///    `{stem}{suffix}{ext}`.
pub fn resolve_output_path(input: &Path, template: &str, suffix: &str) -> PathBuf {
    let template = template.trim();
    if template.is_empty() {
        return input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(suffixed_name(input, suffix));
    }

    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let input_dir = input
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let placeholders = [
        ("{filename}", stem.to_string()),
        ("{ext}", ext),
        ("{input_dir}", input_dir),
    ];

    if placeholders.iter().any(|(key, _)| template.contains(key)) {
        let mut resolved = template.to_string();
        for (key, value) in &placeholders {
            resolved = resolved.replace(key, value);
        }
        return PathBuf::from(resolved);
    }

    let candidate = PathBuf::from(template);
    let is_midi = candidate
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| MIDI_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false);
    if is_midi {
        return candidate;
    }

    candidate.join(suffixed_name(input, suffix))
}

/// `{stem}{suffix}{ext}` for an input file, e.g. `song.mid` -> `song_remap.mid`.
fn suffixed_name(input: &Path, suffix: &str) -> String {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext),
        None => format!("{}{}", stem, suffix),
    }
}

/// Remap a single MIDI file from `input` to `output`.
///
/// The rewritten file is serialized fully in memory and written in one shot,
/// so a decode or encode failure leaves the destination untouched.
pub fn remap_file(rewriter: &Rewriter, input: &Path, output: &Path) -> Result<()> {
    let bytes = std::fs::read(input)
        .map_err(|e| RemapError::MidiRead(input.to_path_buf(), e.to_string()))?;
    let mut smf = Smf::parse(&bytes)
        .map_err(|e| RemapError::MidiRead(input.to_path_buf(), e.to_string()))?;

    rewriter.rewrite_file(&mut smf);

    let mut encoded = Vec::new();
    smf.write(&mut encoded)
        .map_err(|e| RemapError::MidiWrite(output.to_path_buf(), e.to_string()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RemapError::MidiWrite(output.to_path_buf(), e.to_string()))?;
        }
    }
    std::fs::write(output, &encoded)
        .map_err(|e| RemapError::MidiWrite(output.to_path_buf(), e.to_string()))
}

/// Drives batch remapping: one rule set per batch, sequential files, at most
/// one batch at a time per runner.
pub struct BatchRunner {
    loader: MappingLoader,
}

impl BatchRunner {
    pub fn new(loader: MappingLoader) -> Self {
        Self { loader }
    }

    /// Run a batch synchronously.
    ///
    /// Fails only when the mapping cannot be loaded; per-file problems are
    /// recorded in the returned [`BatchOutcome`] instead.
    pub fn run(
        &self,
        request: &BatchRequest,
        prompt: &mut dyn ConflictPrompt,
        progress: &mut dyn ProgressSink,
    ) -> Result<BatchOutcome> {
        // Load the rule set first so a bad mapping surfaces before any
        // file is touched.
        let rules = self.loader.load(&request.mapping)?;
        let rewriter = Rewriter::new(rules);

        let pairs: Vec<(PathBuf, PathBuf)> = request
            .files
            .iter()
            .map(|input| {
                let output =
                    resolve_output_path(input, &request.output_template, &request.default_suffix);
                (input.clone(), output)
            })
            .collect();

        let include = match resolve_conflicts(&pairs, prompt) {
            Some(include) => include,
            None => {
                return Ok(BatchOutcome {
                    results: Vec::new(),
                    cancelled: true,
                });
            }
        };

        let work_list: Vec<&(PathBuf, PathBuf)> = pairs
            .iter()
            .zip(&include)
            .filter(|(_, keep)| **keep)
            .map(|(pair, _)| pair)
            .collect();

        let total = work_list.len();
        let mut results = Vec::with_capacity(total);
        for (i, (input, output)) in work_list.into_iter().enumerate() {
            let outcome = remap_file(&rewriter, input, output);
            results.push(FileResult {
                input: input.clone(),
                output: output.clone(),
                success: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            });
            progress.on_progress(i + 1, total);
        }

        Ok(BatchOutcome {
            results,
            cancelled: false,
        })
    }

    /// Run a batch on a dedicated worker thread so the caller stays
    /// responsive. The worker blocks inside the prompt while a conflict
    /// decision is pending; that is its only suspension point before
    /// processing begins.
    pub fn spawn<P, S>(
        self,
        request: BatchRequest,
        mut prompt: P,
        mut progress: S,
    ) -> JoinHandle<Result<BatchOutcome>>
    where
        P: ConflictPrompt + Send + 'static,
        S: ProgressSink + Send + 'static,
    {
        std::thread::spawn(move || self.run(&request, &mut prompt, &mut progress))
    }
}

/// Decide which files stay in the batch.
///
/// Inputs whose predicted destination does not exist always stay. Conflicts
/// are decided in input order, one prompt each until a blanket decision is
/// made. Returns `None` on Cancel: the whole batch is dropped. The returned
/// flags preserve input order, so the surviving work list does too.
fn resolve_conflicts(
    pairs: &[(PathBuf, PathBuf)],
    prompt: &mut dyn ConflictPrompt,
) -> Option<Vec<bool>> {
    let conflicts: Vec<usize> = pairs
        .iter()
        .enumerate()
        .filter(|(_, (_, output))| output.exists())
        .map(|(i, _)| i)
        .collect();

    let multiple = conflicts.len() > 1;
    let mut include = vec![true; pairs.len()];
    let mut blanket: Option<bool> = None;

    for i in conflicts {
        let (input, output) = &pairs[i];
        include[i] = match blanket {
            Some(keep) => keep,
            None => match prompt.decide(input, output, multiple) {
                ConflictDecision::Overwrite => true,
                ConflictDecision::OverwriteAll => {
                    blanket = Some(true);
                    true
                }
                ConflictDecision::Skip => false,
                ConflictDecision::SkipAll => {
                    blanket = Some(false);
                    false
                }
                ConflictDecision::Cancel => return None,
            },
        };
    }

    Some(include)
}
