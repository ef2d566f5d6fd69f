//! Filters applied to [`FileSystemPath::children`].
//!
//! Filters are shared by reference: every copy of a path holds the same
//! `Arc`, so enabling or disabling a filter affects all of them at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::trace;

use crate::error::PathError;

use super::path::FileSystemPath;
use super::sequence::{self, FRAME_PLACEHOLDER, FileSequence};

pub trait PathFilter: fmt::Debug + Send + Sync {
    /// Return the subset of `paths` this filter keeps, preserving order.
    fn filter(&self, paths: Vec<FileSystemPath>) -> Vec<FileSystemPath>;

    /// Disabled filters are skipped by their callers.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Keeps paths whose last name matches any of a set of glob patterns.
#[derive(Debug)]
pub struct MatchPatternFilter {
    patterns: Vec<String>,
    matcher: GlobSet,
    leaf_only: bool,
    inverted: bool,
    enabled: AtomicBool,
    label: Option<String>,
}

impl MatchPatternFilter {
    /// Non-leaf paths pass unconditionally; use [`leaf_only`](Self::leaf_only)
    /// to match directories as well.
    pub fn new<I, S>(patterns: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|source| PathError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let matcher = builder.build().map_err(|source| PathError::InvalidPattern {
            pattern: patterns.join(" "),
            source,
        })?;

        Ok(Self {
            patterns,
            matcher,
            leaf_only: true,
            inverted: false,
            enabled: AtomicBool::new(true),
            label: None,
        })
    }

    pub fn leaf_only(mut self, leaf_only: bool) -> Self {
        self.leaf_only = leaf_only;
        self
    }

    /// Keep the paths that do *not* match instead.
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn keeps(&self, path: &FileSystemPath) -> bool {
        if self.leaf_only && !path.is_leaf() {
            return true;
        }
        self.matcher.is_match(path.name()) != self.inverted
    }
}

impl PathFilter for MatchPatternFilter {
    fn filter(&self, paths: Vec<FileSystemPath>) -> Vec<FileSystemPath> {
        paths.into_iter().filter(|path| self.keeps(path)).collect()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Which kinds of file a [`FileSequenceFilter`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Files that belong to no sequence.
    Files,
    /// Files that are members of a sequence.
    SequentialFiles,
    /// Sequence placeholders.
    Sequences,
    /// Plain files and placeholders, hiding the members.
    Concise,
    /// Everything.
    Verbose,
}

impl SequenceMode {
    fn keeps_files(self) -> bool {
        matches!(self, SequenceMode::Files | SequenceMode::Concise | SequenceMode::Verbose)
    }

    fn keeps_sequential_files(self) -> bool {
        matches!(self, SequenceMode::SequentialFiles | SequenceMode::Verbose)
    }

    fn keeps_sequences(self) -> bool {
        matches!(self, SequenceMode::Sequences | SequenceMode::Concise | SequenceMode::Verbose)
    }
}

/// Chooses between sequence placeholders and their member files.
///
/// Directories always pass, as do paths listed without sequences.
#[derive(Debug)]
pub struct FileSequenceFilter {
    mode: SequenceMode,
    enabled: AtomicBool,
}

impl FileSequenceFilter {
    pub fn new(mode: SequenceMode) -> Self {
        Self { mode, enabled: AtomicBool::new(true) }
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl PathFilter for FileSequenceFilter {
    fn filter(&self, paths: Vec<FileSystemPath>) -> Vec<FileSystemPath> {
        // Membership is decided among siblings, so classify per directory.
        let leaves: Vec<bool> = paths.iter().map(FileSystemPath::is_leaf).collect();
        let mut names_by_dir: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (path, &leaf) in paths.iter().zip(&leaves) {
            if path.include_sequences() && leaf {
                names_by_dir.entry(parent_key(path)).or_default().push(path.name());
            }
        }
        let sequences_by_dir: BTreeMap<String, Vec<FileSequence>> = names_by_dir
            .into_iter()
            .map(|(dir, names)| (dir, sequence::find_sequences(names)))
            .collect();

        let mode = self.mode;
        paths
            .into_iter()
            .zip(leaves)
            .filter(|(path, leaf)| {
                if !leaf || !path.include_sequences() {
                    return true;
                }
                let sequences =
                    sequences_by_dir.get(&parent_key(path)).map(Vec::as_slice).unwrap_or_default();
                let name = path.name();
                if name.contains(FRAME_PLACEHOLDER) {
                    mode.keeps_sequences()
                } else if sequences.iter().any(|sequence| sequence.contains_file(name)) {
                    mode.keeps_sequential_files()
                } else {
                    mode.keeps_files()
                }
            })
            .map(|(path, _)| path)
            .collect()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

fn parent_key(path: &FileSystemPath) -> String {
    path.parent().map(|parent| parent.string()).unwrap_or_default()
}

/// Applies its enabled filters in order.
#[derive(Debug, Default)]
pub struct CompoundFilter {
    filters: Vec<Arc<dyn PathFilter>>,
}

impl CompoundFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: Arc<dyn PathFilter>) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[Arc<dyn PathFilter>] {
        &self.filters
    }
}

impl PathFilter for CompoundFilter {
    fn filter(&self, paths: Vec<FileSystemPath>) -> Vec<FileSystemPath> {
        self.filters
            .iter()
            .filter(|filter| filter.is_enabled())
            .fold(paths, |paths, filter| filter.filter(paths))
    }
}

/// The filter a file dialog starts with: optional extension matching, an
/// optional concise sequence view and hiding of dot files.
#[derive(Debug)]
pub struct StandardFilter {
    extensions: Option<Arc<MatchPatternFilter>>,
    sequences: Option<Arc<FileSequenceFilter>>,
    hidden_files: Arc<MatchPatternFilter>,
}

impl StandardFilter {
    /// `extensions` are given without the dot and match in lower and upper
    /// case. `label` overrides the generated "Show only ..." description.
    pub fn new<S: AsRef<str>>(
        extensions: &[S],
        label: Option<&str>,
        include_sequence_filter: bool,
    ) -> Result<Self, PathError> {
        let extensions = if extensions.is_empty() {
            None
        } else {
            let mut patterns = Vec::with_capacity(extensions.len() * 2);
            let mut described = Vec::with_capacity(extensions.len());
            for extension in extensions {
                let extension = extension.as_ref().trim_start_matches('.');
                patterns.push(format!("*.{}", extension.to_lowercase()));
                patterns.push(format!("*.{}", extension.to_uppercase()));
                described.push(format!(".{}", extension.to_lowercase()));
            }
            let label = label
                .map(str::to_owned)
                .unwrap_or_else(|| format!("Show only {} files", described.join(", ")));
            Some(Arc::new(MatchPatternFilter::new(patterns)?.with_label(label)))
        };

        let sequences = include_sequence_filter
            .then(|| Arc::new(FileSequenceFilter::new(SequenceMode::Concise)));

        let hidden_files = Arc::new(
            MatchPatternFilter::new([".*"])?
                .leaf_only(false)
                .inverted(true)
                .with_label("Show hidden files"),
        );

        Ok(Self { extensions, sequences, hidden_files })
    }

    pub fn extensions(&self) -> Option<&Arc<MatchPatternFilter>> {
        self.extensions.as_ref()
    }

    pub fn sequences(&self) -> Option<&Arc<FileSequenceFilter>> {
        self.sequences.as_ref()
    }

    /// Enabled by default, which hides dot files; disable it to show them.
    pub fn hidden_files(&self) -> &Arc<MatchPatternFilter> {
        &self.hidden_files
    }
}

impl PathFilter for StandardFilter {
    fn filter(&self, mut paths: Vec<FileSystemPath>) -> Vec<FileSystemPath> {
        let before = paths.len();
        if let Some(extensions) = self.extensions.as_ref().filter(|filter| filter.is_enabled()) {
            paths = extensions.filter(paths);
        }
        if let Some(sequences) = self.sequences.as_ref().filter(|filter| filter.is_enabled()) {
            paths = sequences.filter(paths);
        }
        if self.hidden_files.is_enabled() {
            paths = self.hidden_files.filter(paths);
        }
        trace!(before, after = paths.len(), "applied standard filter");
        paths
    }
}
