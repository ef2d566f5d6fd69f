//! Sequence-aware filesystem path.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::PathError;

use super::filter::PathFilter;
use super::platform::{self, Capabilities, Platform};
use super::property::{PropertyName, PropertyValue};
use super::sequence::{self, FRAME_PLACEHOLDER, FileSequence};

/// A path into the filesystem held as a root plus a list of names.
///
/// Paths are cheap values: navigation mutates the name list only and never
/// touches the disk. Every query (`is_valid`, `children`, `property`) stats
/// or lists the filesystem afresh, so changes made between calls are always
/// observed.
///
/// When sequences are enabled, `children()` also returns one placeholder path
/// per run of numbered sibling files (`a.###.txt`); the placeholder answers
/// property queries by aggregating over its member files.
#[derive(Debug, Clone)]
pub struct FileSystemPath {
    root: String,
    names: Vec<String>,
    filter: Option<Arc<dyn PathFilter>>,
    include_sequences: bool,
    platform: &'static dyn Platform,
}

impl FileSystemPath {
    /// Parse `path`, given in generic (forward slash) or host-native form.
    pub fn new(path: &str) -> Self {
        let mut result = Self::empty();
        result.set_from_string(path);
        result
    }

    pub fn empty() -> Self {
        Self {
            root: String::new(),
            names: Vec::new(),
            filter: None,
            include_sequences: false,
            platform: platform::host(),
        }
    }

    pub fn from_names(root: impl Into<String>, names: Vec<String>) -> Self {
        Self { root: root.into(), names, ..Self::empty() }
    }

    pub fn with_filter(mut self, filter: Arc<dyn PathFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_include_sequences(mut self, include_sequences: bool) -> Self {
        self.include_sequences = include_sequences;
        self
    }

    /// Re-read this path under different platform conventions.
    pub fn with_platform(mut self, platform: &'static dyn Platform) -> Self {
        let generic = self.string();
        self.platform = platform;
        self.set_from_string(&generic);
        self
    }

    pub fn set_from_string(&mut self, path: &str) {
        let parsed = self.platform.parse(path);
        self.root = parsed.root;
        self.names = parsed.names;
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names below the root.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` when there is neither a root nor any name. The filesystem root
    /// `/` on its own is not empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.names.is_empty()
    }

    /// Last name, or an empty string for a bare root.
    pub fn name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    pub fn append(&mut self, name: impl Into<String>) -> &mut Self {
        self.names.push(name.into());
        self
    }

    pub fn truncate(&mut self, len: usize) -> &mut Self {
        self.names.truncate(len);
        self
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.names.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.names.pop();
        Some(parent)
    }

    /// Copy of this path with `name` appended, sharing filter and settings.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.names.push(name.into());
        child
    }

    /// Independent copy: same names, settings and shared filter.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn filter(&self) -> Option<&Arc<dyn PathFilter>> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, filter: Option<Arc<dyn PathFilter>>) {
        self.filter = filter;
    }

    pub fn include_sequences(&self) -> bool {
        self.include_sequences
    }

    pub fn set_include_sequences(&mut self, include_sequences: bool) {
        self.include_sequences = include_sequences;
    }

    pub fn platform(&self) -> &'static dyn Platform {
        self.platform
    }

    /// Platform capabilities plus [`Capabilities::SEQUENCES`] when enabled.
    pub fn capabilities(&self) -> Capabilities {
        let capabilities = self.platform.capabilities();
        if self.include_sequences { capabilities | Capabilities::SEQUENCES } else { capabilities }
    }

    /// Generic form using forward slashes on every platform.
    pub fn string(&self) -> String {
        platform::generic_string(&self.root, &self.names)
    }

    /// Host form using the platform separator and drive/UNC conventions.
    pub fn native_string(&self) -> String {
        self.platform.native_string(&self.root, &self.names)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(self.native_string())
    }

    /// `true` if the path names an existing entry. Symbolic links count even
    /// when their target is missing, so a listing never returns a child that
    /// then reports itself invalid.
    pub fn is_valid(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.is_file_sequence() {
            return true;
        }

        let path = self.to_path_buf();
        if self.capabilities().contains(Capabilities::SYMLINKS) {
            fs::symlink_metadata(&path).is_ok()
        } else {
            fs::metadata(&path).is_ok()
        }
    }

    /// `true` unless the path is a directory: files, sequence placeholders and
    /// nonexistent paths can have no children.
    pub fn is_leaf(&self) -> bool {
        !self.is_directory()
    }

    pub fn is_directory(&self) -> bool {
        !self.is_empty() && fs::metadata(self.to_path_buf()).is_ok_and(|meta| meta.is_dir())
    }

    /// List the directory this path names. Non-directories have no children.
    ///
    /// With sequences enabled, one extra placeholder child is added per
    /// sequence found among the files; the member files stay listed. The
    /// filter, if any, is applied last and the result is sorted by
    /// [`string`](Self::string).
    pub fn children(&self) -> Vec<Self> {
        if !self.is_directory() {
            return Vec::new();
        }

        let dir = self.to_path_buf();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self, "failed to list directory: {err}");
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        let mut file_names = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %self, "skipping unreadable directory entry: {err}");
                    continue;
                }
            };

            let Some(name) = utf8_name(&entry) else {
                warn!(path = %self, name = ?entry.file_name(), "skipping entry with a non UTF-8 name");
                continue;
            };
            if self.include_sequences && !entry.path().is_dir() {
                file_names.push(name.clone());
            }
            children.push(self.child(name));
        }

        if self.include_sequences {
            let sequences = sequence::find_sequences(file_names.iter().map(String::as_str));
            debug!(path = %self, sequences = sequences.len(), "collapsed file sequences");
            // A literal file may already carry the placeholder name.
            let placeholders: Vec<Self> = sequences
                .iter()
                .map(FileSequence::file_name)
                .filter(|name| !file_names.contains(name))
                .map(|name| self.child(name))
                .collect();
            children.extend(placeholders);
        }

        let mut children = match &self.filter {
            Some(filter) if filter.is_enabled() => filter.filter(children),
            _ => children,
        };
        children.sort_by_cached_key(Self::string);

        debug!(path = %self, count = children.len(), "listed children");
        children
    }

    /// `true` for a placeholder path with at least one member file on disk.
    pub fn is_file_sequence(&self) -> bool {
        self.file_sequence().is_some()
    }

    /// The sequence a placeholder path stands for, re-read from its directory.
    pub fn file_sequence(&self) -> Option<FileSequence> {
        if !self.include_sequences || !self.name().contains(FRAME_PLACEHOLDER) {
            return None;
        }
        // Directories and literal files that happen to contain `#` win.
        if self.is_directory() || fs::symlink_metadata(self.to_path_buf()).is_ok() {
            return None;
        }

        let dir = self.parent().map(|parent| parent.os_dir()).unwrap_or_else(|| PathBuf::from("."));
        let entries = fs::read_dir(&dir).ok()?;
        let file_names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| !entry.path().is_dir())
            .filter_map(|entry| utf8_name(&entry))
            .collect();

        sequence::find_sequences(file_names.iter().map(String::as_str))
            .into_iter()
            .find(|sequence| sequence.file_name() == self.name())
    }

    /// Keys answered by [`property`](Self::property) for this configuration.
    pub fn property_names(&self) -> Vec<PropertyName> {
        let mut names = vec![
            PropertyName::Name,
            PropertyName::FullName,
            PropertyName::Owner,
            PropertyName::Group,
            PropertyName::ModificationTime,
            PropertyName::Size,
        ];
        if self.capabilities().contains(Capabilities::SEQUENCES) {
            names.push(PropertyName::FrameRange);
        }
        names
    }

    /// Look up a property by its string key, e.g. `fileSystem:size`.
    pub fn property(&self, name: &str) -> Result<PropertyValue, PathError> {
        let key = name.parse::<PropertyName>().map_err(|_| self.unknown_property(name))?;
        self.property_of(key)
    }

    pub fn property_of(&self, name: PropertyName) -> Result<PropertyValue, PathError> {
        if !self.property_names().contains(&name) {
            return Err(self.unknown_property(name.as_str()));
        }

        let value = match name {
            PropertyName::Name => PropertyValue::String(self.name().to_owned()),
            PropertyName::FullName => PropertyValue::String(self.string()),
            PropertyName::Owner => {
                PropertyValue::String(self.most_common(|platform, path, meta| platform.owner(path, meta)))
            }
            PropertyName::Group if self.capabilities().contains(Capabilities::GROUP_OWNERSHIP) => {
                PropertyValue::String(self.most_common(|platform, _, meta| platform.group(meta)))
            }
            PropertyName::Group => PropertyValue::String(String::new()),
            PropertyName::ModificationTime => PropertyValue::DateTime(self.newest_modification()),
            PropertyName::Size => PropertyValue::UInt(self.total_size()),
            PropertyName::FrameRange => PropertyValue::String(
                self.file_sequence().map(|sequence| sequence.frame_list().to_string()).unwrap_or_default(),
            ),
        };
        Ok(value)
    }

    fn unknown_property(&self, name: &str) -> PathError {
        PathError::UnknownProperty { name: name.to_owned(), path: self.string() }
    }

    /// Native path used as a directory for OS calls; the empty path maps to `.`.
    fn os_dir(&self) -> PathBuf {
        if self.is_empty() { PathBuf::from(".") } else { self.to_path_buf() }
    }

    /// Files backing this path's properties: the members of a sequence
    /// placeholder, or the path itself.
    fn backing_files(&self) -> Vec<PathBuf> {
        match self.file_sequence() {
            Some(sequence) => {
                let dir = self.parent().map(|parent| parent.os_dir()).unwrap_or_else(|| PathBuf::from("."));
                sequence.file_names().into_iter().map(|name| dir.join(name)).collect()
            }
            None => vec![self.to_path_buf()],
        }
    }

    /// Metadata of the link target, or of the link itself when the target is missing.
    fn stat(&self, path: &Path) -> Option<Metadata> {
        fs::metadata(path).ok().or_else(|| {
            self.capabilities()
                .contains(Capabilities::SYMLINKS)
                .then(|| fs::symlink_metadata(path).ok())
                .flatten()
        })
    }

    fn total_size(&self) -> u64 {
        self.backing_files()
            .iter()
            .filter_map(|path| self.stat(path))
            .filter(|meta| !meta.is_dir())
            .map(|meta| meta.len())
            .sum()
    }

    fn newest_modification(&self) -> DateTime<Utc> {
        let newest = self
            .backing_files()
            .iter()
            .filter_map(|path| self.stat(path))
            .filter_map(|meta| meta.modified().ok())
            .max()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        DateTime::<Utc>::from(newest)
    }

    /// Most frequent value over the backing files; ties resolve to the
    /// lexically smallest value.
    fn most_common<F>(&self, lookup: F) -> String
    where
        F: Fn(&dyn Platform, &Path, &Metadata) -> String,
    {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for path in self.backing_files() {
            let value = self.stat(&path).map(|meta| lookup(self.platform, &path, &meta)).unwrap_or_default();
            *counts.entry(value).or_default() += 1;
        }

        let mut best: Option<(String, usize)> = None;
        for (value, count) in counts {
            if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value).unwrap_or_default()
    }
}

/// Entry name as UTF-8. Other names cannot round-trip through the string
/// form of a path, so listings leave them out.
fn utf8_name(entry: &fs::DirEntry) -> Option<String> {
    entry.file_name().into_string().ok()
}

impl Default for FileSystemPath {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for FileSystemPath {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.names == other.names
    }
}

impl Eq for FileSystemPath {}

impl fmt::Display for FileSystemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_empty_and_invalid() {
        let path = FileSystemPath::empty();
        assert_eq!(path.string(), "");
        assert_eq!(path.native_string(), "");
        assert!(path.is_empty());
        assert!(!path.is_valid());
        assert!(path.children().is_empty());
    }

    #[test]
    fn nonexistent_path_is_not_empty_but_invalid() {
        let path = FileSystemPath::new("/this/path/doesnt/exist");
        assert!(!path.is_empty());
        assert!(!path.is_valid());
        assert!(path.is_leaf());
        assert_eq!(path.len(), 4);
        assert_eq!(path.name(), "exist");
    }

    #[test]
    fn copies_are_independent() {
        let original = FileSystemPath::new("/a/b").with_include_sequences(true);
        let mut copy = original.copy();
        assert_eq!(copy, original);
        assert_eq!(copy.native_string(), original.native_string());
        assert!(copy.include_sequences());

        copy.append("c");
        assert_eq!(original.string(), "/a/b");
        assert_eq!(copy.string(), "/a/b/c");
        copy.truncate(0);
        assert_eq!(copy.string(), "/");
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn navigation_keeps_the_root() {
        let path = FileSystemPath::new("/shots/010/plate.exr");
        let parent = path.parent().expect("parent");
        assert_eq!(parent.string(), "/shots/010");
        assert_eq!(parent.child("comp.exr").string(), "/shots/010/comp.exr");
        assert!(FileSystemPath::new("/").parent().is_none());
    }

    #[test]
    fn windows_conventions_apply_per_path() {
        let path = FileSystemPath::new("C:/path/test.exr").with_platform(platform::windows());
        assert_eq!(path.root(), "C:");
        assert_eq!(path.string(), "C:/path/test.exr");
        assert_eq!(path.native_string(), "C:\\path\\test.exr");

        let unc = FileSystemPath::new("/test.server/path/test.exr").with_platform(platform::windows());
        assert_eq!(unc.native_string(), "\\\\test.server\\path\\test.exr");
    }

    #[test]
    fn frame_range_requires_sequences() {
        let plain = FileSystemPath::new("/tmp");
        assert!(!plain.property_names().contains(&PropertyName::FrameRange));
        let err = plain.property("fileSystem:frameRange").expect_err("frame range is not supported");
        assert!(matches!(err, PathError::UnknownProperty { .. }));

        let sequences = FileSystemPath::new("/tmp").with_include_sequences(true);
        assert!(sequences.property_names().contains(&PropertyName::FrameRange));
        assert_eq!(
            sequences.property("fileSystem:frameRange").unwrap(),
            PropertyValue::String(String::new())
        );
    }

    #[test]
    fn unknown_keys_are_errors() {
        let path = FileSystemPath::new("/tmp");
        let err = path.property("fileSystem:colour").expect_err("unknown key");
        assert_eq!(err.to_string(), "unknown property \"fileSystem:colour\" on path \"/tmp\"");
    }

    /// POSIX parsing on a filesystem without group ownership.
    #[derive(Debug)]
    struct Ungrouped;

    impl Platform for Ungrouped {
        fn name(&self) -> &'static str {
            "ungrouped"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::SYMLINKS
        }

        fn parse(&self, input: &str) -> platform::ParsedPath {
            platform::posix().parse(input)
        }

        fn native_string(&self, root: &str, names: &[String]) -> String {
            platform::posix().native_string(root, names)
        }

        fn owner(&self, _path: &Path, _metadata: &Metadata) -> String {
            "someone".to_owned()
        }

        fn group(&self, _metadata: &Metadata) -> String {
            "staff".to_owned()
        }
    }

    static UNGROUPED: Ungrouped = Ungrouped;

    #[test]
    fn group_is_empty_without_group_ownership() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("plate.exr");
        fs::write(&file, b"x").expect("write");

        let path = FileSystemPath::new(&file.to_string_lossy()).with_platform(&UNGROUPED);
        assert_eq!(path.property_of(PropertyName::Owner).unwrap().as_str(), Some("someone"));
        assert_eq!(path.property_of(PropertyName::Group).unwrap().as_str(), Some(""));
    }

    #[test]
    fn name_properties_need_no_disk_access() {
        let path = FileSystemPath::new("/does/not/exist.exr");
        assert_eq!(path.property("name").unwrap().as_str(), Some("exist.exr"));
        assert_eq!(path.property("fullName").unwrap().as_str(), Some("/does/not/exist.exr"));
        assert_eq!(path.property("fileSystem:size").unwrap().as_u64(), Some(0));
    }
}
