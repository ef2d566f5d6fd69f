use std::fs;
use std::sync::Arc;

use seqfs_core::fs::{
    CompoundFilter, FileSequenceFilter, FileSystemPath, MatchPatternFilter, PathFilter, SequenceMode,
    StandardFilter,
};

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [".hidden.exr", "a.001.exr", "a.002.exr", "notes.txt"] {
        fs::write(dir.path().join(name), b"data").expect("write fixture file");
    }
    fs::create_dir(dir.path().join("dir")).expect("create dir");
    dir
}

fn listed(path: &FileSystemPath) -> Vec<String> {
    path.children().iter().map(|child| child.name().to_owned()).collect()
}

#[test]
fn standard_filter_shows_sequences_concisely() {
    let dir = fixture();
    let filter = Arc::new(StandardFilter::new(&["exr"], None, true).expect("standard filter"));
    let root = FileSystemPath::new(&dir.path().to_string_lossy())
        .with_include_sequences(true)
        .with_filter(filter.clone());

    assert_eq!(listed(&root), vec!["a.###.exr", "dir"]);

    filter.hidden_files().set_enabled(false);
    assert_eq!(listed(&root), vec![".hidden.exr", "a.###.exr", "dir"]);

    filter.hidden_files().set_enabled(true);
    filter.sequences().expect("sequence filter").set_enabled(false);
    assert_eq!(listed(&root), vec!["a.###.exr", "a.001.exr", "a.002.exr", "dir"]);
}

#[test]
fn toggling_a_shared_filter_affects_every_copy() {
    let dir = fixture();
    let filter = Arc::new(StandardFilter::new(&["exr"], None, false).expect("standard filter"));
    let root = FileSystemPath::new(&dir.path().to_string_lossy()).with_filter(filter.clone());
    let copy = root.copy();

    assert_eq!(listed(&copy), vec!["a.001.exr", "a.002.exr", "dir"]);
    filter.extensions().expect("extension filter").set_enabled(false);
    assert_eq!(listed(&root), vec!["a.001.exr", "a.002.exr", "dir", "notes.txt"]);
    assert_eq!(listed(&copy), listed(&root));
}

#[test]
fn sequence_modes_select_members_or_placeholders() {
    let dir = fixture();
    let root = FileSystemPath::new(&dir.path().to_string_lossy()).with_include_sequences(true);
    let children = root.children();

    let keep = |mode| -> Vec<String> {
        FileSequenceFilter::new(mode)
            .filter(children.clone())
            .iter()
            .map(|child| child.name().to_owned())
            .collect()
    };

    assert_eq!(keep(SequenceMode::Files), vec![".hidden.exr", "dir", "notes.txt"]);
    assert_eq!(keep(SequenceMode::SequentialFiles), vec!["a.001.exr", "a.002.exr", "dir"]);
    assert_eq!(keep(SequenceMode::Sequences), vec!["a.###.exr", "dir"]);
    assert_eq!(keep(SequenceMode::Concise), vec![".hidden.exr", "a.###.exr", "dir", "notes.txt"]);
    assert_eq!(keep(SequenceMode::Verbose).len(), children.len());
}

#[test]
fn compound_filters_apply_in_order_and_skip_disabled() {
    let dir = fixture();
    let text_only = Arc::new(MatchPatternFilter::new(["*.txt"]).expect("pattern"));
    let no_dirs = Arc::new(MatchPatternFilter::new(["dir"]).expect("pattern").leaf_only(false).inverted(true));

    let mut compound = CompoundFilter::new();
    compound.add_filter(text_only.clone());
    compound.add_filter(no_dirs);
    assert_eq!(compound.filters().len(), 2);

    let root = FileSystemPath::new(&dir.path().to_string_lossy()).with_filter(Arc::new(compound));
    assert_eq!(listed(&root), vec!["notes.txt"]);

    text_only.set_enabled(false);
    assert_eq!(listed(&root), vec![".hidden.exr", "a.001.exr", "a.002.exr", "notes.txt"]);
}

#[test]
fn extension_matching_accepts_upper_case() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["LOUD.EXR", "quiet.exr", "Mixed.Exr"] {
        fs::write(dir.path().join(name), b"x").expect("write");
    }
    let filter = Arc::new(StandardFilter::new(&["exr"], None, false).expect("standard filter"));
    let root = FileSystemPath::new(&dir.path().to_string_lossy()).with_filter(filter);
    assert_eq!(listed(&root), vec!["LOUD.EXR", "quiet.exr"]);
}
