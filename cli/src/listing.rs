//! Entry rows printed by `seqls`.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use seqfs_core::fs::{FileSystemPath, PropertyName, natural_cmp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Directory,
    File,
    Sequence,
}

impl EntryKind {
    fn marker(self) -> char {
        match self {
            EntryKind::Directory => 'd',
            EntryKind::File => '-',
            EntryKind::Sequence => 's',
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<String>,
}

fn text(path: &FileSystemPath, name: PropertyName) -> Result<String> {
    Ok(path.property_of(name)?.to_string())
}

impl Entry {
    pub fn from_path(path: &FileSystemPath, long: bool) -> Result<Self> {
        let kind = if path.is_directory() {
            EntryKind::Directory
        } else if path.is_file_sequence() {
            EntryKind::Sequence
        } else {
            EntryKind::File
        };

        let details = if long {
            let frame_range = match kind {
                EntryKind::Sequence => Some(text(path, PropertyName::FrameRange)?),
                _ => None,
            };
            Some(Details {
                owner: text(path, PropertyName::Owner)?,
                group: text(path, PropertyName::Group)?,
                size: path.property_of(PropertyName::Size)?.as_u64().unwrap_or_default(),
                modified: text(path, PropertyName::ModificationTime)?,
                frame_range,
            })
        } else {
            None
        };

        Ok(Self { name: path.name().to_owned(), kind, details })
    }
}

/// Entries in natural name order (`shot2` before `shot10`).
pub fn collect(paths: &[FileSystemPath], long: bool) -> Result<Vec<Entry>> {
    let mut entries = paths.iter().map(|path| Entry::from_path(path, long)).collect::<Result<Vec<_>>>()?;
    entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    Ok(entries)
}

pub fn render(out: &mut impl Write, entries: &[Entry], long: bool) -> Result<()> {
    for entry in entries {
        match (&entry.details, long) {
            (Some(details), true) => writeln!(
                out,
                "{} {:<10} {:<10} {:>12} {} {} {}",
                entry.kind.marker(),
                details.owner,
                details.group,
                details.size,
                details.modified,
                entry.name,
                details.frame_range.as_deref().unwrap_or_default(),
            )?,
            _ => writeln!(out, "{}", entry.name)?,
        }
    }
    Ok(())
}
