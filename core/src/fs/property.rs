//! Property keys and values answered by [`FileSystemPath::property`].
//!
//! [`FileSystemPath::property`]: super::FileSystemPath::property

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Every property key a path can answer. Which of them a particular path
/// supports depends on its configuration; see
/// [`FileSystemPath::property_names`](super::FileSystemPath::property_names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyName {
    /// Last path component.
    Name,
    /// Generic string form of the whole path.
    FullName,
    Owner,
    Group,
    ModificationTime,
    Size,
    FrameRange,
}

impl PropertyName {
    pub const ALL: [PropertyName; 7] = [
        PropertyName::Name,
        PropertyName::FullName,
        PropertyName::Owner,
        PropertyName::Group,
        PropertyName::ModificationTime,
        PropertyName::Size,
        PropertyName::FrameRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyName::Name => "name",
            PropertyName::FullName => "fullName",
            PropertyName::Owner => "fileSystem:owner",
            PropertyName::Group => "fileSystem:group",
            PropertyName::ModificationTime => "fileSystem:modificationTime",
            PropertyName::Size => "fileSystem:size",
            PropertyName::FrameRange => "fileSystem:frameRange",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyName::ALL.into_iter().find(|name| name.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    String(String),
    UInt(u64),
    DateTime(DateTime<Utc>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::UInt(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(value) => f.write_str(value),
            PropertyValue::UInt(value) => write!(f, "{value}"),
            PropertyValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}
