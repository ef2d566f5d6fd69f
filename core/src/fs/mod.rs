//! Sequence-aware filesystem paths: navigation, listing, filtering and
//! per-path properties.

pub mod filter;
pub mod path;
pub mod platform;
pub mod property;
pub mod sequence;
mod util;
pub mod value;

pub use filter::{
    CompoundFilter, FileSequenceFilter, MatchPatternFilter, PathFilter, SequenceMode, StandardFilter,
};
pub use path::FileSystemPath;
pub use platform::{Capabilities, ParsedPath, Platform, PosixPlatform, WindowsPlatform};
pub use property::{PropertyName, PropertyValue};
pub use sequence::{FRAME_PLACEHOLDER, FileSequence, FrameList, find_sequences};
pub use util::{Token, natural_cmp, tokenize};
pub use value::PathValue;
