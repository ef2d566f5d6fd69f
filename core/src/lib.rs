//! Core library for browsing image-sequence directories.

#![deny(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod fs;
pub mod log;
pub mod subst;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub use config::BrowserConfig;
pub use error::PathError;
pub use fs::{FileSequence, FileSystemPath, FrameList, PathFilter, PathValue, PropertyName, PropertyValue};
pub use subst::{SubstitutionContext, Substitutions};

/// Returns the version of the core crate for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_semver_version() {
        assert!(version().contains('.'));
    }
}
