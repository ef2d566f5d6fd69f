//! Persistent browser defaults.
//!
//! Stored as pretty JSON in the per-user config directory and replaced
//! atomically on save, so a crash mid-write never leaves a truncated file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::Result;
use crate::fs::{FileSystemPath, PathFilter, StandardFilter};

const APP_QUALIFIER: &str = "com";
const APP_ORGANISATION: &str = "Seqfs";
const APP_NAME: &str = "seqfs";
const CONFIG_FILE: &str = "browser.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Collapse numbered files into sequence placeholders when listing.
    pub include_sequences: bool,
    /// Extensions (without the dot) shown when the extension filter is on.
    pub extensions: Vec<String>,
    pub extensions_label: Option<String>,
    pub show_hidden: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            include_sequences: true,
            extensions: Vec::new(),
            extensions_label: None,
            show_hidden: false,
        }
    }
}

impl BrowserConfig {
    /// `browser.json` in the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or_else(|| anyhow!("unable to resolve configuration directory"))
    }

    /// Read the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing browser config at {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no browser config, using defaults");
                Ok(Self::default())
            }
            Err(err) => {
                Err(err).with_context(|| format!("reading browser config at {}", path.display()))
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("config path {} does not have a parent directory", path.display()))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory at {}", parent.display()))?;

        let data = serde_json::to_vec_pretty(self).context("serialising browser config")?;
        let mut temp = NamedTempFile::new_in(parent).context("creating temporary config file")?;
        temp.write_all(&data)?;
        temp.flush()?;

        match temp.persist(path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                if let Err(remove_err) = fs::remove_file(path) {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        return Err(remove_err.into());
                    }
                }
                err.file.persist(path).map(|_| ()).map_err(|persist_err| persist_err.error.into())
            }
            Err(err) => Err(err.error).with_context(|| format!("writing browser config to {}", path.display())),
        }
    }

    /// Standard filter for these settings. Hidden files stay visible when
    /// `show_hidden` is set by disabling the hidden-file filter.
    pub fn to_filter(&self) -> Result<StandardFilter> {
        let filter = StandardFilter::new(
            self.extensions.as_slice(),
            self.extensions_label.as_deref(),
            self.include_sequences,
        )?;
        filter.hidden_files().set_enabled(!self.show_hidden);
        Ok(filter)
    }

    /// `path` configured with these settings, ready for listing.
    pub fn root_path(&self, path: &str) -> Result<FileSystemPath> {
        let filter: Arc<dyn PathFilter> = Arc::new(self.to_filter()?);
        Ok(FileSystemPath::new(path)
            .with_include_sequences(self.include_sequences)
            .with_filter(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BrowserConfig::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, BrowserConfig::default());
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = BrowserConfig {
            include_sequences: false,
            extensions: vec!["exr".into(), "tif".into()],
            extensions_label: Some("Images".into()),
            show_hidden: true,
        };

        config.save(&path).expect("save");
        config.save(&path).expect("overwrite");
        assert_eq!(BrowserConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, br#"{ "extensions": ["exr"] }"#).expect("write");

        let config = BrowserConfig::load(&path).expect("load");
        assert!(config.include_sequences);
        assert_eq!(config.extensions, vec!["exr".to_string()]);
    }

    #[test]
    fn show_hidden_disables_the_hidden_filter() {
        let config = BrowserConfig { show_hidden: true, ..BrowserConfig::default() };
        let filter = config.to_filter().expect("filter");
        assert!(!filter.hidden_files().is_enabled());
        assert!(filter.sequences().is_some());
    }
}
