//! Boundary to the engine-specific container decoder.
//!
//! Binary parsing (header decoding, type trees, object extraction) lives
//! behind `ContainerOpener`; this crate only drives it and projects the
//! result. The embedding binary hands its decoder to `run()`.

use std::path::{Path, PathBuf};

use super::error::LoadError;
use super::types::{BundleEntry, ContainerHandle};

/// Where a node loads from: exactly one of a filesystem path or a buffered
/// bundle entry, fixed at construction.
#[derive(Debug, Clone)]
pub enum AssetSource {
    Path(PathBuf),
    Entry(BundleEntry),
}

impl AssetSource {
    /// Short human-readable name: file name for paths, entry name for
    /// bundle entries.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Entry(entry) => entry.info.name.clone(),
        }
    }
}

/// Opens an asset container and hands back its parsed contents.
///
/// Implementations may block on I/O; they are called on the thread driving
/// UI expansion, only in response to an explicit user expansion.
pub trait ContainerOpener: Send + Sync {
    fn open_path(&self, path: &Path) -> Result<ContainerHandle, LoadError>;

    fn open_entry(&self, entry: &BundleEntry) -> Result<ContainerHandle, LoadError>;
}
