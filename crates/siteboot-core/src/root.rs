//! Installation root detection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

///
/// RootProbe
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RootProbe {
    /// Valid root; carries the signature token (core marker path).
    Found(String),
    /// No candidate was given.
    NotFound,
    /// A candidate was given but it is not an installation root.
    Invalid,
}

///
/// RootLocator
///

pub trait RootLocator {
    fn probe(&self, candidate: &str) -> RootProbe;
}

///
/// RootMarkers
///
/// Relative paths whose presence identifies an installation root.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RootMarkers {
    pub entry_point: String,
    /// Shared with sibling applications; doubles as the signature token.
    pub core: String,
    /// Specific to this application variant.
    pub variant: String,
}

impl Default for RootMarkers {
    fn default() -> Self {
        Self {
            entry_point: "index.php".to_string(),
            core: "core/includes/common.inc".to_string(),
            variant: "core/misc/backdrop.js".to_string(),
        }
    }
}

///
/// FsRootLocator
///

#[derive(Clone, Debug, Default)]
pub struct FsRootLocator {
    markers: RootMarkers,
}

impl FsRootLocator {
    #[must_use]
    pub const fn new(markers: RootMarkers) -> Self {
        Self { markers }
    }

    #[must_use]
    pub const fn markers(&self) -> &RootMarkers {
        &self.markers
    }

    fn is_root(&self, path: &Path) -> bool {
        path.is_dir()
            && path.join(&self.markers.entry_point).is_file()
            && path.join(&self.markers.core).is_file()
            && path.join(&self.markers.variant).is_file()
    }

    /// Walk from `start` up through its ancestors and return the first
    /// directory that is a valid root.
    #[must_use]
    pub fn locate_upward(&self, start: &Path) -> Option<PathBuf> {
        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

        start.ancestors().find(|p| self.is_root(p)).map(Path::to_path_buf)
    }
}

impl RootLocator for FsRootLocator {
    fn probe(&self, candidate: &str) -> RootProbe {
        if candidate.is_empty() {
            return RootProbe::NotFound;
        }

        if self.is_root(Path::new(candidate)) {
            RootProbe::Found(self.markers.core.clone())
        } else {
            RootProbe::Invalid
        }
    }
}
