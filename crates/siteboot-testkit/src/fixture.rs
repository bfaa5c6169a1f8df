//! Throwaway installation trees.

use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

const PHP_STUB: &str = "<?php\n";

///
/// InstallFixture
///
/// Temporary directory laid out like an installation. The tree is removed
/// when the fixture drops.
///

pub struct InstallFixture {
    dir: TempDir,
}

impl InstallFixture {
    /// Empty directory with no markers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Complete Backdrop root markers, no settings.
    #[must_use]
    pub fn backdrop() -> Self {
        Self::empty()
            .with_file("index.php")
            .with_file("core/includes/common.inc")
            .with_file("core/misc/backdrop.js")
    }

    /// Shares the entry point and core marker but lacks the variant marker.
    #[must_use]
    pub fn sibling_application() -> Self {
        Self::empty()
            .with_file("index.php")
            .with_file("core/includes/common.inc")
            .with_file("core/misc/drupal.js")
    }

    #[must_use]
    pub fn with_file(self, relative: &str) -> Self {
        self.with_contents(relative, PHP_STUB)
    }

    #[must_use]
    pub fn with_contents(self, relative: &str, contents: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    #[must_use]
    pub fn with_root_settings(self) -> Self {
        self.with_file("settings.php")
    }

    /// `sites/<dir>/settings.php`.
    #[must_use]
    pub fn with_site(self, dir: &str) -> Self {
        self.with_file(&format!("sites/{dir}/settings.php"))
    }

    #[must_use]
    pub fn without(self, relative: &str) -> Self {
        let _ = fs::remove_file(self.dir.path().join(relative));
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Canonical path, as the sequencer records it.
    #[must_use]
    pub fn canonical(&self) -> PathBuf {
        self.dir
            .path()
            .canonicalize()
            .unwrap_or_else(|_| self.dir.path().to_path_buf())
    }

    #[must_use]
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}
