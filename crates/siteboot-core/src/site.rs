//! Multi-site configuration directory resolution.

use crate::server::ServerContext;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub const SETTINGS_FILE: &str = "settings.php";
pub const SITES_DIR: &str = "sites";
pub const DEFAULT_SITE_DIR: &str = "default";

///
/// SiteResolver
///
/// Maps the current request host to a configuration directory relative to the
/// installation root. Implementations read `server.http_host`.
///

pub trait SiteResolver {
    fn resolve(&self, server: &ServerContext, root: &Path) -> PathBuf;
}

///
/// DirectoryScanResolver
///
/// Walks candidate directory names from the most specific
/// `port.host.path` form to the bare top-level domain and returns the first
/// `sites/<candidate>` holding a settings file. An alias table is consulted
/// for every candidate first. Falls back to `sites/default`.
///

#[derive(Clone, Debug, Default)]
pub struct DirectoryScanResolver {
    aliases: BTreeMap<String, String>,
}

impl DirectoryScanResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_aliases(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Candidate directory names, most specific first.
    #[must_use]
    pub fn candidates(server: &ServerContext) -> Vec<String> {
        // "www.example.com:8080" -> ["8080", "www", "example", "com"]
        let host = server.host().trim_end_matches('.');
        let mut host_parts: Vec<&str> = host.split(':').collect();
        host_parts.reverse();
        let labels: Vec<&str> = host_parts
            .iter()
            .flat_map(|part| part.split('.'))
            .filter(|label| !label.is_empty())
            .collect();

        // "sub/dir" -> ["sub", "dir"]
        let path_parts: Vec<&str> = server
            .base_path()
            .split('/')
            .filter(|part| !part.is_empty())
            .collect();

        let mut out = Vec::new();
        for i in (0..=path_parts.len()).rev() {
            let path_suffix = if i == 0 {
                String::new()
            } else {
                format!(".{}", path_parts[..i].join("."))
            };
            for j in (1..=labels.len()).rev() {
                let host_prefix = labels[labels.len() - j..].join(".");
                out.push(format!("{host_prefix}{path_suffix}"));
            }
        }

        out
    }
}

impl SiteResolver for DirectoryScanResolver {
    fn resolve(&self, server: &ServerContext, root: &Path) -> PathBuf {
        let sites = root.join(SITES_DIR);

        for candidate in Self::candidates(server) {
            let dir = match self.aliases.get(&candidate) {
                Some(alias) if sites.join(alias).exists() => alias.clone(),
                _ => candidate,
            };

            if sites.join(&dir).join(SETTINGS_FILE).is_file() {
                return Path::new(SITES_DIR).join(dir);
            }
        }

        Path::new(SITES_DIR).join(DEFAULT_SITE_DIR)
    }
}

///
/// TESTS
///
