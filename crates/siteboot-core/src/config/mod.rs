pub mod schema;

use schema::{ConfigSchemaError, Validate};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

pub use schema::ConfigModel;

pub const CONFIG_FILE: &str = "siteboot.toml";

/// Root-relative directories searched for a site-local config file, in
/// precedence order.
pub const ROOT_CONFIG_DIRS: [&str; 2] = ["drush", "sites/all/drush"];

/// Errors related to configuration loading and parsing.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML could not be parsed into the expected structure.
    #[error("toml error in {origin}: {message}")]
    CannotParseToml { origin: String, message: String },

    /// Wrapper for data schema-level errors.
    #[error(transparent)]
    ConfigSchema(#[from] ConfigSchemaError),
}

///
/// Config
///

pub struct Config {}

impl Config {
    /// Parse and validate a single TOML document.
    pub fn from_toml(origin: &str, config_str: &str) -> Result<ConfigModel, ConfigError> {
        let config: ConfigModel =
            toml::from_str(config_str).map_err(|e| ConfigError::CannotParseToml {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<ConfigModel, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&path.display().to_string(), &text)
    }

    /// Config files that exist under an installation root, highest
    /// precedence first.
    #[must_use]
    pub fn root_files(root: &Path) -> Vec<PathBuf> {
        ROOT_CONFIG_DIRS
            .iter()
            .map(|dir| root.join(dir).join(CONFIG_FILE))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Load the explicit file (if any) and then the root-local files; each
    /// later layer only fills keys the earlier ones left unset.
    pub fn load_layers(explicit: Option<&Path>, root: Option<&Path>) -> Result<ConfigModel, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => ConfigModel::default(),
        };

        if let Some(root) = root {
            for path in Self::root_files(root) {
                config.merge_missing(Self::load_file(&path)?);
            }
        }

        config.validate()?;

        Ok(config)
    }
}

///
/// TESTS
///
