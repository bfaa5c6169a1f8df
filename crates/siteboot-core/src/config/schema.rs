use crate::{log::Level, root::RootMarkers};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};
use thiserror::Error as ThisError;

pub const DEFAULT_REQUIRED_TABLE: &str = "cache_layout_path";
pub const NAME_MAX_BYTES: usize = 64;

///
/// ConfigSchemaError
///

#[derive(Debug, ThisError)]
pub enum ConfigSchemaError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigSchemaError>;
}

fn validate_relative(path: &str, context: &str) -> Result<(), ConfigSchemaError> {
    if path.is_empty() {
        return Err(ConfigSchemaError::ValidationError(format!(
            "{context} must not be empty"
        )));
    }
    if path.starts_with('/') || path.split('/').any(|seg| seg == "..") {
        return Err(ConfigSchemaError::ValidationError(format!(
            "{context} '{path}' must be a relative path inside the root"
        )));
    }

    Ok(())
}

///
/// ConfigModel
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigModel {
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub markers: Option<RootMarkers>,

    // host[.path] -> directory under sites/
    #[serde(default)]
    pub sites: BTreeMap<String, String>,

    #[serde(default)]
    pub app: Option<AppConfig>,

    #[serde(default)]
    pub log: LogConfig,
}

impl ConfigModel {
    /// Fill every key this layer leaves unset from `lower`.
    pub fn merge_missing(&mut self, lower: Self) {
        self.bootstrap.merge_missing(lower.bootstrap);
        if self.markers.is_none() {
            self.markers = lower.markers;
        }
        for (host, dir) in lower.sites {
            self.sites.entry(host).or_insert(dir);
        }
        if self.app.is_none() {
            self.app = lower.app;
        }
        self.log.merge_missing(lower.log);
    }

    #[must_use]
    pub fn markers(&self) -> RootMarkers {
        self.markers.clone().unwrap_or_default()
    }
}

impl Validate for ConfigModel {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.bootstrap.validate()?;

        if let Some(markers) = &self.markers {
            validate_relative(&markers.entry_point, "markers.entry_point")?;
            validate_relative(&markers.core, "markers.core")?;
            validate_relative(&markers.variant, "markers.variant")?;
        }

        for (host, dir) in &self.sites {
            if host.is_empty() || host.len() > NAME_MAX_BYTES {
                return Err(ConfigSchemaError::ValidationError(format!(
                    "site alias '{host}' must be 1..={NAME_MAX_BYTES} bytes"
                )));
            }
            if dir.contains('/') || dir == ".." || dir.is_empty() {
                return Err(ConfigSchemaError::ValidationError(format!(
                    "site alias '{host}' must name a single directory under sites/, got '{dir}'"
                )));
            }
        }

        if let Some(app) = &self.app {
            app.validate()?;
        }

        Ok(())
    }
}

///
/// BootstrapConfig
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    pub root: Option<PathBuf>,
    pub uri: Option<String>,
    pub quiet: Option<bool>,
    pub change_dir: Option<bool>,
    pub required_table: Option<String>,
}

impl BootstrapConfig {
    fn merge_missing(&mut self, lower: Self) {
        self.root = self.root.take().or(lower.root);
        self.uri = self.uri.take().or(lower.uri);
        self.quiet = self.quiet.or(lower.quiet);
        self.change_dir = self.change_dir.or(lower.change_dir);
        self.required_table = self.required_table.take().or(lower.required_table);
    }

    #[must_use]
    pub fn required_table(&self) -> &str {
        self.required_table.as_deref().unwrap_or(DEFAULT_REQUIRED_TABLE)
    }
}

impl Validate for BootstrapConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        let table = self.required_table();
        if table.is_empty()
            || table.len() > NAME_MAX_BYTES
            || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigSchemaError::ValidationError(format!(
                "bootstrap.required_table '{table}' is not a valid table name"
            )));
        }

        Ok(())
    }
}

///
/// AppConfig
///
/// External program that performs the application's own bootstrap.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.program.trim().is_empty() {
            return Err(ConfigSchemaError::ValidationError(
                "app.program must not be empty".into(),
            ));
        }

        Ok(())
    }
}

///
/// LogConfig
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<Level>,
    pub color: Option<bool>,
}

impl LogConfig {
    fn merge_missing(&mut self, lower: Self) {
        self.level = self.level.or(lower.level);
        self.color = self.color.or(lower.color);
    }
}
