//! Facts discovered while bootstrapping.
//!
//! Values are written once by the phase that discovers them and read by every
//! later phase. The only sanctioned overwrite is [`BootstrapContext::narrow`],
//! used when a tentative value is replaced by a resolved one.

use crate::{error::BootstrapError, error::ErrorCode, message::Message};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// ContextKey
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ContextKey {
    ConfPath,
    Core,
    Profile,
    Root,
    SelectedRoot,
    SelectedSiteConfPath,
    SelectedUri,
    Signature,
    Site,
    SiteRoot,
    Uri,
}

impl ContextKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfPath => "conf_path",
            Self::Core => "core",
            Self::Profile => "profile",
            Self::Root => "root",
            Self::SelectedRoot => "selected_root",
            Self::SelectedSiteConfPath => "selected_site_conf_path",
            Self::SelectedUri => "selected_uri",
            Self::Signature => "signature",
            Self::Site => "site",
            Self::SiteRoot => "site_root",
            Self::Uri => "uri",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ContextError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ContextError {
    #[error("context key '{key}' is already set to '{current}', refusing '{attempted}'")]
    Immutable {
        key: ContextKey,
        current: String,
        attempted: String,
    },
}

impl From<ContextError> for BootstrapError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Immutable {
                key,
                current,
                attempted,
            } => Self::new(
                ErrorCode::ContextConflict,
                Message::new("Context value !key is already !current; refusing !attempted")
                    .with("!key", key)
                    .with("!current", current)
                    .with("!attempted", attempted),
            ),
        }
    }
}

///
/// BootstrapContext
///

#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BootstrapContext {
    values: BTreeMap<ContextKey, String>,
}

impl BootstrapContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-once. Setting the value a key already holds is a no-op.
    pub fn set(&mut self, key: ContextKey, value: impl Into<String>) -> Result<&str, ContextError> {
        let value = value.into();

        if let Some(current) = self.values.get(&key)
            && *current != value
        {
            return Err(ContextError::Immutable {
                key,
                current: current.clone(),
                attempted: value,
            });
        }

        Ok(self.values.entry(key).or_insert(value).as_str())
    }

    /// Replace a tentative value with a resolved one.
    pub fn narrow(&mut self, key: ContextKey, value: impl Into<String>) -> &str {
        let slot = self.values.entry(key).or_default();
        *slot = value.into();
        slot.as_str()
    }

    #[must_use]
    pub fn get(&self, key: ContextKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Value for `key`, or empty when unset.
    #[must_use]
    pub fn get_or_empty(&self, key: ContextKey) -> &str {
        self.get(key).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, key: ContextKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContextKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

///
/// TESTS
///
