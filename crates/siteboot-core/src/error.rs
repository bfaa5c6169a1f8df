use crate::{message::Message, phase::Phase};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// BootstrapError
///
/// Structured failure of a bootstrap step.
///
/// The code is stable and is what automation should match on; the message is
/// advisory and carries interpolated parameters.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("{code}: {message}")]
pub struct BootstrapError {
    code: ErrorCode,
    message: Message,
}

impl BootstrapError {
    #[must_use]
    pub const fn new(code: ErrorCode, message: Message) -> Self {
        Self { code, message }
    }

    #[must_use]
    pub fn root_not_found() -> Self {
        Self::new(
            ErrorCode::RootNotFound,
            Message::new("A Backdrop installation directory could not be found"),
        )
    }

    #[must_use]
    pub fn root_invalid(root: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::RootInvalid,
            Message::new("The directory !root does not contain a valid Backdrop installation")
                .with("!root", root),
        )
    }

    #[must_use]
    pub fn settings_not_found(file: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::SettingsNotFound,
            Message::new("Could not find a Backdrop settings.php file at !file.").with("!file", file),
        )
    }

    #[must_use]
    pub fn database_unavailable(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DatabaseUnavailable,
            Message::new("Unable to connect to the Backdrop database: !reason")
                .with("!reason", reason),
        )
    }

    #[must_use]
    pub fn database_incompatible(table: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DatabaseIncompatible,
            Message::new("The connected database has no !table table; it does not belong to a Backdrop site")
                .with("!table", table),
        )
    }

    /// Collaborator failures are reported verbatim. The text travels as a
    /// parameter so placeholders inside it are never substituted.
    #[must_use]
    pub fn collaborator(phase: Phase, err: CollaboratorError) -> Self {
        Self::new(
            ErrorCode::BootstrapFailed,
            Message::new("!error")
                .with("!error", err.message)
                .with("!phase", phase),
        )
    }

    #[must_use]
    pub fn chdir_failed(path: impl fmt::Display, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ChdirFailed,
            Message::new("Could not change directory to !path: !error")
                .with("!path", path)
                .with("!error", err),
        )
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub const fn message(&self) -> &Message {
        &self.message
    }
}

///
/// ErrorCode
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "&'static str")]
pub enum ErrorCode {
    RootNotFound,
    RootInvalid,
    SettingsNotFound,
    DatabaseUnavailable,
    DatabaseIncompatible,
    BootstrapFailed,
    ContextConflict,
    ChdirFailed,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RootNotFound => "ROOT_NOT_FOUND",
            Self::RootInvalid => "ROOT_INVALID",
            Self::SettingsNotFound => "SETTINGS_NOT_FOUND",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            Self::DatabaseIncompatible => "DATABASE_INCOMPATIBLE",
            Self::BootstrapFailed => "BOOTSTRAP_FAILED",
            Self::ContextConflict => "CONTEXT_CONFLICT",
            Self::ChdirFailed => "CHDIR_FAILED",
        }
    }
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        code.as_str()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// CollaboratorError
///
/// Failure reported by the application bootstrapper. Only the text survives.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct CollaboratorError {
    message: String,
}

impl CollaboratorError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for CollaboratorError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

///
/// TESTS
///
