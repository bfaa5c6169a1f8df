//! Application bootstrapper contract.
//!
//! The application does the real configuration, database and full
//! initialization. The sequencer only decides *when* each call happens and
//! what surrounds it.

use crate::{error::CollaboratorError, handler::HandlerStack, phase::Phase};
use std::{fmt, io::Write};

///
/// AppPhase
///
/// Phase token handed to the application.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppPhase {
    Configuration,
    Database,
    Full,
}

impl AppPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Database => "database",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for AppPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AppPhase> for Phase {
    fn from(phase: AppPhase) -> Self {
        match phase {
            AppPhase::Configuration => Self::Configuration,
            AppPhase::Database => Self::Database,
            AppPhase::Full => Self::Full,
        }
    }
}

///
/// PhaseIo
///
/// What the application may touch while a phase runs: an output stream
/// (subject to capture) and the diagnostic handler stack.
///

pub struct PhaseIo<'a> {
    pub output: &'a mut dyn Write,
    pub handlers: &'a mut HandlerStack,
}

///
/// Bootstrapper
///

pub trait Bootstrapper {
    /// Run the application's own bootstrap up to `phase`.
    fn run_phase(&mut self, phase: AppPhase, io: &mut PhaseIo<'_>) -> Result<(), CollaboratorError>;

    /// Generic database connectivity check.
    fn check_database(&mut self) -> Result<(), CollaboratorError>;

    /// Must be side-effect free; may be called more than once.
    fn table_exists(&mut self, name: &str) -> bool;

    /// Modules implementing `hook`. `reset` rebuilds the implementation
    /// cache before answering.
    fn hook_implementations(&mut self, hook: &str, reset: bool) -> Vec<String>;

    /// Install profile of the site, once known.
    fn profile(&mut self) -> Option<String>;
}
