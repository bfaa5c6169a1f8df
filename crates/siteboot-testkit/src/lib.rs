//! Test utilities and fixtures for exercising siteboot sequences.
//!
//! Provides throwaway installation trees on disk, a scripted application
//! bootstrapper that records every call, and in-memory log and output sinks.

pub mod fixture;

pub use fixture::InstallFixture;

use siteboot_core::{
    AppPhase, Bootstrapper, CollaboratorError, PhaseIo,
    log::{Level, Logger, Topic},
    message::Message,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

///
/// Call
///
/// One recorded bootstrapper invocation.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    RunPhase(AppPhase),
    CheckDatabase,
    TableExists(String),
    Hooks { hook: String, reset: bool },
    Profile,
}

///
/// ScriptedBootstrapper
///

#[derive(Clone, Debug, Default)]
pub struct ScriptedBootstrapper {
    calls: Vec<Call>,
    output: BTreeMap<&'static str, String>,
    failures: BTreeMap<&'static str, String>,
    handler_phases: BTreeSet<&'static str>,
    database_error: Option<String>,
    tables: BTreeSet<String>,
    hooks: Vec<String>,
    rebuilt_hooks: Vec<String>,
    profile: Option<String>,
}

impl ScriptedBootstrapper {
    /// Reachable database holding the table a Backdrop site must have.
    #[must_use]
    pub fn compatible() -> Self {
        let mut b = Self::default();
        b.tables.insert("cache_layout_path".to_string());
        b.hooks = vec!["dblog".to_string(), "system".to_string()];
        b.rebuilt_hooks.clone_from(&b.hooks);
        b
    }

    #[must_use]
    pub fn with_output(mut self, phase: AppPhase, text: &str) -> Self {
        self.output.insert(phase.as_str(), text.to_string());
        self
    }

    #[must_use]
    pub fn failing(mut self, phase: AppPhase, message: &str) -> Self {
        self.failures.insert(phase.as_str(), message.to_string());
        self
    }

    /// Push an application handler during `phase` and never pop it.
    #[must_use]
    pub fn installing_handler(mut self, phase: AppPhase) -> Self {
        self.handler_phases.insert(phase.as_str());
        self
    }

    #[must_use]
    pub fn without_database(mut self, message: &str) -> Self {
        self.database_error = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn without_table(mut self, table: &str) -> Self {
        self.tables.remove(table);
        self
    }

    /// Hook cache that is missing the `system` log implementation until a
    /// rebuild is forced.
    #[must_use]
    pub fn with_stale_hook_cache(mut self) -> Self {
        self.hooks = vec!["dblog".to_string()];
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: &str) -> Self {
        self.profile = Some(profile.to_string());
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Phases the application was asked to run, in order.
    #[must_use]
    pub fn phases_run(&self) -> Vec<AppPhase> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::RunPhase(phase) => Some(*phase),
                _ => None,
            })
            .collect()
    }
}

impl Bootstrapper for ScriptedBootstrapper {
    fn run_phase(&mut self, phase: AppPhase, io: &mut PhaseIo<'_>) -> Result<(), CollaboratorError> {
        self.calls.push(Call::RunPhase(phase));

        if let Some(text) = self.output.get(phase.as_str()) {
            io.output.write_all(text.as_bytes())?;
        }
        if self.handler_phases.contains(phase.as_str()) {
            io.handlers.push("backdrop", |_| {});
        }
        if let Some(message) = self.failures.get(phase.as_str()) {
            return Err(CollaboratorError::new(message.clone()));
        }

        Ok(())
    }

    fn check_database(&mut self) -> Result<(), CollaboratorError> {
        self.calls.push(Call::CheckDatabase);

        match &self.database_error {
            Some(message) => Err(CollaboratorError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn table_exists(&mut self, name: &str) -> bool {
        self.calls.push(Call::TableExists(name.to_string()));

        self.tables.contains(name)
    }

    fn hook_implementations(&mut self, hook: &str, reset: bool) -> Vec<String> {
        self.calls.push(Call::Hooks {
            hook: hook.to_string(),
            reset,
        });

        if reset {
            self.hooks.clone_from(&self.rebuilt_hooks);
        }
        self.hooks.clone()
    }

    fn profile(&mut self) -> Option<String> {
        self.calls.push(Call::Profile);

        self.profile.clone()
    }
}

///
/// MemoryLogger
///

#[derive(Clone, Debug, Default)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub topic: String,
    pub message: Message,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered messages at or above `level`.
    #[must_use]
    pub fn lines(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level >= level)
            .map(|r| r.message.render())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines(Level::Debug).iter().any(|line| line.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn emit(&self, level: Level, topic: Topic, message: &Message) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                topic: topic.to_string(),
                message: message.clone(),
            });
    }
}

///
/// SharedBuffer
///
/// `Write` sink whose contents stay readable after it is boxed away.
///

#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

///
/// TESTS
///
