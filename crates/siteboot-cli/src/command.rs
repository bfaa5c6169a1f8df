//! Application bootstrapper backed by an external program.
//!
//! Every call runs `program args... <verb> [arg]` in the installation root.
//! Verbs: `phase <name>`, `check-database`, `table-exists <name>`,
//! `hooks <hook> [--reset]`, `profile`. Stdout of `phase` is written through
//! the phase I/O so capture scopes apply; stderr lines prefixed `warning:` or
//! `error:` are reported to the active diagnostic handler.

use siteboot_core::{
    AppPhase, Bootstrapper, CollaboratorError, PhaseIo, config::schema::AppConfig,
    handler::Diagnostic, log::Level,
};
use std::{
    path::PathBuf,
    process::{Command, Output},
};

///
/// CommandBootstrapper
///

#[derive(Clone, Debug)]
pub struct CommandBootstrapper {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
}

impl CommandBootstrapper {
    #[must_use]
    pub fn new(app: &AppConfig, workdir: Option<PathBuf>) -> Self {
        Self {
            program: app.program.clone(),
            args: app.args.clone(),
            workdir,
        }
    }

    fn invoke(&self, verb: &[&str]) -> Result<Output, CollaboratorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(verb);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        cmd.output().map_err(|err| {
            CollaboratorError::new(format!("cannot run {}: {err}", self.program))
        })
    }

    fn failure(verb: &str, output: &Output) -> CollaboratorError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if stderr.is_empty() {
            CollaboratorError::new(format!("{verb} exited with {}", output.status))
        } else {
            CollaboratorError::new(stderr.to_string())
        }
    }

    fn stdout_lines(output: &Output) -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Diagnostics the application printed on stderr.
#[must_use]
pub fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if let Some(text) = line.strip_prefix("warning:") {
                Some(Diagnostic::new(Level::Warn, text.trim()))
            } else {
                line.strip_prefix("error:")
                    .map(|text| Diagnostic::new(Level::Error, text.trim()))
            }
        })
        .collect()
}

impl Bootstrapper for CommandBootstrapper {
    fn run_phase(&mut self, phase: AppPhase, io: &mut PhaseIo<'_>) -> Result<(), CollaboratorError> {
        let output = self.invoke(&["phase", phase.as_str()])?;

        io.output.write_all(&output.stdout)?;
        for diagnostic in parse_diagnostics(&String::from_utf8_lossy(&output.stderr)) {
            io.handlers.report(&diagnostic);
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(Self::failure("phase", &output))
        }
    }

    fn check_database(&mut self) -> Result<(), CollaboratorError> {
        let output = self.invoke(&["check-database"])?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Self::failure("check-database", &output))
        }
    }

    fn table_exists(&mut self, name: &str) -> bool {
        self.invoke(&["table-exists", name])
            .is_ok_and(|output| output.status.success())
    }

    fn hook_implementations(&mut self, hook: &str, reset: bool) -> Vec<String> {
        let verb: &[&str] = if reset {
            &["hooks", hook, "--reset"]
        } else {
            &["hooks", hook]
        };

        match self.invoke(verb) {
            Ok(output) if output.status.success() => Self::stdout_lines(&output),
            _ => Vec::new(),
        }
    }

    fn profile(&mut self) -> Option<String> {
        let output = self.invoke(&["profile"]).ok()?;
        if !output.status.success() {
            return None;
        }

        Self::stdout_lines(&output).into_iter().next()
    }
}

///
/// UnconfiguredBootstrapper
///
/// Stand-in when no `[app]` program is configured: root and site phases still
/// work, anything that needs the application fails with a clear message.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredBootstrapper;

const UNCONFIGURED: &str = "no application bootstrapper configured; set [app] program in siteboot.toml";

impl Bootstrapper for UnconfiguredBootstrapper {
    fn run_phase(&mut self, _: AppPhase, _: &mut PhaseIo<'_>) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new(UNCONFIGURED))
    }

    fn check_database(&mut self) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new(UNCONFIGURED))
    }

    fn table_exists(&mut self, _: &str) -> bool {
        false
    }

    fn hook_implementations(&mut self, _: &str, _: bool) -> Vec<String> {
        Vec::new()
    }

    fn profile(&mut self) -> Option<String> {
        None
    }
}

///
/// AnyBootstrapper
///

#[derive(Clone, Debug)]
pub enum AnyBootstrapper {
    Command(CommandBootstrapper),
    Unconfigured(UnconfiguredBootstrapper),
}

impl AnyBootstrapper {
    #[must_use]
    pub fn from_config(app: Option<&AppConfig>, workdir: Option<PathBuf>) -> Self {
        match app {
            Some(app) => Self::Command(CommandBootstrapper::new(app, workdir)),
            None => Self::Unconfigured(UnconfiguredBootstrapper),
        }
    }

    fn inner(&mut self) -> &mut dyn Bootstrapper {
        match self {
            Self::Command(b) => b,
            Self::Unconfigured(b) => b,
        }
    }
}

impl Bootstrapper for AnyBootstrapper {
    fn run_phase(&mut self, phase: AppPhase, io: &mut PhaseIo<'_>) -> Result<(), CollaboratorError> {
        self.inner().run_phase(phase, io)
    }

    fn check_database(&mut self) -> Result<(), CollaboratorError> {
        self.inner().check_database()
    }

    fn table_exists(&mut self, name: &str) -> bool {
        self.inner().table_exists(name)
    }

    fn hook_implementations(&mut self, hook: &str, reset: bool) -> Vec<String> {
        self.inner().hook_implementations(hook, reset)
    }

    fn profile(&mut self) -> Option<String> {
        self.inner().profile()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_prefixes_become_diagnostics() {
        let found = parse_diagnostics("notice: ignored\nwarning: deprecated call\n error: fatal\n");

        assert_eq!(
            found,
            vec![
                Diagnostic::new(Level::Warn, "deprecated call"),
                Diagnostic::new(Level::Error, "fatal"),
            ]
        );
    }

    #[test]
    fn unconfigured_fails_application_calls() {
        let mut b = AnyBootstrapper::from_config(None, None);

        assert!(b.check_database().is_err());
        assert!(!b.table_exists("cache_layout_path"));
        assert!(b.profile().is_none());
    }

    #[test]
    fn missing_program_is_a_collaborator_error() {
        let app = AppConfig {
            program: "/nonexistent/siteboot-app".to_string(),
            args: Vec::new(),
        };
        let mut b = CommandBootstrapper::new(&app, None);

        let err = b.check_database().unwrap_err();

        assert!(err.message().contains("cannot run /nonexistent/siteboot-app"));
    }
}
