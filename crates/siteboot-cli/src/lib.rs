//! `siteboot` command-line front end.
//!
//! Resolves the installation root and layered config, builds a sequencer
//! around the configured application bootstrapper and prints what the
//! requested phases discovered.

pub mod args;
pub mod command;
pub mod report;

use crate::{
    args::{Cli, Command},
    command::AnyBootstrapper,
    report::{MaxReport, PathsReport, StatusReport},
};
use siteboot_core::{
    BootstrapError, BootstrapOptions, Phase, Sequencer,
    capture::OutputStack,
    config::{Config, ConfigError, ConfigModel},
    log::{ConsoleLogger, Level},
    root::FsRootLocator,
    site::DirectoryScanResolver,
};
use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 1 for bootstrap failures, 2 for usage and config.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Bootstrap(_) | Self::Io(_) | Self::Json(_) => 1,
        }
    }
}

/// Root from the flag, then from config, then by walking up from `cwd`.
/// Relative roots are resolved against `cwd` and canonicalized, so the
/// application sees the same directory after the root phase changes into it.
fn resolve_root(cli: &Cli, config: &ConfigModel, cwd: &Path) -> Option<PathBuf> {
    let selected = cli
        .root
        .clone()
        .or_else(|| config.bootstrap.root.clone())
        .map(|root| cwd.join(root));

    match selected {
        Some(root) => Some(root.canonicalize().unwrap_or(root)),
        None => FsRootLocator::new(config.markers()).locate_upward(cwd),
    }
}

/// Config layers plus command-line overrides, with relative paths taken
/// from `cwd`.
pub fn load(cli: &Cli, cwd: &Path) -> Result<(ConfigModel, BootstrapOptions), CliError> {
    let explicit_path = cli.config.as_ref().map(|path| cwd.join(path));
    let explicit = Config::load_layers(explicit_path.as_deref(), None)?;
    let root = resolve_root(cli, &explicit, cwd);
    let config = Config::load_layers(explicit_path.as_deref(), root.as_deref())?;

    let mut options = BootstrapOptions::from_config(&config);
    options.selected_root = root;
    if let Some(uri) = &cli.uri {
        options.uri.clone_from(uri);
    }
    if cli.quiet {
        options.quiet = true;
    }
    if cli.no_chdir {
        options.change_dir = false;
    }

    Ok((config, options))
}

fn logger(cli: &Cli, config: &ConfigModel) -> ConsoleLogger {
    let level = if cli.quiet {
        Level::Warn
    } else if cli.debug {
        Level::Debug
    } else {
        config.log.level.unwrap_or_default()
    };

    let logger = ConsoleLogger::new(level);
    if config.log.color == Some(false) {
        logger.without_color()
    } else {
        logger
    }
}

/// Sequencer for one invocation, wired from config. Application output
/// passes through to stderr; stdout carries only the report.
#[must_use]
pub fn sequencer(
    cli: &Cli,
    config: &ConfigModel,
    options: BootstrapOptions,
) -> Sequencer<AnyBootstrapper> {
    let workdir = options.selected_root.clone();
    let bootstrapper = AnyBootstrapper::from_config(config.app.as_ref(), workdir);

    Sequencer::builder(bootstrapper)
        .options(options)
        .locator(FsRootLocator::new(config.markers()))
        .resolver(DirectoryScanResolver::with_aliases(config.sites.clone()))
        .logger(Arc::new(logger(cli, config)))
        .output(OutputStack::new(Box::new(io::stderr())))
        .build()
}

/// Run the parsed command from the process working directory.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let cwd = env::current_dir()?;

    run_in(cli, &cwd, out)
}

/// Run the parsed command, writing the report to `out`. The report is
/// printed even when bootstrapping fails; the failure is returned afterwards.
pub fn run_in(cli: &Cli, cwd: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let (config, options) = load(cli, cwd)?;
    let mut seq = sequencer(cli, &config, options);

    match &cli.command {
        Command::Status { phase, json } => {
            let result = seq.run_to(*phase);
            let report = StatusReport {
                target: *phase,
                state: seq.state(),
                context: seq.context(),
                server: seq.server(),
            };
            write_report(out, *json, &report, report::status_text)?;
            result?;
        }
        Command::Max { json } => {
            let outcome = seq.run_max();
            let report = MaxReport {
                outcome: &outcome,
                context: seq.context(),
            };
            write_report(out, *json, &report, report::max_text)?;
            if let Some(error) = outcome.error {
                return Err(error.into());
            }
        }
        Command::Paths => {
            seq.run_to(Phase::Site)?;
            let report = PathsReport {
                modules: seq.contrib_modules_paths(),
                themes: seq.contrib_themes_paths(),
            };
            out.write_all(report::paths_text(&report).as_bytes())?;
        }
    }

    Ok(())
}

fn write_report<T: serde::Serialize>(
    out: &mut dyn Write,
    json: bool,
    report: &T,
    text: fn(&T) -> String,
) -> Result<(), CliError> {
    let rendered = if json {
        report::json(report)?
    } else {
        text(report)
    };
    out.write_all(rendered.as_bytes())?;

    Ok(())
}

/// Parse failures exit 2 through clap; everything else maps via [`CliError`].
pub fn main_with(cli: &Cli) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(cli, &mut out) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("siteboot: {err}");
            err.exit_code()
        }
    }
}
