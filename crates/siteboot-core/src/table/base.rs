//! Generic base steps shared by every application.

use crate::{
    context::ContextKey,
    error::BootstrapError,
    extension::{self, LOG_HOOK},
    log,
    log::Topic,
    phase::{Phase, Step},
    sequencer::Session,
    table::PhaseLayer,
};

#[must_use]
pub fn layer() -> PhaseLayer {
    PhaseLayer::new()
        .with(Phase::Configuration, Step::Execute, configuration_execute)
        .with(Phase::Database, Step::Validate, database_validate)
        .with(Phase::Database, Step::Execute, database_execute)
        .with(Phase::Full, Step::Execute, full_execute)
}

fn configuration_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    log!(s.logger, Topic::Configuration, Debug, "Configuration bootstrapped");

    Ok(())
}

/// Connectivity only; says nothing about what the database contains.
fn database_validate(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    s.bootstrapper
        .check_database()
        .map_err(BootstrapError::database_unavailable)?;

    log!(s.logger, Topic::Database, Debug, "Database connection verified");

    Ok(())
}

fn database_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    log!(s.logger, Topic::Database, Info, "Successfully connected to the Backdrop database");

    Ok(())
}

fn full_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    if extension::add_logger(&mut *s.bootstrapper) {
        log!(s.logger, Topic::Full, Debug, "Rebuilt !hook implementation cache", "!hook" => LOG_HOOK);
    }

    if let Some(profile) = s.bootstrapper.profile() {
        s.context.set(ContextKey::Profile, profile)?;
    }

    log!(s.logger, Topic::Full, Ok, "Backdrop fully bootstrapped");

    Ok(())
}
