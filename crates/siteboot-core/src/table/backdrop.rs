//! Backdrop overlay.
//!
//! Root detection, settings discovery and the application calls that wrap
//! configuration, database and full bootstrap.

use crate::{
    bootstrapper::{AppPhase, PhaseIo},
    capture::CaptureMode,
    context::ContextKey,
    error::BootstrapError,
    log,
    log::Topic,
    phase::{Phase, Step},
    root::RootProbe,
    sequencer::Session,
    server::{DEFAULT_URI, ServerContext},
    site::SETTINGS_FILE,
    table::PhaseLayer,
};
use std::path::{Path, PathBuf};

pub const CORE_DIR: &str = "core";

#[must_use]
pub fn layer() -> PhaseLayer {
    PhaseLayer::new()
        .with(Phase::Root, Step::Validate, root_validate)
        .with(Phase::Root, Step::Execute, root_execute)
        .with(Phase::Site, Step::Validate, site_validate)
        .with(Phase::Site, Step::Execute, site_execute)
        .with(Phase::Configuration, Step::Execute, configuration_execute)
        .with(Phase::Database, Step::Validate, database_validate)
        .with(Phase::Database, Step::Execute, database_execute)
        .with(Phase::Full, Step::Execute, full_execute)
}

// -----------------------------------------------------------------------------
// Root
// -----------------------------------------------------------------------------

fn root_validate(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let selected = s
        .options
        .selected_root
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    if selected.is_empty() {
        return Err(BootstrapError::root_not_found());
    }
    s.context.set(ContextKey::SelectedRoot, selected.as_str())?;

    match s.locator.probe(&selected) {
        RootProbe::NotFound => Err(BootstrapError::root_not_found()),
        RootProbe::Invalid => Err(BootstrapError::root_invalid(&selected)),
        RootProbe::Found(signature) => {
            let root = Path::new(&selected)
                .canonicalize()
                .map_err(|_| BootstrapError::root_invalid(&selected))?;

            s.context.set(ContextKey::Root, root.display().to_string())?;
            s.context.set(ContextKey::Signature, signature)?;

            Ok(())
        }
    }
}

fn root_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let root = PathBuf::from(s.context.get_or_empty(ContextKey::Root));

    if s.options.change_dir {
        std::env::set_current_dir(&root)
            .map_err(|err| BootstrapError::chdir_failed(root.display(), err))?;
    }

    let core = root.join(CORE_DIR);
    s.context.set(ContextKey::Core, core.display().to_string())?;

    log!(
        s.logger,
        Topic::Root,
        Info,
        "Initialized Backdrop root directory at !root",
        "!root" => root.display(),
    );

    Ok(())
}

// -----------------------------------------------------------------------------
// Site
// -----------------------------------------------------------------------------

fn site_validate(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let uri = match s.options.uri.trim() {
        "" => DEFAULT_URI.to_string(),
        uri => uri.to_string(),
    };
    s.context.set(ContextKey::SelectedUri, uri.as_str())?;

    let root = PathBuf::from(s.context.get_or_empty(ContextKey::Root));

    // Conf path for the selected URI, computed on its own request context.
    let mut selected = ServerContext::default();
    selected.setup_from_uri(&uri);
    let selected_conf = s.resolver.resolve(&selected, &root);
    s.context.set(
        ContextKey::SelectedSiteConfPath,
        selected_conf.display().to_string(),
    )?;

    // The resolver reads http_host, so the live context is set up first.
    s.server.setup_from_uri(&uri);

    settings_present(s, &root)
}

fn settings_present(s: &mut Session<'_>, root: &Path) -> Result<(), BootstrapError> {
    let site = s.server.host().to_string();
    s.context.set(ContextKey::Site, site)?;

    let root_settings = root.join(SETTINGS_FILE);
    let conf_file = if root_settings.is_file() {
        root_settings
    } else {
        let conf_path = s.resolver.resolve(&*s.server, root);
        s.context
            .narrow(ContextKey::ConfPath, conf_path.display().to_string());

        root.join(conf_path).join(SETTINGS_FILE)
    };

    if !conf_file.is_file() {
        return Err(BootstrapError::settings_not_found(conf_file.display()));
    }

    Ok(())
}

fn site_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let uri = s.context.get_or_empty(ContextKey::SelectedUri).to_string();
    s.context.set(ContextKey::Uri, uri)?;

    let site = s.context.get_or_empty(ContextKey::Site).to_string();
    let conf_path = s.context.get_or_empty(ContextKey::ConfPath).to_string();
    s.context.set(ContextKey::SiteRoot, conf_path.as_str())?;

    if conf_path.is_empty() {
        log!(
            s.logger,
            Topic::Site,
            Info,
            "Initialized Backdrop site !site using settings from site root.",
            "!site" => site,
        );
    } else {
        log!(
            s.logger,
            Topic::Site,
            Info,
            "Initialized Backdrop site !site at !site_root",
            "!site" => site,
            "!site_root" => conf_path,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// Configuration / Database / Full
// -----------------------------------------------------------------------------

fn configuration_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let mode = CaptureMode::for_quiet(s.options.quiet);

    {
        let mut output = s.output.capture(mode);
        // The application installs its own handler and leaves it in place;
        // dropping the scope puts ours back on top.
        let mut handlers = s.handlers.scope();
        let mut io = PhaseIo {
            output: &mut output,
            handlers: &mut *handlers,
        };

        s.bootstrapper
            .run_phase(AppPhase::Configuration, &mut io)
            .map_err(|err| BootstrapError::collaborator(Phase::Configuration, err))?;
    }

    s.call_base(Step::Execute)
}

fn database_validate(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    s.call_base(Step::Validate)?;

    let table = s.options.required_table.clone();
    if !s.bootstrapper.table_exists(&table) {
        return Err(BootstrapError::database_incompatible(table));
    }

    Ok(())
}

fn database_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    {
        let mut io = PhaseIo {
            output: &mut *s.output,
            handlers: &mut *s.handlers,
        };

        s.bootstrapper
            .run_phase(AppPhase::Database, &mut io)
            .map_err(|err| BootstrapError::collaborator(Phase::Database, err))?;
    }

    s.call_base(Step::Execute)
}

fn full_execute(s: &mut Session<'_>) -> Result<(), BootstrapError> {
    let mode = CaptureMode::for_quiet(s.options.quiet);

    {
        let mut output = s.output.capture(mode);
        let mut io = PhaseIo {
            output: &mut output,
            handlers: &mut *s.handlers,
        };

        s.bootstrapper
            .run_phase(AppPhase::Full, &mut io)
            .map_err(|err| BootstrapError::collaborator(Phase::Full, err))?;
    }

    s.call_base(Step::Execute)
}
