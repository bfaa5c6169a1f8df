use siteboot_core::{
    AppPhase, BootstrapOptions, ContextKey, ErrorCode, Phase, Sequencer, SequencerState, Step,
    capture::OutputStack,
    log::Level,
    sequencer::TOOL_HANDLER,
};
use siteboot_testkit::{Call, InstallFixture, MemoryLogger, ScriptedBootstrapper, SharedBuffer};
use std::sync::Arc;

struct Harness {
    seq: Sequencer<ScriptedBootstrapper>,
    logger: MemoryLogger,
    out: SharedBuffer,
}

fn options(fixture: &InstallFixture, quiet: bool) -> BootstrapOptions {
    BootstrapOptions {
        selected_root: Some(fixture.path().to_path_buf()),
        uri: "http://example.com".to_string(),
        quiet,
        ..BootstrapOptions::default()
    }
}

fn harness(options: BootstrapOptions, bootstrapper: ScriptedBootstrapper) -> Harness {
    let logger = MemoryLogger::new();
    let out = SharedBuffer::new();
    let seq = Sequencer::builder(bootstrapper)
        .options(options)
        .logger(Arc::new(logger.clone()))
        .output(OutputStack::new(Box::new(out.clone())))
        .build();

    Harness { seq, logger, out }
}

fn site() -> InstallFixture {
    InstallFixture::backdrop().with_site("example.com")
}

fn all_steps() -> Vec<(Phase, Step)> {
    Phase::ALL
        .into_iter()
        .flat_map(|p| [(p, Step::Validate), (p, Step::Execute)])
        .collect()
}

// -----------------------------------------------------------------------------
// Happy path
// -----------------------------------------------------------------------------

#[test]
fn full_bootstrap_runs_every_step_in_order() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().with_profile("standard"),
    );

    assert_eq!(h.seq.run(), Ok(Phase::Full));
    assert_eq!(h.seq.trace(), all_steps().as_slice());
    assert_eq!(h.seq.state(), &SequencerState::Complete { phase: Phase::Full });
    assert_eq!(
        h.seq.bootstrapper().phases_run(),
        vec![AppPhase::Configuration, AppPhase::Database, AppPhase::Full]
    );

    let root = fixture.canonical();
    let cx = h.seq.context();
    assert_eq!(cx.get(ContextKey::Root), Some(root.display().to_string().as_str()));
    assert_eq!(
        cx.get(ContextKey::Core),
        Some(root.join("core").display().to_string().as_str())
    );
    assert_eq!(cx.get(ContextKey::Signature), Some("core/includes/common.inc"));
    assert_eq!(cx.get(ContextKey::Uri), Some("http://example.com"));
    assert_eq!(cx.get(ContextKey::Site), Some("example.com"));
    assert_eq!(cx.get(ContextKey::SelectedSiteConfPath), Some("sites/example.com"));
    assert_eq!(cx.get(ContextKey::ConfPath), Some("sites/example.com"));
    assert_eq!(cx.get(ContextKey::SiteRoot), Some("sites/example.com"));
    assert_eq!(cx.get(ContextKey::Profile), Some("standard"));
    assert_eq!(h.seq.server().host(), "example.com");

    assert!(h.logger.contains("Initialized Backdrop root directory at"));
    assert!(h.logger.contains("Initialized Backdrop site example.com at sites/example.com"));
}

#[test]
fn root_settings_file_takes_priority() {
    let fixture = InstallFixture::backdrop()
        .with_root_settings()
        .with_site("example.com");
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    assert_eq!(h.seq.run_to(Phase::Site), Ok(Phase::Site));

    let cx = h.seq.context();
    assert!(!cx.contains(ContextKey::ConfPath));
    assert_eq!(cx.get(ContextKey::SiteRoot), Some(""));
    assert!(h.logger.contains("using settings from site root"));
}

#[test]
fn empty_uri_selects_default_site() {
    let fixture = InstallFixture::backdrop().with_site("default");
    let mut opts = options(&fixture, false);
    opts.uri = String::new();
    let mut h = harness(opts, ScriptedBootstrapper::compatible());

    assert_eq!(h.seq.run_to(Phase::Site), Ok(Phase::Site));
    assert_eq!(h.seq.context().get(ContextKey::Uri), Some("http://default"));
    assert_eq!(h.seq.context().get(ContextKey::ConfPath), Some("sites/default"));
}

// -----------------------------------------------------------------------------
// Validation failures
// -----------------------------------------------------------------------------

#[test]
fn missing_root_fails_before_any_probe() {
    let mut h = harness(BootstrapOptions::default(), ScriptedBootstrapper::compatible());

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::RootNotFound);
    assert_eq!(h.seq.trace(), &[(Phase::Root, Step::Validate)]);
    assert!(h.seq.bootstrapper().calls().is_empty());
    assert!(h.seq.context().is_empty());
}

#[test]
fn invalid_root_reports_the_directory() {
    let fixture = InstallFixture::sibling_application();
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::RootInvalid);
    assert_eq!(
        err.message().param("!root"),
        Some(fixture.path().display().to_string().as_str())
    );
    assert!(!h.seq.context().contains(ContextKey::Root));
}

#[test]
fn missing_settings_reports_attempted_file() {
    let fixture = InstallFixture::backdrop();
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::SettingsNotFound);
    assert!(err.to_string().contains("sites/default/settings.php"));
    assert_eq!(
        h.seq.trace(),
        &[
            (Phase::Root, Step::Validate),
            (Phase::Root, Step::Execute),
            (Phase::Site, Step::Validate),
        ]
    );
    assert_eq!(h.seq.completed(), Some(Phase::Root));
}

#[test]
fn database_without_expected_table_is_incompatible() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().without_table("cache_layout_path"),
    );

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::DatabaseIncompatible);
    assert_eq!(
        h.seq.bootstrapper().calls(),
        &[
            Call::RunPhase(AppPhase::Configuration),
            Call::CheckDatabase,
            Call::TableExists("cache_layout_path".to_string()),
        ]
    );
    assert_eq!(h.seq.completed(), Some(Phase::Configuration));
}

#[test]
fn unreachable_database_skips_table_check() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().without_database("SQLSTATE[HY000] [2002] refused"),
    );

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::DatabaseUnavailable);
    assert!(
        !h.seq
            .bootstrapper()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::TableExists(_)))
    );
}

#[test]
fn custom_required_table_is_checked() {
    let fixture = site();
    let mut opts = options(&fixture, false);
    opts.required_table = "system".to_string();
    let mut h = harness(opts, ScriptedBootstrapper::compatible());

    let err = h.seq.run().unwrap_err();

    assert_eq!(err.code(), ErrorCode::DatabaseIncompatible);
    assert_eq!(err.message().param("!table"), Some("system"));
}

// -----------------------------------------------------------------------------
// Terminal states
// -----------------------------------------------------------------------------

#[test]
fn failure_is_terminal() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().failing(AppPhase::Database, "PDOException"),
    );

    let first = h.seq.run().unwrap_err();
    let calls = h.seq.bootstrapper().calls().len();
    let steps = h.seq.trace().len();

    let second = h.seq.run_to(Phase::Root).unwrap_err();

    assert_eq!(first, second);
    assert_eq!(first.code(), ErrorCode::BootstrapFailed);
    assert_eq!(first.message().render(), "PDOException");
    assert_eq!(h.seq.bootstrapper().calls().len(), calls);
    assert_eq!(h.seq.trace().len(), steps);
    assert!(h.seq.state().is_failed());
    assert_eq!(h.logger.lines(Level::Error).len(), 1);
}

#[test]
fn run_to_continues_from_last_completed_phase() {
    let fixture = site();
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    assert_eq!(h.seq.run_to(Phase::Site), Ok(Phase::Site));
    assert!(h.seq.bootstrapper().calls().is_empty());

    assert_eq!(h.seq.run_to(Phase::Root), Ok(Phase::Site));
    assert_eq!(h.seq.run(), Ok(Phase::Full));
    assert_eq!(h.seq.trace(), all_steps().as_slice());
}

#[test]
fn run_max_reports_how_far_it_got() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().without_table("cache_layout_path"),
    );

    let outcome = h.seq.run_max();

    assert_eq!(outcome.reached, Some(Phase::Configuration));
    assert_eq!(
        outcome.error.map(|e| e.code()),
        Some(ErrorCode::DatabaseIncompatible)
    );
}

#[test]
fn run_max_on_healthy_site_reaches_full() {
    let fixture = site();
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    let outcome = h.seq.run_max();

    assert_eq!(outcome.reached, Some(Phase::Full));
    assert!(outcome.error.is_none());
}

// -----------------------------------------------------------------------------
// Output capture
// -----------------------------------------------------------------------------

#[test]
fn verbose_run_passes_collaborator_output_through() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible()
            .with_output(AppPhase::Configuration, "X")
            .with_output(AppPhase::Full, "Y"),
    );

    h.seq.run().unwrap();

    assert_eq!(h.out.text(), "XY");
    assert_eq!(h.seq.output_depth(), 0);
}

#[test]
fn quiet_run_discards_collaborator_output() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, true),
        ScriptedBootstrapper::compatible()
            .with_output(AppPhase::Configuration, "X")
            .with_output(AppPhase::Full, "Y"),
    );

    h.seq.run().unwrap();

    assert_eq!(h.out.text(), "");
    assert_eq!(h.seq.output_depth(), 0);
}

#[test]
fn capture_is_released_when_collaborator_fails() {
    for (quiet, expected) in [(false, "X"), (true, "")] {
        let fixture = site();
        let mut h = harness(
            options(&fixture, quiet),
            ScriptedBootstrapper::compatible()
                .with_output(AppPhase::Configuration, "X")
                .failing(AppPhase::Configuration, "fatal error"),
        );

        let err = h.seq.run().unwrap_err();

        assert_eq!(err.code(), ErrorCode::BootstrapFailed);
        assert_eq!(h.out.text(), expected, "quiet={quiet}");
        assert_eq!(h.seq.output_depth(), 0, "quiet={quiet}");
    }
}

// -----------------------------------------------------------------------------
// Handlers and helpers
// -----------------------------------------------------------------------------

#[test]
fn tool_handler_is_restored_after_configuration() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().installing_handler(AppPhase::Configuration),
    );

    h.seq.run_to(Phase::Configuration).unwrap();

    assert_eq!(h.seq.handlers().depth(), 1);
    assert_eq!(h.seq.handlers().active(), Some(TOOL_HANDLER));
}

#[test]
fn tool_handler_is_restored_when_configuration_fails() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible()
            .installing_handler(AppPhase::Configuration)
            .failing(AppPhase::Configuration, "boom"),
    );

    assert!(h.seq.run().is_err());
    assert_eq!(h.seq.handlers().active(), Some(TOOL_HANDLER));
}

#[test]
fn full_bootstrap_rebuilds_stale_hook_cache() {
    let fixture = site();
    let mut h = harness(
        options(&fixture, false),
        ScriptedBootstrapper::compatible().with_stale_hook_cache(),
    );

    h.seq.run().unwrap();

    assert!(h.seq.bootstrapper().calls().contains(&Call::Hooks {
        hook: "watchdog".to_string(),
        reset: true,
    }));
    assert!(!h.seq.add_logger());
}

#[test]
fn contrib_paths_follow_site_root() {
    let fixture = InstallFixture::backdrop().with_root_settings();
    let mut h = harness(options(&fixture, false), ScriptedBootstrapper::compatible());

    h.seq.run_to(Phase::Site).unwrap();

    assert_eq!(
        h.seq.contrib_modules_paths(),
        ["modules".to_string(), "/modules".to_string()]
    );
    assert_eq!(
        h.seq.contrib_themes_paths(),
        ["themes".to_string(), "/themes".to_string()]
    );
}
