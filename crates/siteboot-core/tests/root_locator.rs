use siteboot_core::root::{FsRootLocator, RootLocator, RootMarkers, RootProbe};
use siteboot_testkit::InstallFixture;
use std::fs;

fn probe(path: &std::path::Path) -> RootProbe {
    FsRootLocator::default().probe(&path.display().to_string())
}

#[test]
fn valid_root_returns_core_marker_as_signature() {
    let fixture = InstallFixture::backdrop();

    assert_eq!(
        probe(fixture.path()),
        RootProbe::Found("core/includes/common.inc".to_string())
    );
}

#[test]
fn empty_candidate_is_not_found() {
    assert_eq!(FsRootLocator::default().probe(""), RootProbe::NotFound);
}

#[test]
fn existing_directory_without_core_marker_is_invalid() {
    let fixture = InstallFixture::backdrop().without("core/includes/common.inc");

    assert_eq!(probe(fixture.path()), RootProbe::Invalid);
}

#[test]
fn sibling_application_is_invalid() {
    let fixture = InstallFixture::sibling_application();

    assert_eq!(probe(fixture.path()), RootProbe::Invalid);
}

#[test]
fn missing_entry_point_is_invalid() {
    let fixture = InstallFixture::backdrop().without("index.php");

    assert_eq!(probe(fixture.path()), RootProbe::Invalid);
}

#[test]
fn nonexistent_path_is_invalid() {
    let fixture = InstallFixture::empty();

    assert_eq!(probe(&fixture.join("nope")), RootProbe::Invalid);
}

#[test]
fn regular_file_is_invalid() {
    let fixture = InstallFixture::backdrop();

    assert_eq!(probe(&fixture.join("index.php")), RootProbe::Invalid);
}

#[test]
fn probing_is_repeatable() {
    let fixture = InstallFixture::backdrop();

    assert_eq!(probe(fixture.path()), probe(fixture.path()));
}

#[test]
fn locate_upward_finds_enclosing_root() {
    let fixture = InstallFixture::backdrop();
    let nested = fixture.join("sites/example/files");
    fs::create_dir_all(&nested).unwrap();

    let found = FsRootLocator::default().locate_upward(&nested);

    assert_eq!(found, Some(fixture.canonical()));
}

#[test]
fn locate_upward_without_root_is_none() {
    let fixture = InstallFixture::empty();

    assert_eq!(FsRootLocator::default().locate_upward(fixture.path()), None);
}

#[test]
fn custom_markers_are_honored() {
    let fixture = InstallFixture::sibling_application();
    let locator = FsRootLocator::new(RootMarkers {
        variant: "core/misc/drupal.js".to_string(),
        ..RootMarkers::default()
    });

    assert!(matches!(
        locator.probe(&fixture.path().display().to_string()),
        RootProbe::Found(_)
    ));
}
