//! Extension lookup helpers.

use crate::bootstrapper::Bootstrapper;

pub const LOG_HOOK: &str = "watchdog";
pub const LOG_HOOK_OWNER: &str = "system";

/// Make sure the built-in log hook implementation is visible to the
/// application's hook cache. Returns true when a cache rebuild was forced.
pub fn add_logger(bootstrapper: &mut dyn Bootstrapper) -> bool {
    let implementors = bootstrapper.hook_implementations(LOG_HOOK, false);
    if implementors.iter().any(|m| m == LOG_HOOK_OWNER) {
        return false;
    }

    bootstrapper.hook_implementations(LOG_HOOK, true);
    true
}

/// Candidate module directories: site-specific first, then root-relative.
#[must_use]
pub fn contrib_modules_paths(conf_path: &str) -> [String; 2] {
    [format!("{conf_path}modules"), "/modules".to_string()]
}

/// Candidate theme directories: site-specific first, then root-relative.
#[must_use]
pub fn contrib_themes_paths(conf_path: &str) -> [String; 2] {
    [format!("{conf_path}themes"), "/themes".to_string()]
}

///
/// TESTS
///
