use clap::{Parser, Subcommand};
use siteboot_core::Phase;
use std::path::PathBuf;

/// siteboot - bootstrap an installed Backdrop site phase by phase
#[derive(Debug, Parser)]
#[command(name = "siteboot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Installation root; found by walking up from the current directory when omitted
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Site URI used to select the configuration directory
    #[arg(short = 'l', long, global = true)]
    pub uri: Option<String>,

    /// Discard application output and only log warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log debug messages
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Explicit config file; root-local siteboot.toml files fill the gaps
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Stay in the current directory instead of moving into the root
    #[arg(long, global = true)]
    pub no_chdir: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bootstrap up to a phase and print what was discovered
    Status {
        /// Highest phase to run (root, site, configuration, database, full)
        #[arg(short, long, default_value = "full")]
        phase: Phase,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Bootstrap as far as possible and report where it stopped
    Max {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the contrib module and theme search paths for the site
    Paths,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_full() {
        let cli = Cli::try_parse_from(["siteboot", "status"]).unwrap();

        assert!(matches!(
            cli.command,
            Command::Status {
                phase: Phase::Full,
                json: false
            }
        ));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "siteboot",
            "status",
            "--phase",
            "site",
            "--root",
            "/srv/www",
            "-l",
            "http://example.com",
            "-q",
        ])
        .unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("/srv/www")));
        assert_eq!(cli.uri.as_deref(), Some("http://example.com"));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Status { phase: Phase::Site, .. }));
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["siteboot", "-q", "-d", "max"]).is_err());
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(Cli::try_parse_from(["siteboot", "status", "--phase", "login"]).is_err());
    }
}
