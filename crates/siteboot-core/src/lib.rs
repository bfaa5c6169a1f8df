//! Core siteboot library.
//!
//! Sequences the bootstrap phases a command-line site tool runs against an
//! installed Backdrop application: find the installation root, pick the site
//! and its settings file, then hand configuration, database and full
//! bootstrap to the application itself.
//!
//! ## Layering
//!
//! - `sequencer` owns the per-invocation state and the phase state machine.
//! - `table/` holds the step functions: a generic `base` layer and the
//!   `backdrop` overlay consulted first.
//! - `root`, `site` and `bootstrapper` define the collaborator contracts and
//!   their filesystem-backed defaults.
//! - `capture` and `handler` are the two scoped resources wrapped around
//!   application calls.
//!
//! The default flow is: sequencer → table → collaborators.

pub mod bootstrapper;
pub mod capture;
pub mod config;
pub mod context;
pub mod error;
pub mod extension;
pub mod handler;
pub mod log;
pub mod message;
pub mod phase;
pub mod root;
pub mod sequencer;
pub mod server;
pub mod site;
pub mod table;

pub use bootstrapper::{AppPhase, Bootstrapper, PhaseIo};
pub use context::{BootstrapContext, ContextKey};
pub use error::{BootstrapError, CollaboratorError, ErrorCode};
pub use phase::{Phase, Step};
pub use sequencer::{BootstrapOptions, MaxOutcome, Sequencer, SequencerState};

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
