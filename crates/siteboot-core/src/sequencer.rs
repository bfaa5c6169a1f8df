//! Bootstrap phase sequencer.
//!
//! Drives `Root → Site → Configuration → Database → Full` for one command
//! invocation. Each phase validates before it executes; the first error is
//! terminal and is returned again by every later call. Nothing is retried and
//! a failed sequencer never resumes: callers build a new one.

use crate::{
    bootstrapper::Bootstrapper,
    capture::OutputStack,
    config::{ConfigModel, schema::DEFAULT_REQUIRED_TABLE},
    context::{BootstrapContext, ContextKey},
    error::BootstrapError,
    extension,
    handler::{Diagnostic, HandlerStack},
    log,
    log::{ConsoleLogger, Logger, Topic},
    message::Message,
    phase::{Phase, Step},
    root::{FsRootLocator, RootLocator},
    server::ServerContext,
    site::{DirectoryScanResolver, SiteResolver},
    table::PhaseTable,
};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc, time::Instant};

pub const TOOL_HANDLER: &str = "siteboot";

///
/// BootstrapOptions
///
/// Invocation inputs already parsed by the command-line layer.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BootstrapOptions {
    pub selected_root: Option<PathBuf>,
    pub uri: String,
    pub quiet: bool,
    pub change_dir: bool,
    pub required_table: String,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            selected_root: None,
            uri: String::new(),
            quiet: false,
            change_dir: false,
            required_table: DEFAULT_REQUIRED_TABLE.to_string(),
        }
    }
}

impl BootstrapOptions {
    #[must_use]
    pub fn from_config(config: &ConfigModel) -> Self {
        let b = &config.bootstrap;

        Self {
            selected_root: b.root.clone(),
            uri: b.uri.clone().unwrap_or_default(),
            quiet: b.quiet.unwrap_or(false),
            change_dir: b.change_dir.unwrap_or(true),
            required_table: b.required_table().to_string(),
        }
    }
}

///
/// SequencerState
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SequencerState {
    Pending,
    /// Every phase up to and including this one has executed.
    Complete { phase: Phase },
    Failed { phase: Phase, error: BootstrapError },
}

impl SequencerState {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

///
/// MaxOutcome
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MaxOutcome {
    pub reached: Option<Phase>,
    pub error: Option<BootstrapError>,
}

///
/// Session
///
/// What a single step sees. Borrowed from the sequencer for the duration of
/// one step call.
///

pub struct Session<'a> {
    pub phase: Phase,
    pub options: &'a BootstrapOptions,
    pub context: &'a mut BootstrapContext,
    pub server: &'a mut ServerContext,
    pub output: &'a mut OutputStack,
    pub handlers: &'a mut HandlerStack,
    pub locator: &'a dyn RootLocator,
    pub resolver: &'a dyn SiteResolver,
    pub bootstrapper: &'a mut dyn Bootstrapper,
    pub logger: &'a dyn Logger,
    table: &'a PhaseTable,
}

impl Session<'_> {
    /// Run the base layer's step for the current phase, if it has one.
    pub fn call_base(&mut self, step: Step) -> Result<(), BootstrapError> {
        match self.table.base_step(self.phase, step) {
            Some(f) => f(self),
            None => Ok(()),
        }
    }
}

///
/// Sequencer
///

pub struct Sequencer<B> {
    table: PhaseTable,
    options: BootstrapOptions,
    context: BootstrapContext,
    server: ServerContext,
    output: OutputStack,
    handlers: HandlerStack,
    locator: Box<dyn RootLocator>,
    resolver: Box<dyn SiteResolver>,
    bootstrapper: B,
    logger: Arc<dyn Logger>,
    state: SequencerState,
    trace: Vec<(Phase, Step)>,
}

impl<B: Bootstrapper> Sequencer<B> {
    pub fn builder(bootstrapper: B) -> SequencerBuilder<B> {
        SequencerBuilder::new(bootstrapper)
    }

    /// Bootstrap every phase.
    pub fn run(&mut self) -> Result<Phase, BootstrapError> {
        self.run_to(Phase::Full)
    }

    /// Bootstrap every phase not yet run, up to and including `target`.
    /// Returns the highest completed phase.
    pub fn run_to(&mut self, target: Phase) -> Result<Phase, BootstrapError> {
        let start = match &self.state {
            SequencerState::Failed { error, .. } => return Err(error.clone()),
            SequencerState::Complete { phase } if *phase >= target => return Ok(*phase),
            SequencerState::Complete { phase } => phase.next().unwrap_or(Phase::Full),
            SequencerState::Pending => Phase::Root,
        };

        for phase in target.through().filter(|p| *p >= start) {
            if let Err(error) = self.run_phase(phase) {
                log!(
                    self.logger,
                    Topic::Sequencer,
                    Error,
                    "Bootstrap failed at !phase: !error",
                    "!phase" => phase,
                    "!error" => &error,
                );
                self.state = SequencerState::Failed {
                    phase,
                    error: error.clone(),
                };

                return Err(error);
            }

            self.state = SequencerState::Complete { phase };
        }

        Ok(target)
    }

    /// Bootstrap as far as possible. The sequencer still ends up failed when
    /// a phase errors; the outcome records how far it got.
    pub fn run_max(&mut self) -> MaxOutcome {
        match self.run_to(Phase::Full) {
            Ok(phase) => MaxOutcome {
                reached: Some(phase),
                error: None,
            },
            Err(error) => MaxOutcome {
                reached: self.completed(),
                error: Some(error),
            },
        }
    }

    fn run_phase(&mut self, phase: Phase) -> Result<(), BootstrapError> {
        let started = Instant::now();
        let logger = self.logger.clone();
        let _timer = defer::defer(move || {
            log!(
                logger,
                Topic::Sequencer,
                Debug,
                "Phase !phase finished after !ms ms",
                "!phase" => phase,
                "!ms" => started.elapsed().as_millis(),
            );
        });

        for step in [Step::Validate, Step::Execute] {
            self.trace.push((phase, step));

            let Some(f) = self.table.resolve(phase, step) else {
                continue;
            };

            let mut session = Session {
                phase,
                options: &self.options,
                context: &mut self.context,
                server: &mut self.server,
                output: &mut self.output,
                handlers: &mut self.handlers,
                locator: &*self.locator,
                resolver: &*self.resolver,
                bootstrapper: &mut self.bootstrapper,
                logger: &*self.logger,
                table: &self.table,
            };

            f(&mut session)?;
        }

        Ok(())
    }

    /// Highest phase that executed successfully.
    #[must_use]
    pub fn completed(&self) -> Option<Phase> {
        match &self.state {
            SequencerState::Complete { phase } => Some(*phase),
            SequencerState::Failed { phase, .. } => Phase::ALL
                .into_iter()
                .take_while(|p| p < phase)
                .last(),
            SequencerState::Pending => None,
        }
    }

    /// Make sure the built-in log hook is registered with the application.
    pub fn add_logger(&mut self) -> bool {
        extension::add_logger(&mut self.bootstrapper)
    }

    pub fn profile(&mut self) -> Option<String> {
        if let Some(profile) = self.context.get(ContextKey::Profile) {
            return Some(profile.to_string());
        }

        self.bootstrapper.profile()
    }

    #[must_use]
    pub fn contrib_modules_paths(&self) -> [String; 2] {
        extension::contrib_modules_paths(self.context.get_or_empty(ContextKey::SiteRoot))
    }

    #[must_use]
    pub fn contrib_themes_paths(&self) -> [String; 2] {
        extension::contrib_themes_paths(self.context.get_or_empty(ContextKey::SiteRoot))
    }

    #[must_use]
    pub const fn state(&self) -> &SequencerState {
        &self.state
    }

    #[must_use]
    pub const fn context(&self) -> &BootstrapContext {
        &self.context
    }

    #[must_use]
    pub const fn options(&self) -> &BootstrapOptions {
        &self.options
    }

    #[must_use]
    pub const fn server(&self) -> &ServerContext {
        &self.server
    }

    #[must_use]
    pub const fn handlers(&self) -> &HandlerStack {
        &self.handlers
    }

    #[must_use]
    pub const fn output_depth(&self) -> usize {
        self.output.depth()
    }

    /// Every step the sequencer invoked, in order.
    #[must_use]
    pub fn trace(&self) -> &[(Phase, Step)] {
        &self.trace
    }

    #[must_use]
    pub const fn bootstrapper(&self) -> &B {
        &self.bootstrapper
    }

    pub const fn bootstrapper_mut(&mut self) -> &mut B {
        &mut self.bootstrapper
    }
}

///
/// SequencerBuilder
///

pub struct SequencerBuilder<B> {
    bootstrapper: B,
    options: BootstrapOptions,
    table: Option<PhaseTable>,
    locator: Option<Box<dyn RootLocator>>,
    resolver: Option<Box<dyn SiteResolver>>,
    logger: Option<Arc<dyn Logger>>,
    output: Option<OutputStack>,
}

impl<B: Bootstrapper> SequencerBuilder<B> {
    pub fn new(bootstrapper: B) -> Self {
        Self {
            bootstrapper,
            options: BootstrapOptions::default(),
            table: None,
            locator: None,
            resolver: None,
            logger: None,
            output: None,
        }
    }

    #[must_use]
    pub fn options(mut self, options: BootstrapOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn table(mut self, table: PhaseTable) -> Self {
        self.table = Some(table);
        self
    }

    #[must_use]
    pub fn locator(mut self, locator: impl RootLocator + 'static) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    #[must_use]
    pub fn resolver(mut self, resolver: impl SiteResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn output(mut self, output: OutputStack) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Sequencer<B> {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(ConsoleLogger::default()));

        // The tool's own handler sits at the bottom of the stack.
        let mut handlers = HandlerStack::new();
        let sink = logger.clone();
        handlers.push(TOOL_HANDLER, move |d: &Diagnostic| {
            sink.emit(d.level, Topic::Sequencer, &Message::new(d.text.clone()));
        });

        Sequencer {
            table: self.table.unwrap_or_else(PhaseTable::standard),
            options: self.options,
            context: BootstrapContext::new(),
            server: ServerContext::default(),
            output: self.output.unwrap_or_else(OutputStack::stdout),
            handlers,
            locator: self
                .locator
                .unwrap_or_else(|| Box::new(FsRootLocator::default())),
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(DirectoryScanResolver::new())),
            bootstrapper: self.bootstrapper,
            logger,
            state: SequencerState::Pending,
            trace: Vec::new(),
        }
    }
}
