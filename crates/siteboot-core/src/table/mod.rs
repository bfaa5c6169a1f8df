//! Phase step tables.
//!
//! Steps are looked up in two layers: the application overlay first, then
//! the generic base. An overlay step that wants the generic behavior as well
//! calls [`Session::call_base`] explicitly.

pub mod backdrop;
pub mod base;

use crate::{
    error::BootstrapError,
    phase::{Phase, Step},
    sequencer::Session,
};
use std::{collections::BTreeMap, fmt};

pub type StepFn = fn(&mut Session<'_>) -> Result<(), BootstrapError>;

///
/// PhaseSteps
///

#[derive(Clone, Copy, Default)]
pub struct PhaseSteps {
    pub validate: Option<StepFn>,
    pub execute: Option<StepFn>,
}

impl PhaseSteps {
    const fn get(&self, step: Step) -> Option<StepFn> {
        match step {
            Step::Validate => self.validate,
            Step::Execute => self.execute,
        }
    }

    const fn set(&mut self, step: Step, f: StepFn) {
        match step {
            Step::Validate => self.validate = Some(f),
            Step::Execute => self.execute = Some(f),
        }
    }
}

///
/// PhaseLayer
///

#[derive(Clone, Default)]
pub struct PhaseLayer {
    steps: BTreeMap<Phase, PhaseSteps>,
}

impl PhaseLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, phase: Phase, step: Step, f: StepFn) -> Self {
        self.steps.entry(phase).or_default().set(step, f);
        self
    }

    #[must_use]
    pub fn get(&self, phase: Phase, step: Step) -> Option<StepFn> {
        self.steps.get(&phase).and_then(|steps| steps.get(step))
    }

    #[must_use]
    pub fn defines(&self, phase: Phase, step: Step) -> bool {
        self.get(phase, step).is_some()
    }
}

impl fmt::Debug for PhaseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (phase, steps) in &self.steps {
            if steps.validate.is_some() {
                list.entry(&format_args!("{phase}.validate"));
            }
            if steps.execute.is_some() {
                list.entry(&format_args!("{phase}.execute"));
            }
        }
        list.finish()
    }
}

///
/// PhaseTable
///

#[derive(Clone, Debug, Default)]
pub struct PhaseTable {
    base: PhaseLayer,
    overlay: PhaseLayer,
}

impl PhaseTable {
    #[must_use]
    pub const fn new(base: PhaseLayer, overlay: PhaseLayer) -> Self {
        Self { base, overlay }
    }

    /// Generic base layer with the Backdrop overlay on top.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(base::layer(), backdrop::layer())
    }

    /// Overlay step if defined, else base step.
    #[must_use]
    pub fn resolve(&self, phase: Phase, step: Step) -> Option<StepFn> {
        self.overlay
            .get(phase, step)
            .or_else(|| self.base.get(phase, step))
    }

    #[must_use]
    pub fn base_step(&self, phase: Phase, step: Step) -> Option<StepFn> {
        self.base.get(phase, step)
    }

    #[must_use]
    pub const fn base(&self) -> &PhaseLayer {
        &self.base
    }

    #[must_use]
    pub const fn overlay(&self) -> &PhaseLayer {
        &self.overlay
    }
}

///
/// TESTS
///
