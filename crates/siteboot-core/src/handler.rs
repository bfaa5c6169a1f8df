//! Diagnostic handler stack.
//!
//! The application bootstrapper installs its own handler while it runs and
//! never removes it. Callers open a [`HandlerScope`] before delegating; the
//! scope truncates the stack back to its starting depth on drop, which puts
//! the tool's handler back on top.

use crate::log::Level;
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

///
/// Diagnostic
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub text: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

type HandlerFn = Box<dyn FnMut(&Diagnostic)>;

struct Handler {
    owner: String,
    func: HandlerFn,
}

///
/// HandlerStack
///

#[derive(Default)]
pub struct HandlerStack {
    handlers: Vec<Handler>,
}

impl HandlerStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, owner: impl Into<String>, func: impl FnMut(&Diagnostic) + 'static) {
        self.handlers.push(Handler {
            owner: owner.into(),
            func: Box::new(func),
        });
    }

    /// Remove the top handler, returning its owner.
    pub fn pop(&mut self) -> Option<String> {
        self.handlers.pop().map(|h| h.owner)
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.handlers.len()
    }

    /// Owner of the handler currently on top.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.handlers.last().map(|h| h.owner.as_str())
    }

    /// Route a diagnostic to the active handler. Returns false when the
    /// stack is empty.
    pub fn report(&mut self, diagnostic: &Diagnostic) -> bool {
        match self.handlers.last_mut() {
            Some(handler) => {
                (handler.func)(diagnostic);
                true
            }
            None => false,
        }
    }

    pub fn scope(&mut self) -> HandlerScope<'_> {
        let depth = self.handlers.len();

        HandlerScope { stack: self, depth }
    }

    fn truncate(&mut self, depth: usize) {
        self.handlers.truncate(depth);
    }
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| &h.owner))
            .finish()
    }
}

///
/// HandlerScope
///

pub struct HandlerScope<'a> {
    stack: &'a mut HandlerStack,
    depth: usize,
}

impl Deref for HandlerScope<'_> {
    type Target = HandlerStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for HandlerScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for HandlerScope<'_> {
    fn drop(&mut self) {
        self.stack.truncate(self.depth);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn report_goes_to_top_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stack = HandlerStack::new();

        let sink = seen.clone();
        stack.push("siteboot", move |d| sink.borrow_mut().push(format!("tool:{}", d.text)));
        let sink = seen.clone();
        stack.push("app", move |d| sink.borrow_mut().push(format!("app:{}", d.text)));

        assert!(stack.report(&Diagnostic::new(Level::Warn, "undefined index")));
        assert_eq!(seen.borrow().as_slice(), ["app:undefined index"]);
    }

    #[test]
    fn scope_restores_previous_handler() {
        let mut stack = HandlerStack::new();
        stack.push("siteboot", |_| {});

        {
            let mut scope = stack.scope();
            scope.push("app", |_| {});
            scope.push("app-shutdown", |_| {});
            assert_eq!(scope.active(), Some("app-shutdown"));
        }

        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.active(), Some("siteboot"));
    }

    #[test]
    fn empty_stack_reports_nothing() {
        let mut stack = HandlerStack::new();

        assert!(!stack.report(&Diagnostic::new(Level::Error, "boom")));
        assert_eq!(stack.pop(), None);
    }
}
