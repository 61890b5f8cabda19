//! Hook slots
//!
//! The host owns two callback slots: one that sees the generated clause
//! bundle, one that sees the assembled statement. Each slot holds at most
//! one hook. Hooks only act on counting passes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::errors::HostResult;
use super::{ClauseBundle, Row};
use crate::facet::FacetKind;

/// Identity of the facet a counting execution is for, plus the slot its
/// captured rows are written to.
#[derive(Debug)]
pub struct CountingPass {
    facet: String,
    kind: FacetKind,
    captured: RefCell<Option<Vec<Row>>>,
}

impl CountingPass {
    pub fn new(facet: impl Into<String>, kind: FacetKind) -> Self {
        Self {
            facet: facet.into(),
            kind,
            captured: RefCell::new(None),
        }
    }

    /// Name of the facet being counted
    pub fn facet(&self) -> &str {
        &self.facet
    }

    /// Kind of the facet being counted
    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// Stores captured rows, replacing any earlier capture
    pub fn capture(&self, rows: Vec<Row>) {
        *self.captured.borrow_mut() = Some(rows);
    }

    /// Takes the captured rows, if any statement was captured
    pub fn take_captured(&self) -> Option<Vec<Row>> {
        self.captured.borrow_mut().take()
    }
}

/// Called with the clause bundle before the statement is assembled
pub trait ClauseHook {
    fn rewrite(&self, clauses: &mut ClauseBundle, pass: &CountingPass);
}

/// Called with the assembled statement before it is executed
///
/// The returned statement replaces the original; an empty string
/// suppresses execution.
pub trait RequestHook {
    fn intercept(&self, statement: &str, pass: &CountingPass) -> HostResult<String>;
}

/// The two hook slots of a host
#[derive(Default)]
pub struct HookRegistry {
    clause: RefCell<Option<Rc<dyn ClauseHook>>>,
    request: RefCell<Option<Rc<dyn RequestHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the clause hook, replacing any previous one
    pub fn install_clause_hook(&self, hook: Rc<dyn ClauseHook>) {
        *self.clause.borrow_mut() = Some(hook);
    }

    /// Installs the request hook, replacing any previous one
    pub fn install_request_hook(&self, hook: Rc<dyn RequestHook>) {
        *self.request.borrow_mut() = Some(hook);
    }

    /// Removes the clause hook. Returns true if one was installed.
    pub fn remove_clause_hook(&self) -> bool {
        self.clause.borrow_mut().take().is_some()
    }

    /// Removes the request hook. Returns true if one was installed.
    pub fn remove_request_hook(&self) -> bool {
        self.request.borrow_mut().take().is_some()
    }

    pub fn clause_hook(&self) -> Option<Rc<dyn ClauseHook>> {
        self.clause.borrow().clone()
    }

    pub fn request_hook(&self) -> Option<Rc<dyn RequestHook>> {
        self.request.borrow().clone()
    }

    /// True when neither slot holds a hook
    pub fn is_clean(&self) -> bool {
        self.clause.borrow().is_none() && self.request.borrow().is_none()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("clause", &self.clause.borrow().is_some())
            .field("request", &self.request.borrow().is_some())
            .finish()
    }
}
