//! Execution interception
//!
//! While a [`HookGuard`] is alive, counting passes executed by the host
//! have their clauses rewritten and their statement run directly against
//! storage. The captured rows go into the pass and the host receives an
//! empty statement, so it executes nothing itself.

use std::rc::Rc;

use super::rewriter::ClauseRewriter;
use crate::host::{
    ClauseBundle, ClauseHook, CountingPass, HookRegistry, HostResult, RequestHook, Storage,
};
use crate::observability::{log_event, log_event_with_fields, Event};

/// Hook implementation for both slots
pub struct Interceptor {
    storage: Rc<dyn Storage>,
}

impl Interceptor {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self { storage }
    }
}

impl ClauseHook for Interceptor {
    fn rewrite(&self, clauses: &mut ClauseBundle, pass: &CountingPass) {
        ClauseRewriter::new(self.storage.as_ref()).rewrite(clauses, pass.facet(), pass.kind());
    }
}

impl RequestHook for Interceptor {
    fn intercept(&self, statement: &str, pass: &CountingPass) -> HostResult<String> {
        let rows = self.storage.run_statement(statement)?;
        let row_count = rows.len().to_string();
        log_event_with_fields(
            Event::FacetCounted,
            &[
                ("facet", pass.facet()),
                ("rows", row_count.as_str()),
                ("statement", statement),
            ],
        );
        pass.capture(rows);
        Ok(String::new())
    }
}

/// Installs the interceptor in both slots; removes both on drop
///
/// Dropping happens on every exit path, so an error or panic while the
/// guard is alive never leaves hooks installed on the host.
pub struct HookGuard<'h> {
    hooks: &'h HookRegistry,
}

impl<'h> HookGuard<'h> {
    pub fn install(hooks: &'h HookRegistry, interceptor: Rc<Interceptor>) -> Self {
        hooks.install_request_hook(interceptor.clone());
        hooks.install_clause_hook(interceptor);
        log_event(Event::HooksInstalled);
        Self { hooks }
    }
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        self.hooks.remove_clause_hook();
        self.hooks.remove_request_hook();
        log_event(Event::HooksRemoved);
    }
}
