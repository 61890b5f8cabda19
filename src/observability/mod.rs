//! Observability for facet computation
//!
//! Structured JSON log lines with typed events and scoped begin/complete
//! logging around a facet run. Logging never affects the outcome of the
//! operation being observed.
//!
//! ```ignore
//! use queryfacet::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::FacetCounted, &[("facet", "status"), ("rows", "4")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
