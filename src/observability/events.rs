//! Observable facet events

use std::fmt;

use super::logger::Severity;

/// Events emitted while computing facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Counting hooks installed on the host
    HooksInstalled,
    /// Counting hooks removed from the host
    HooksRemoved,
    /// One facet's rows captured
    FacetCounted,
    /// Facet filters applied to the original query
    FiltersApplied,
    /// Memoized facets returned without executing anything
    CacheHit,
    /// Facet configuration loaded
    ConfigLoaded,
    /// A filter clause the host could not render was dropped
    ClauseSkipped,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::HooksInstalled => "FACET_HOOKS_INSTALLED",
            Event::HooksRemoved => "FACET_HOOKS_REMOVED",
            Event::FacetCounted => "FACET_COUNTED",
            Event::FiltersApplied => "FACET_FILTERS_APPLIED",
            Event::CacheHit => "FACET_CACHE_HIT",
            Event::ConfigLoaded => "FACET_CONFIG_LOADED",
            Event::ClauseSkipped => "FACET_CLAUSE_SKIPPED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::HooksInstalled | Event::HooksRemoved | Event::FacetCounted => Severity::Trace,
            Event::ClauseSkipped => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_prefixed() {
        let events = [
            Event::HooksInstalled,
            Event::HooksRemoved,
            Event::FacetCounted,
            Event::FiltersApplied,
            Event::CacheHit,
            Event::ConfigLoaded,
            Event::ClauseSkipped,
        ];
        for event in events {
            assert!(event.as_str().starts_with("FACET_"), "{}", event);
        }
    }

    #[test]
    fn test_skipped_clause_is_a_warning() {
        assert_eq!(Event::ClauseSkipped.severity(), Severity::Warn);
        assert_eq!(Event::FacetCounted.severity(), Severity::Trace);
    }
}
