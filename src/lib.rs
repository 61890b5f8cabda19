//! queryfacet - facet counts for filtered content queries
//!
//! Computes value/count breakdowns for a search, each facet counted with
//! every other active facet filter but not its own.

pub mod facet;
pub mod host;
pub mod observability;

pub use facet::{
    FacetDefinition, FacetEngine, FacetError, FacetKind, FacetResult, FacetResults, FacetRow,
};
