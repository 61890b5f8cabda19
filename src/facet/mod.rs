//! Facet computation
//!
//! A facet is a `(value, label, count)` breakdown of the posts matched by
//! a base query. Each facet is counted with every other facet's filter
//! applied but never its own, so the counts stay consistent with the
//! active selection while still showing the alternatives for that facet.
//!
//! # Components
//!
//! - [`FacetRegistry`]: ordered facet definitions
//! - [`FilterComposer`]: applies facet filters to a query
//! - [`ClauseRewriter`]: turns content clauses into grouped counting clauses
//! - [`Interceptor`] and [`HookGuard`]: capture counting rows instead of
//!   letting the host execute them
//! - [`FacetEngine`]: drives the per-facet loop and memoizes the result
//!
//! # Example
//!
//! ```ignore
//! let host = SqlHost::new(storage);
//! let mut engine = FacetEngine::new(&host, PostQuery::new().with_posts_per_page(10));
//! engine.register_column_facet("post_type", None);
//! engine.register_meta_facet("rating", Some("3".into()));
//! engine.register_taxonomy_facet("category", None);
//!
//! let facets = engine.get_facets(true)?;
//! ```

mod composer;
mod config;
mod definition;
mod engine;
mod errors;
mod interceptor;
mod registry;
mod result;
mod rewriter;

pub use composer::FilterComposer;
pub use config::{FacetConfig, FacetSpec};
pub use definition::{CustomFilter, FacetDefinition, FacetKind};
pub use engine::FacetEngine;
pub use errors::{FacetError, FacetResult};
pub use interceptor::{HookGuard, Interceptor};
pub use registry::FacetRegistry;
pub use result::{FacetResults, FacetRow};
pub use rewriter::ClauseRewriter;
