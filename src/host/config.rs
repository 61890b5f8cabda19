//! Host table configuration
//!
//! Names of the content, meta and taxonomy tables the generated clauses
//! refer to. Every name is qualified with the configured prefix.

use serde::{Deserialize, Serialize};

/// Table names used when generating and rewriting clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    /// Prefix prepended to every table (default: "wp_")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Content table (default: "posts")
    #[serde(default = "default_posts")]
    pub posts: String,

    /// Meta attribute table (default: "postmeta")
    #[serde(default = "default_postmeta")]
    pub postmeta: String,

    /// Object to term link table (default: "term_relationships")
    #[serde(default = "default_term_relationships")]
    pub term_relationships: String,

    /// Term to taxonomy link table (default: "term_taxonomy")
    #[serde(default = "default_term_taxonomy")]
    pub term_taxonomy: String,

    /// Terms table (default: "terms")
    #[serde(default = "default_terms")]
    pub terms: String,
}

fn default_prefix() -> String {
    "wp_".to_string()
}

fn default_posts() -> String {
    "posts".to_string()
}

fn default_postmeta() -> String {
    "postmeta".to_string()
}

fn default_term_relationships() -> String {
    "term_relationships".to_string()
}

fn default_term_taxonomy() -> String {
    "term_taxonomy".to_string()
}

fn default_terms() -> String {
    "terms".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            posts: default_posts(),
            postmeta: default_postmeta(),
            term_relationships: default_term_relationships(),
            term_taxonomy: default_term_taxonomy(),
            terms: default_terms(),
        }
    }
}

impl TableNames {
    /// Default names with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    fn qualified(&self, table: &str) -> String {
        format!("{}{}", self.prefix, table)
    }

    pub fn posts(&self) -> String {
        self.qualified(&self.posts)
    }

    pub fn postmeta(&self) -> String {
        self.qualified(&self.postmeta)
    }

    pub fn term_relationships(&self) -> String {
        self.qualified(&self.term_relationships)
    }

    pub fn term_taxonomy(&self) -> String {
        self.qualified(&self.term_taxonomy)
    }

    pub fn terms(&self) -> String {
        self.qualified(&self.terms)
    }
}
