//! Raw ticket records as supplied by the ticket source.
//!
//! The source provider owns storage and file formats; the engine only
//! requires records in this shape. Dependency declarations come in two
//! flavors: a flat id list (legacy shorthand, all treated as blocking) or a
//! structured object with per-category lists.

use serde::{Deserialize, Serialize};

/// One unparsed ticket as handed over by the ticket source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTicketRecord {
    /// Stable ticket identifier
    pub id: String,

    /// Ticket title
    #[serde(default)]
    pub title: String,

    /// Dependency declaration, flat or structured
    #[serde(default)]
    pub dependencies: RawDependencies,

    /// Priority name (`critical`/`high`/`medium`/`low`)
    #[serde(default)]
    pub priority: Option<String>,

    /// Free-text body carrying file references and resource hints
    #[serde(default)]
    pub body: String,

    /// Free-text effort field, e.g. `"3 hours"` or `"1.5h"`
    #[serde(default)]
    pub effort: Option<String>,
}

/// Dependency declaration of a raw record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDependencies {
    /// Legacy shorthand: a flat list of ids, all blocking
    Flat(Vec<String>),

    /// Structured per-category lists
    Structured {
        /// Hard ordering dependencies
        #[serde(default)]
        blocking: Vec<String>,
        /// Soft-but-ordered dependencies
        #[serde(default)]
        sequential: Vec<String>,
        /// Advisory relationships
        #[serde(default)]
        soft: Vec<String>,
    },
}

impl Default for RawDependencies {
    fn default() -> Self {
        RawDependencies::Flat(Vec::new())
    }
}
