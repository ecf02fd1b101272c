//! Graph layer - ticket graph construction and analysis.
//!
//! Raw ticket records become a normalized [`TicketGraph`], conflicts are
//! inferred from shared files and resources, and dependency cycles are
//! detected. Everything here is a synchronous, in-memory computation.

#![warn(missing_docs)]

pub mod builder;
pub mod conflict;
pub mod cycle;
pub mod graph;

pub use builder::{BuiltGraph, GraphBuilder};
pub use conflict::ConflictAnalyzer;
pub use cycle::CycleDetector;
pub use graph::TicketGraph;
