//! Data model for service area analysis
//!
//! Contains types and structures for representing a street network.

pub mod streets;

// Re-export of basic types for convenience
pub use streets::network::{IndexedPoint, StreetGraph, StreetGraphBuilder};
pub use streets::{StreetEdge, StreetNode};
