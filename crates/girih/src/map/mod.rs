//! Planar map: vertices and edges embedded in the plane.
//!
//! Purpose
//! - Own the pattern line-art as two dense arenas (`Vec<Vertex>`, `Vec<Edge>`);
//!   edges reference vertices by `VertexId`, never by pointer.
//! - Provide insertion, removal, merge-under-placements and self-verification
//!   primitives used by the cleanser, crop, motif construction and prototypes.
//!
//! Notes
//! - Every mutation bumps `Map::generation`. A `NeighbourMap` built for an
//!   older generation refuses to answer instead of returning stale adjacency.
//! - Merges append without deduplication; callers run the cleanser when the
//!   merged pieces may overlap.
//!
//! Code cross-refs: `cleanse::{cleanse, CleanseFlags}`, `prototype::Prototype`

mod neighbours;
mod planar;
mod types;
mod verify;

pub use neighbours::NeighbourMap;
pub use planar::Map;
pub use types::{Edge, EdgeId, EdgeKind, MapDefects, Vertex, VertexId};

#[cfg(test)]
mod tests;
