//! Vertex/edge value types, arena identifiers and defect counters.
//!
//! Kept small and explicit so `map.rs`, `neighbours.rs` and the cleanser read
//! as plain index manipulation.

use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Index into a map's vertex arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub usize);

impl VertexId {
    /// Endpoint of an edge whose vertex was removed.
    pub const NONE: VertexId = VertexId(usize::MAX);
}

/// Index into a map's edge arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub pt: Vector2<f64>,
}

/// Geometry of an edge between its two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeKind {
    Line,
    Arc { center: Vector2<f64>, convex: bool },
    Chord { center: Vector2<f64>, convex: bool },
}

impl EdgeKind {
    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, EdgeKind::Line)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub v1: VertexId,
    pub v2: VertexId,
    pub kind: EdgeKind,
}

impl Edge {
    #[inline]
    pub fn line(v1: VertexId, v2: VertexId) -> Self {
        Self {
            v1,
            v2,
            kind: EdgeKind::Line,
        }
    }
    /// Unordered endpoint pair, smaller index first.
    #[inline]
    pub fn key(&self) -> (VertexId, VertexId) {
        if self.v1 <= self.v2 {
            (self.v1, self.v2)
        } else {
            (self.v2, self.v1)
        }
    }
    #[inline]
    pub fn touches(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }
    /// The endpoint opposite `v` (or `v2` if `v` is not an endpoint).
    #[inline]
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.v1 == v {
            self.v2
        } else {
            self.v1
        }
    }
}

/// Per-invariant violation counts reported by `Map::defects`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefects {
    /// Edges referencing a vertex that is not in the map.
    pub missing_endpoints: usize,
    /// Vertex pairs closer than the map tolerance.
    pub near_vertices: usize,
    /// Edges repeating another edge's unordered endpoint pair.
    pub duplicate_edges: usize,
    /// Edges with equal or coincident endpoints.
    pub degenerate_edges: usize,
    /// Vertices with no incident edge.
    pub isolated_vertices: usize,
}

impl MapDefects {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
    #[inline]
    pub fn total(&self) -> usize {
        self.missing_endpoints
            + self.near_vertices
            + self.duplicate_edges
            + self.degenerate_edges
            + self.isolated_vertices
    }
}

impl fmt::Display for MapDefects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "consistent");
        }
        write!(
            f,
            "missing endpoints {}, near vertices {}, duplicate edges {}, degenerate edges {}, isolated vertices {}",
            self.missing_endpoints,
            self.near_vertices,
            self.duplicate_edges,
            self.degenerate_edges,
            self.isolated_vertices
        )
    }
}
