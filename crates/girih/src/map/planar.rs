//! The planar map arena: insertion, removal, merge and transforms.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geom2::{near, Aff2, Bounds, GeomCfg};

use super::types::{Edge, EdgeId, EdgeKind, Vertex, VertexId};

static GENERATION: AtomicU64 = AtomicU64::new(1);

/// Fresh generation tag; distinct across every map state in the process.
pub(super) fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Planar subdivision: dense vertex and edge arenas plus a positional tolerance.
///
/// Invariants after cleansing (see `Map::defects`):
/// - every edge endpoint exists;
/// - no two vertices are near (`|p - q|² < tolerance`);
/// - no two edges share an unordered endpoint pair;
/// - no edge is degenerate;
/// - no vertex is isolated.
///
/// Merging does not restore these; run the cleanser when inputs may overlap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    pub(super) vertices: Vec<Vertex>,
    pub(super) edges: Vec<Edge>,
    pub(super) tolerance: f64,
    #[serde(skip, default = "next_generation")]
    pub(super) generation: u64,
}

impl Default for Map {
    fn default() -> Self {
        Self::with_tolerance(GeomCfg::default().tolerance)
    }
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            tolerance,
            generation: next_generation(),
        }
    }

    #[inline]
    pub(crate) fn touch(&mut self) {
        self.generation = next_generation();
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
        self.touch();
    }
    /// Changes whenever the vertex or edge sets change.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }
    #[inline]
    pub fn position(&self, v: VertexId) -> Option<Vector2<f64>> {
        self.vertices.get(v.0).map(|x| x.pt)
    }
    #[inline]
    pub fn edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e.0)
    }
    /// Endpoint positions, `None` if either endpoint is missing.
    pub fn endpoints(&self, e: EdgeId) -> Option<(Vector2<f64>, Vector2<f64>)> {
        let edge = self.edge(e)?;
        Some((self.position(edge.v1)?, self.position(edge.v2)?))
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn find_vertex(&self, p: Vector2<f64>) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|v| near(v.pt, p, self.tolerance))
            .map(VertexId)
    }

    /// Existing vertex within tolerance, or a new one.
    pub fn insert_vertex(&mut self, p: Vector2<f64>) -> VertexId {
        if let Some(v) = self.find_vertex(p) {
            return v;
        }
        self.vertices.push(Vertex { pt: p });
        self.touch();
        VertexId(self.vertices.len() - 1)
    }

    pub fn find_edge(&self, v1: VertexId, v2: VertexId) -> Option<EdgeId> {
        let key = Edge::line(v1, v2).key();
        self.edges.iter().position(|e| e.key() == key).map(EdgeId)
    }

    /// Straight edge; see `insert_edge_kind`.
    pub fn insert_edge(&mut self, v1: VertexId, v2: VertexId) -> Option<EdgeId> {
        self.insert_edge_kind(v1, v2, EdgeKind::Line)
    }

    pub fn insert_edge_pts(&mut self, p1: Vector2<f64>, p2: Vector2<f64>) -> Option<EdgeId> {
        if near(p1, p2, self.tolerance) {
            return None;
        }
        let v1 = self.insert_vertex(p1);
        let v2 = self.insert_vertex(p2);
        self.insert_edge(v1, v2)
    }

    pub fn insert_arc(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        center: Vector2<f64>,
        convex: bool,
    ) -> Option<EdgeId> {
        self.insert_edge_kind(v1, v2, EdgeKind::Arc { center, convex })
    }

    pub fn insert_chord(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        center: Vector2<f64>,
        convex: bool,
    ) -> Option<EdgeId> {
        self.insert_edge_kind(v1, v2, EdgeKind::Chord { center, convex })
    }

    /// Append an edge unless it is degenerate (`None`) or its unordered endpoint
    /// pair already exists (existing id, no-op).
    pub fn insert_edge_kind(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        kind: EdgeKind,
    ) -> Option<EdgeId> {
        if v1 == v2 {
            return None;
        }
        let (p1, p2) = (self.position(v1)?, self.position(v2)?);
        if near(p1, p2, self.tolerance) {
            return None;
        }
        if let Some(existing) = self.find_edge(v1, v2) {
            return Some(existing);
        }
        self.edges.push(Edge { v1, v2, kind });
        self.touch();
        Some(EdgeId(self.edges.len() - 1))
    }

    /// Unconditional removal; later edge ids shift down by one.
    pub fn remove_edge(&mut self, e: EdgeId) -> Option<Edge> {
        if e.0 >= self.edges.len() {
            return None;
        }
        let edge = self.edges.remove(e.0);
        self.touch();
        Some(edge)
    }

    /// Unconditional removal. Incident edges are kept and left dangling
    /// (`VertexId::NONE`); later vertex ids shift down by one.
    pub fn remove_vertex(&mut self, v: VertexId) -> Option<Vertex> {
        if v.0 >= self.vertices.len() {
            return None;
        }
        let vertex = self.vertices[v.0];
        let mut doomed = vec![false; self.vertices.len()];
        doomed[v.0] = true;
        self.remove_vertices(&doomed);
        Some(vertex)
    }

    /// Batch removal by mask; returns how many vertices were dropped.
    /// Edges pointing at removed vertices become dangling.
    pub(crate) fn remove_vertices(&mut self, doomed: &[bool]) -> usize {
        debug_assert_eq!(doomed.len(), self.vertices.len());
        let mut new_index = vec![VertexId::NONE; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, v) in self.vertices.iter().enumerate() {
            if !doomed.get(i).copied().unwrap_or(false) {
                new_index[i] = VertexId(kept.len());
                kept.push(*v);
            }
        }
        let removed = self.vertices.len() - kept.len();
        if removed == 0 {
            return 0;
        }
        let lookup = |v: VertexId| new_index.get(v.0).copied().unwrap_or(VertexId::NONE);
        for e in &mut self.edges {
            e.v1 = lookup(e.v1);
            e.v2 = lookup(e.v2);
        }
        self.vertices = kept;
        self.touch();
        removed
    }

    /// Rewrite every edge endpoint `v` to `target[v]`, then drop the vertices
    /// that were redirected elsewhere. `target[i] == i` keeps vertex `i`.
    pub(crate) fn redirect_vertices(&mut self, target: &[usize]) -> usize {
        debug_assert_eq!(target.len(), self.vertices.len());
        for e in &mut self.edges {
            if let Some(&t) = target.get(e.v1.0) {
                e.v1 = VertexId(t);
            }
            if let Some(&t) = target.get(e.v2.0) {
                e.v2 = VertexId(t);
            }
        }
        let doomed: Vec<bool> = target.iter().enumerate().map(|(i, &t)| t != i).collect();
        let removed = self.remove_vertices(&doomed);
        if removed == 0 {
            self.touch();
        }
        removed
    }

    /// Keep edges for which `keep` returns true; returns how many were dropped.
    pub(crate) fn retain_edges<F: FnMut(EdgeId, &Edge) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.edges.len();
        let mut idx = 0usize;
        self.edges.retain(|e| {
            let k = keep(EdgeId(idx), e);
            idx += 1;
            k
        });
        let removed = before - self.edges.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Append without any checks (used by splitting passes that guarantee validity).
    pub(crate) fn push_edge_unchecked(&mut self, edge: Edge) -> EdgeId {
        self.edges.push(edge);
        self.touch();
        EdgeId(self.edges.len() - 1)
    }

    /// Swap in a rebuilt edge list (crop and split passes).
    pub(crate) fn replace_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
        self.touch();
    }

    pub(crate) fn push_vertex_unchecked(&mut self, p: Vector2<f64>) -> VertexId {
        self.vertices.push(Vertex { pt: p });
        self.touch();
        VertexId(self.vertices.len() - 1)
    }

    /// Append `other` verbatim (indices offset). No deduplication.
    pub fn merge_map(&mut self, other: &Map) {
        self.append_transformed(other, None);
    }

    /// Merge a transformed copy of `other` for each placement.
    pub fn merge_many(&mut self, other: &Map, placements: &[Aff2]) {
        self.vertices.reserve(other.vertices.len() * placements.len());
        self.edges.reserve(other.edges.len() * placements.len());
        for p in placements {
            self.append_transformed(other, Some(p));
        }
    }

    fn append_transformed(&mut self, other: &Map, f: Option<&Aff2>) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices.iter().map(|v| Vertex {
            pt: f.map_or(v.pt, |f| f.apply(v.pt)),
        }));
        let shift = |v: VertexId| {
            if v == VertexId::NONE {
                v
            } else {
                VertexId(v.0 + offset)
            }
        };
        self.edges.extend(other.edges.iter().map(|e| Edge {
            v1: shift(e.v1),
            v2: shift(e.v2),
            kind: f.map_or(e.kind, |f| transform_kind(e.kind, f)),
        }));
        self.touch();
    }

    pub fn transform(&mut self, f: &Aff2) {
        for v in &mut self.vertices {
            v.pt = f.apply(v.pt);
        }
        for e in &mut self.edges {
            e.kind = transform_kind(e.kind, f);
        }
        self.touch();
    }

    pub fn transformed(&self, f: &Aff2) -> Map {
        let mut out = self.clone();
        out.transform(f);
        out
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().map(|v| v.pt))
    }

    /// Incident edge count per vertex (dangling endpoints ignored).
    pub fn degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.vertices.len()];
        for e in &self.edges {
            for v in [e.v1, e.v2] {
                if let Some(d) = deg.get_mut(v.0) {
                    *d += 1;
                }
            }
        }
        deg
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.touch();
    }
}

fn transform_kind(kind: EdgeKind, f: &Aff2) -> EdgeKind {
    let flip = !f.is_orientation_preserving();
    match kind {
        EdgeKind::Line => EdgeKind::Line,
        EdgeKind::Arc { center, convex } => EdgeKind::Arc {
            center: f.apply(center),
            convex: convex != flip,
        },
        EdgeKind::Chord { center, convex } => EdgeKind::Chord {
            center: f.apply(center),
            convex: convex != flip,
        },
    }
}
