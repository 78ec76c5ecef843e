//! Derived vertex → incident-edge index, tagged with the map generation.
//!
//! Neighbours are listed in edge insertion order, not by angle. The index is
//! never authoritative: once the map mutates, queries return `None` until the
//! index is rebuilt (`refresh`).

use super::planar::Map;
use super::types::{EdgeId, VertexId};

#[derive(Clone, Debug)]
pub struct NeighbourMap {
    generation: u64,
    adj: Vec<Vec<EdgeId>>,
}

impl NeighbourMap {
    /// O(E) build against the current map state.
    pub fn new(map: &Map) -> Self {
        let mut adj: Vec<Vec<EdgeId>> = vec![Vec::new(); map.num_vertices()];
        for (i, e) in map.edges().iter().enumerate() {
            if let Some(list) = adj.get_mut(e.v1.0) {
                list.push(EdgeId(i));
            }
            if e.v2 != e.v1 {
                if let Some(list) = adj.get_mut(e.v2.0) {
                    list.push(EdgeId(i));
                }
            }
        }
        Self {
            generation: map.generation(),
            adj,
        }
    }

    #[inline]
    pub fn is_current(&self, map: &Map) -> bool {
        self.generation == map.generation()
    }

    /// Rebuild if the map changed since this index was built.
    pub fn refresh(&mut self, map: &Map) {
        if !self.is_current(map) {
            *self = Self::new(map);
        }
    }

    /// Incident edges of `v`, or `None` if the index is stale or `v` unknown.
    pub fn neighbours(&self, map: &Map, v: VertexId) -> Option<&[EdgeId]> {
        debug_assert!(
            self.is_current(map),
            "stale NeighbourMap queried (built {}, map at {})",
            self.generation,
            map.generation()
        );
        if !self.is_current(map) {
            return None;
        }
        self.adj.get(v.0).map(|l| l.as_slice())
    }

    #[inline]
    pub fn degree(&self, map: &Map, v: VertexId) -> Option<usize> {
        self.neighbours(map, v).map(|l| l.len())
    }

    /// Neighbouring vertices of `v` in the same order as `neighbours`.
    pub fn adjacent_vertices(&self, map: &Map, v: VertexId) -> Option<Vec<VertexId>> {
        let list = self.neighbours(map, v)?;
        Some(
            list.iter()
                .filter_map(|&e| map.edge(e).map(|edge| edge.other(v)))
                .collect(),
        )
    }
}
