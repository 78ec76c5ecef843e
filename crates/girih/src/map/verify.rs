//! Invariant checks, self-repair and canonical ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::cleanse::{cleanse, CleanseFlags};
use crate::geom2::near;

use super::planar::Map;
use super::types::{MapDefects, VertexId};

impl Map {
    /// Count violations of every map invariant.
    pub fn defects(&self) -> MapDefects {
        let mut d = MapDefects::default();
        let mut seen = HashSet::with_capacity(self.edges.len());
        for e in &self.edges {
            match (self.position(e.v1), self.position(e.v2)) {
                (Some(p1), Some(p2)) => {
                    if e.v1 == e.v2 || near(p1, p2, self.tolerance) {
                        d.degenerate_edges += 1;
                    } else if !seen.insert(e.key()) {
                        d.duplicate_edges += 1;
                    }
                }
                _ => d.missing_endpoints += 1,
            }
        }
        d.near_vertices = self.near_vertex_pairs(self.tolerance).len();
        d.isolated_vertices = self.degrees().iter().filter(|&&k| k == 0).count();
        d
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.defects().is_clean()
    }

    /// Check invariants; with `fix`, cleanse with `CleanseFlags::VERIFY_FIX` and
    /// check again. Returns whether the map is consistent afterwards.
    pub fn verify(&mut self, fix: bool) -> bool {
        let defects = self.defects();
        if defects.is_clean() {
            return true;
        }
        debug!(%defects, fix, "map verify found defects");
        if !fix {
            return false;
        }
        let tolerance = self.tolerance;
        cleanse(self, CleanseFlags::VERIFY_FIX, tolerance);
        let after = self.defects();
        if !after.is_clean() {
            warn!(defects = %after, "map still inconsistent after repair");
        }
        after.is_clean()
    }

    /// One-line diagnostic for UI warnings and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} vertices, {} edges ({})",
            self.num_vertices(),
            self.num_edges(),
            self.defects()
        )
    }

    /// All vertex pairs `(i, j)`, `i < j`, with `|p_i - p_j|² < tolerance`,
    /// in lexicographic order. Sweep over x keeps this near-linear for sparse maps.
    pub(crate) fn near_vertex_pairs(&self, tolerance: f64) -> Vec<(usize, usize)> {
        let mut order: Vec<usize> = (0..self.vertices.len()).collect();
        order.sort_by(|&a, &b| self.vertices[a].pt.x.total_cmp(&self.vertices[b].pt.x));
        let mut pairs = Vec::new();
        for (k, &i) in order.iter().enumerate() {
            let pi = self.vertices[i].pt;
            for &j in &order[k + 1..] {
                let pj = self.vertices[j].pt;
                let dx = pj.x - pi.x;
                if dx * dx >= tolerance {
                    break;
                }
                if near(pi, pj, tolerance) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Order vertices by position (x, then y) and rewrite edge endpoints.
    pub fn sort_vertices(&mut self) {
        let mut order: Vec<usize> = (0..self.vertices.len()).collect();
        order.sort_by(|&a, &b| cmp_points(self.vertices[a].pt, self.vertices[b].pt));
        let mut new_index = vec![0usize; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        self.vertices = order.iter().map(|&i| self.vertices[i]).collect();
        for e in &mut self.edges {
            for v in [&mut e.v1, &mut e.v2] {
                if let Some(&n) = new_index.get(v.0) {
                    *v = VertexId(n);
                }
            }
        }
        self.touch();
    }

    /// Order edges by their unordered endpoint pair.
    pub fn sort_edges(&mut self) {
        self.edges.sort_by_key(|e| e.key());
        self.touch();
    }

    /// Canonical order: structurally identical maps compare equal afterwards.
    pub fn sort(&mut self) {
        self.sort_vertices();
        self.sort_edges();
    }
}

fn cmp_points(a: nalgebra::Vector2<f64>, b: nalgebra::Vector2<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
