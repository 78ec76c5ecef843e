//! Crop regions: embed a boundary into a map and clip geometry outside it.
//!
//! Purpose
//! - `embed` splits every straight edge where it crosses the region boundary
//!   and inserts the boundary itself (rectangle sides or circular arcs).
//! - `apply` clips straight edges to the region, drops curved edges that leave
//!   it and removes the vertices left outside or isolated.
//!
//! Conventions
//! - The two steps are independent; when both are requested `embed` runs
//!   first so the clipped map keeps a closed outline.
//! - Circle boundaries are stored as `EdgeKind::Arc { convex: true }`, running
//!   counterclockwise from `v1` to `v2` about the centre.
//!
//! Code cross-refs: `prototype::Prototype`, `geom2::segment_intersection`

use std::f64::consts::TAU;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geom2::{distance_to_segment, segment_intersection, GeomCfg};
use crate::map::{Edge, EdgeKind, Map, VertexId};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CropRegion {
    Rect { min: Vector2<f64>, max: Vector2<f64> },
    Circle { center: Vector2<f64>, radius: f64 },
}

impl CropRegion {
    /// Axis-aligned rectangle spanned by two opposite corners.
    pub fn rect(a: Vector2<f64>, b: Vector2<f64>) -> Self {
        CropRegion::Rect {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    pub fn circle(center: Vector2<f64>, radius: f64) -> Self {
        CropRegion::Circle {
            center,
            radius: radius.abs(),
        }
    }

    /// Inside or within `slack` (a distance) of the boundary.
    pub fn contains(&self, p: Vector2<f64>, slack: f64) -> bool {
        match *self {
            CropRegion::Rect { min, max } => {
                p.x >= min.x - slack
                    && p.x <= max.x + slack
                    && p.y >= min.y - slack
                    && p.y <= max.y + slack
            }
            CropRegion::Circle { center, radius } => (p - center).norm() <= radius + slack,
        }
    }

    pub fn on_boundary(&self, p: Vector2<f64>, slack: f64) -> bool {
        match *self {
            CropRegion::Rect { .. } => {
                let c = self.rect_corners();
                (0..4).any(|k| distance_to_segment(p, c[k], c[(k + 1) % 4]) < slack)
            }
            CropRegion::Circle { center, radius } => ((p - center).norm() - radius).abs() < slack,
        }
    }

    fn rect_corners(&self) -> [Vector2<f64>; 4] {
        match *self {
            CropRegion::Rect { min, max } => [
                min,
                Vector2::new(max.x, min.y),
                max,
                Vector2::new(min.x, max.y),
            ],
            CropRegion::Circle { center, .. } => [center; 4],
        }
    }

    /// Parameters in `(0, 1)` where `a→b` crosses the boundary, sorted.
    fn crossings(&self, a: Vector2<f64>, b: Vector2<f64>, cfg: GeomCfg) -> Vec<f64> {
        let eps = cfg.eps_param;
        let mut ts: Vec<f64> = match *self {
            CropRegion::Rect { .. } => {
                let c = self.rect_corners();
                (0..4)
                    .filter_map(|k| segment_intersection(a, b, c[k], c[(k + 1) % 4], cfg))
                    .map(|x| x.t)
                    .collect()
            }
            CropRegion::Circle { center, radius } => circle_roots(a, b, center, radius)
                .map(|(t0, t1)| vec![t0, t1])
                .unwrap_or_default(),
        };
        ts.retain(|&t| t > eps && t < 1.0 - eps);
        ts.sort_by(f64::total_cmp);
        ts.dedup_by(|x, y| (*x - *y).abs() <= eps);
        ts
    }

    /// Parameter interval of `a→b` inside the region, if it has length.
    fn clip(&self, a: Vector2<f64>, b: Vector2<f64>, eps: f64) -> Option<(f64, f64)> {
        let (t0, t1) = match *self {
            CropRegion::Rect { min, max } => liang_barsky(a, b, min, max)?,
            CropRegion::Circle { center, radius } => {
                let (r0, r1) = circle_roots(a, b, center, radius)?;
                (r0.max(0.0), r1.min(1.0))
            }
        };
        (t1 - t0 > eps).then_some((t0, t1))
    }
}

fn liang_barsky(
    a: Vector2<f64>,
    b: Vector2<f64>,
    min: Vector2<f64>,
    max: Vector2<f64>,
) -> Option<(f64, f64)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Line parameters where `a + t (b - a)` meets the circle, ascending.
fn circle_roots(
    a: Vector2<f64>,
    b: Vector2<f64>,
    center: Vector2<f64>,
    radius: f64,
) -> Option<(f64, f64)> {
    let d = b - a;
    let f = a - center;
    let qa = d.norm_squared();
    if qa <= 0.0 {
        return None;
    }
    let qb = 2.0 * d.dot(&f);
    let qc = f.norm_squared() - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc <= 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some(((-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)))
}

/// Crop step of a prototype build.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub region: CropRegion,
    /// Insert the region boundary into the map.
    #[serde(default)]
    pub embed: bool,
    /// Remove geometry outside the region.
    #[serde(default = "default_apply")]
    pub apply: bool,
}

fn default_apply() -> bool {
    true
}

impl Crop {
    /// Clip-only crop.
    pub fn new(region: CropRegion) -> Self {
        Self {
            region,
            embed: false,
            apply: true,
        }
    }

    pub fn with_embed(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }

    pub fn with_apply(mut self, apply: bool) -> Self {
        self.apply = apply;
        self
    }

    /// Embed then apply, as selected.
    pub fn run(&self, map: &mut Map, cfg: GeomCfg) {
        if self.embed {
            self.embed(map, cfg);
        }
        if self.apply {
            self.apply(map, cfg);
        }
    }

    /// Split crossing edges at the boundary and insert the boundary edges.
    /// Returns the number of boundary edges added.
    pub fn embed(&self, map: &mut Map, cfg: GeomCfg) -> usize {
        let before = map.num_edges();
        let old = map.edges().to_vec();
        let mut rebuilt = Vec::with_capacity(old.len());
        let mut splits = 0usize;
        for e in old {
            let (Some(a), Some(b)) = (map.position(e.v1), map.position(e.v2)) else {
                rebuilt.push(e);
                continue;
            };
            if !e.kind.is_line() {
                rebuilt.push(e);
                continue;
            }
            let ts = self.region.crossings(a, b, cfg);
            if ts.is_empty() {
                rebuilt.push(e);
                continue;
            }
            splits += ts.len();
            let mut prev = e.v1;
            for t in ts {
                let v = map.insert_vertex(a + (b - a) * t);
                if v != prev {
                    rebuilt.push(Edge::line(prev, v));
                }
                prev = v;
            }
            if prev != e.v2 {
                rebuilt.push(Edge::line(prev, e.v2));
            }
        }
        map.replace_edges(rebuilt);
        let after_split = map.num_edges();

        let slack = cfg.tolerance.sqrt();
        match self.region {
            CropRegion::Rect { .. } => self.embed_rect(map, slack),
            CropRegion::Circle { center, radius } => embed_circle(map, center, radius, slack),
        }
        let added = map.num_edges() - after_split;
        debug!(
            splits,
            boundary_edges = added,
            edges = format_args!("{before} -> {}", map.num_edges()),
            "crop embed"
        );
        added
    }

    fn embed_rect(&self, map: &mut Map, slack: f64) {
        let corners = self.region.rect_corners();
        for &c in &corners {
            map.insert_vertex(c);
        }
        for k in 0..4 {
            let (a, b) = (corners[k], corners[(k + 1) % 4]);
            let dir = b - a;
            let len2 = dir.norm_squared();
            if len2 <= 0.0 {
                continue;
            }
            let mut on_side: Vec<(f64, VertexId)> = map
                .vertex_ids()
                .filter_map(|v| {
                    let p = map.position(v)?;
                    (distance_to_segment(p, a, b) < slack).then(|| ((p - a).dot(&dir) / len2, v))
                })
                .collect();
            on_side.sort_by(|x, y| x.0.total_cmp(&y.0));
            for w in on_side.windows(2) {
                map.insert_edge(w[0].1, w[1].1);
            }
        }
    }

    /// Clip to the region. Returns the number of edges dropped or shortened.
    pub fn apply(&self, map: &mut Map, cfg: GeomCfg) -> usize {
        let slack = cfg.tolerance.sqrt();
        let eps = cfg.eps_param;
        let old = map.edges().to_vec();
        let mut kept = Vec::with_capacity(old.len());
        let mut touched = 0usize;
        for e in old {
            let (Some(a), Some(b)) = (map.position(e.v1), map.position(e.v2)) else {
                kept.push(e);
                continue;
            };
            if !e.kind.is_line() {
                if self.region.contains(a, slack) && self.region.contains(b, slack) {
                    kept.push(e);
                } else {
                    touched += 1;
                }
                continue;
            }
            let Some((t0, t1)) = self.region.clip(a, b, eps) else {
                touched += 1;
                continue;
            };
            if t0 <= eps && t1 >= 1.0 - eps {
                kept.push(e);
                continue;
            }
            touched += 1;
            let v1 = if t0 <= eps {
                e.v1
            } else {
                map.insert_vertex(a + (b - a) * t0)
            };
            let v2 = if t1 >= 1.0 - eps {
                e.v2
            } else {
                map.insert_vertex(a + (b - a) * t1)
            };
            if v1 != v2 {
                kept.push(Edge::line(v1, v2));
            }
        }
        map.replace_edges(kept);

        let outside: Vec<bool> = map
            .vertices()
            .iter()
            .map(|v| !self.region.contains(v.pt, slack))
            .collect();
        let mut removed = map.remove_vertices(&outside);
        // Dangling edges cannot be clipped.
        map.retain_edges(|_, e| e.v1 != VertexId::NONE && e.v2 != VertexId::NONE);
        let isolated: Vec<bool> = map.degrees().iter().map(|&d| d == 0).collect();
        removed += map.remove_vertices(&isolated);
        debug!(clipped = touched, removed_vertices = removed, "crop apply");
        touched
    }
}

fn embed_circle(map: &mut Map, center: Vector2<f64>, radius: f64, slack: f64) {
    if radius <= slack {
        return;
    }
    let angle = |p: Vector2<f64>| {
        let d = p - center;
        d.y.atan2(d.x).rem_euclid(TAU)
    };
    let on_circle = |map: &Map| -> Vec<VertexId> {
        map.vertex_ids()
            .filter(|&v| {
                map.position(v)
                    .is_some_and(|p| ((p - center).norm() - radius).abs() < slack)
            })
            .collect()
    };
    // Three points at least, so consecutive arcs never repeat an endpoint pair.
    if on_circle(map).len() < 3 {
        for k in 0..3 {
            let a = k as f64 * TAU / 3.0;
            map.insert_vertex(center + Vector2::new(a.cos(), a.sin()) * radius);
        }
    }
    let mut ring: Vec<(f64, VertexId)> = on_circle(map)
        .into_iter()
        .filter_map(|v| map.position(v).map(|p| (angle(p), v)))
        .collect();
    ring.sort_by(|x, y| x.0.total_cmp(&y.0));
    let n = ring.len();
    for k in 0..n {
        let (v1, v2) = (ring[k].1, ring[(k + 1) % n].1);
        map.insert_edge_kind(
            v1,
            v2,
            EdgeKind::Arc {
                center,
                convex: true,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn grid(half: i32) -> Map {
        let mut m = Map::new();
        let h = half as f64;
        for k in -half..=half {
            let c = k as f64;
            m.insert_edge_pts(vector![-h, c], vector![h, c]);
            m.insert_edge_pts(vector![c, -h], vector![c, h]);
        }
        m
    }

    #[test]
    fn rect_apply_leaves_nothing_outside() {
        let mut m = grid(10);
        assert_eq!(m.num_edges(), 42);
        let crop = Crop::new(CropRegion::rect(vector![5.0, 5.0], vector![-5.0, -5.0]));
        crop.run(&mut m, GeomCfg::default());
        assert_eq!(m.num_edges(), 22);
        assert_eq!(m.num_vertices(), 40);
        for v in m.vertices() {
            assert!(v.pt.x.abs() <= 5.0 + 1e-9 && v.pt.y.abs() <= 5.0 + 1e-9);
        }
        assert!(m.is_consistent());
    }

    #[test]
    fn rect_embed_splits_and_outlines() {
        let cfg = GeomCfg::default();
        let mut m = Map::new();
        m.insert_edge_pts(vector![-10.0, 0.0], vector![10.0, 0.0]);
        let crop = Crop::new(CropRegion::rect(vector![-5.0, -5.0], vector![5.0, 5.0]))
            .with_embed(true)
            .with_apply(false);
        crop.run(&mut m, cfg);
        assert_eq!(m.num_vertices(), 8);
        assert_eq!(m.num_edges(), 9);
        assert!(m.is_consistent());

        crop.with_apply(true).apply(&mut m, cfg);
        assert_eq!(m.num_vertices(), 6);
        assert_eq!(m.num_edges(), 7);
        assert!(m.degrees().iter().all(|&d| d >= 2));
    }

    #[test]
    fn circle_embed_then_apply_keeps_arcs() {
        let cfg = GeomCfg::default();
        let mut m = Map::new();
        m.insert_edge_pts(vector![-2.0, 0.0], vector![2.0, 0.0]);
        let crop = Crop::new(CropRegion::circle(vector![0.0, 0.0], 1.0)).with_embed(true);
        crop.embed(&mut m, cfg);
        assert_eq!(m.num_edges(), 7);
        assert_eq!(m.num_vertices(), 6);
        let arcs = m.edges().iter().filter(|e| !e.kind.is_line()).count();
        assert_eq!(arcs, 4);

        crop.apply(&mut m, cfg);
        assert_eq!(m.num_edges(), 5);
        assert_eq!(m.num_vertices(), 4);
        assert!(m.is_consistent());
    }

    #[test]
    fn circle_clip_shortens_chords() {
        let mut m = Map::new();
        m.insert_edge_pts(vector![-3.0, 0.5], vector![3.0, 0.5]);
        m.insert_edge_pts(vector![-3.0, 2.0], vector![3.0, 2.0]);
        let crop = Crop::new(CropRegion::circle(vector![0.0, 0.0], 1.0));
        assert_eq!(crop.apply(&mut m, GeomCfg::default()), 2);
        assert_eq!(m.num_edges(), 1);
        let x = 0.75f64.sqrt();
        assert!(m.find_vertex(vector![x, 0.5]).is_some());
        assert!(m.find_vertex(vector![-x, 0.5]).is_some());
    }

    #[test]
    fn crop_serde_defaults_to_apply_only() {
        let c: Crop = serde_json::from_str(
            r#"{"region":{"shape":"circle","center":[0.0,0.0],"radius":2.0}}"#,
        )
        .expect("crop");
        assert!(c.apply && !c.embed);
        assert_eq!(c.region, CropRegion::circle(vector![0.0, 0.0], 2.0));
    }
}
