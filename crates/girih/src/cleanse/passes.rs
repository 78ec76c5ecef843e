//! Individual repair passes. Each returns how many items it changed.

use std::collections::HashMap;

use nalgebra::Vector2;

use crate::cfg::ANGLE_EPS;
use crate::geom2::{cross, near, segment_interior_intersection, GeomCfg};
use crate::map::{Edge, EdgeId, Map, NeighbourMap, VertexId};

/// Unify vertex pairs closer than `tolerance` (squared distance). The lower
/// index wins and keeps its position; edges are redirected to it. Repeats
/// until no pair remains. Returns the number of vertices dropped.
pub fn coalesce_points(map: &mut Map, tolerance: f64) -> usize {
    let mut total = 0;
    loop {
        let pairs = map.near_vertex_pairs(tolerance);
        if pairs.is_empty() {
            break;
        }
        let mut target: Vec<usize> = (0..map.num_vertices()).collect();
        for (i, j) in pairs {
            if target[i] == i && target[j] == j {
                target[j] = i;
            }
        }
        let dropped = map.redirect_vertices(&target);
        if dropped == 0 {
            break;
        }
        total += dropped;
    }
    total
}

/// Replace `a — v — b` by `a — b` when `v` has exactly two straight incident
/// edges with parallel directions and `a — b` is not already an edge. Repeats
/// to a fixed point; returns the number of joins.
pub fn join_collinear(map: &mut Map, tolerance: f64) -> usize {
    let mut total = 0;
    loop {
        let nm = NeighbourMap::new(map);
        let nv = map.num_vertices();
        let mut touched = vec![false; nv];
        let mut doomed_vertex = vec![false; nv];
        let mut doomed_edge = vec![false; map.num_edges()];
        let mut joins: Vec<(VertexId, VertexId)> = Vec::new();
        for v in map.vertex_ids() {
            let Some(&[e0, e1]) = nm.neighbours(map, v) else {
                continue;
            };
            let Some((a, b)) = collinear_pair(map, v, e0, e1, tolerance) else {
                continue;
            };
            if touched[v.0] || touched[a.0] || touched[b.0] {
                continue;
            }
            touched[v.0] = true;
            touched[a.0] = true;
            touched[b.0] = true;
            doomed_vertex[v.0] = true;
            doomed_edge[e0.0] = true;
            doomed_edge[e1.0] = true;
            joins.push((a, b));
        }
        if joins.is_empty() {
            break;
        }
        map.retain_edges(|id, _| !doomed_edge[id.0]);
        for &(a, b) in &joins {
            map.push_edge_unchecked(Edge::line(a, b));
        }
        map.remove_vertices(&doomed_vertex);
        total += joins.len();
    }
    total
}

fn collinear_pair(
    map: &Map,
    v: VertexId,
    e0: EdgeId,
    e1: EdgeId,
    tolerance: f64,
) -> Option<(VertexId, VertexId)> {
    let (ea, eb) = (map.edge(e0)?, map.edge(e1)?);
    if !ea.kind.is_line() || !eb.kind.is_line() {
        return None;
    }
    let (a, b) = (ea.other(v), eb.other(v));
    if a == b || a == v || b == v {
        return None;
    }
    let (pv, pa, pb) = (map.position(v)?, map.position(a)?, map.position(b)?);
    if near(pa, pb, tolerance) || map.find_edge(a, b).is_some() {
        return None;
    }
    let da = unit(pa - pv)?;
    let db = unit(pb - pv)?;
    (cross(da, db).abs() <= ANGLE_EPS).then_some((a, b))
}

#[inline]
fn unit(v: Vector2<f64>) -> Option<Vector2<f64>> {
    let n = v.norm();
    (n.is_finite() && n > 0.0).then(|| v / n)
}

/// Split every pair of straight edges that cross at a point interior to both.
/// Edges sharing an endpoint, touching at an endpoint or running parallel are
/// left alone. Returns the number of crossings found.
pub fn divide_intersecting(map: &mut Map, cfg: GeomCfg) -> usize {
    struct Seg {
        id: usize,
        a: Vector2<f64>,
        b: Vector2<f64>,
        lo: Vector2<f64>,
        hi: Vector2<f64>,
    }
    let mut segs: Vec<Seg> = Vec::new();
    for (id, e) in map.edges().iter().enumerate() {
        if !e.kind.is_line() {
            continue;
        }
        let (Some(a), Some(b)) = (map.position(e.v1), map.position(e.v2)) else {
            continue;
        };
        segs.push(Seg {
            id,
            a,
            b,
            lo: a.inf(&b),
            hi: a.sup(&b),
        });
    }
    segs.sort_by(|s, t| s.lo.x.total_cmp(&t.lo.x));

    // (edge id, param, crossing point)
    let mut hits: Vec<(usize, f64, Vector2<f64>)> = Vec::new();
    for (k, s) in segs.iter().enumerate() {
        let es = map.edges()[s.id];
        for t in &segs[k + 1..] {
            if t.lo.x > s.hi.x {
                break;
            }
            if t.lo.y > s.hi.y || t.hi.y < s.lo.y {
                continue;
            }
            let et = map.edges()[t.id];
            if es.touches(et.v1) || es.touches(et.v2) {
                continue;
            }
            if let Some(c) = segment_interior_intersection(s.a, s.b, t.a, t.b, cfg) {
                hits.push((s.id, c.t, c.point));
                hits.push((t.id, c.u, c.point));
            }
        }
    }
    if hits.is_empty() {
        return 0;
    }
    let crossings = hits.len() / 2;

    let mut splits: HashMap<usize, Vec<(f64, VertexId)>> = HashMap::new();
    for (id, param, p) in hits {
        let v = map.insert_vertex(p);
        splits.entry(id).or_default().push((param, v));
    }
    let mut chains: Vec<Edge> = Vec::new();
    for (&id, list) in splits.iter_mut() {
        list.sort_by(|x, y| x.0.total_cmp(&y.0));
        let e = map.edges()[id];
        let mut prev = e.v1;
        for &(_, v) in list.iter() {
            if v != prev {
                chains.push(Edge::line(prev, v));
                prev = v;
            }
        }
        if prev != e.v2 {
            chains.push(Edge::line(prev, e.v2));
        }
    }
    map.retain_edges(|id, _| !splits.contains_key(&id.0));
    chains.sort_by_key(|e| e.key());
    for e in chains {
        map.push_edge_unchecked(e);
    }
    crossings
}

/// Drop edges with a missing endpoint, equal endpoints or coincident endpoints.
pub fn remove_bad_edges(map: &mut Map, tolerance: f64) -> usize {
    let bad: Vec<bool> = map
        .edges()
        .iter()
        .map(|e| match (map.position(e.v1), map.position(e.v2)) {
            (Some(p1), Some(p2)) => e.v1 == e.v2 || near(p1, p2, tolerance),
            _ => true,
        })
        .collect();
    map.retain_edges(|id, _| !bad[id.0])
}

/// Remove every vertex with exactly `degree` incident edges, together with
/// those edges. Single sweep; returns the number of vertices removed.
pub fn remove_vertices_with_degree(map: &mut Map, degree: usize) -> usize {
    let doomed: Vec<bool> = map.degrees().iter().map(|&d| d == degree).collect();
    if !doomed.iter().any(|&d| d) {
        return 0;
    }
    let hit = |v: VertexId| doomed.get(v.0).copied().unwrap_or(false);
    map.retain_edges(|_, e| !hit(e.v1) && !hit(e.v2));
    map.remove_vertices(&doomed)
}

/// Peel degree-1 vertices until none is left, so open chains and trees are
/// removed whole. Returns the number of vertices removed.
pub fn prune_dangling(map: &mut Map) -> usize {
    let mut total = 0;
    loop {
        let removed = remove_vertices_with_degree(map, 1);
        if removed == 0 {
            return total;
        }
        total += removed;
    }
}

/// Drop edges repeating an unordered endpoint pair, keeping the first one.
/// Works from a freshly built `NeighbourMap`.
pub fn dedup_edges(map: &mut Map) -> usize {
    let nm = NeighbourMap::new(map);
    let mut doomed = vec![false; map.num_edges()];
    for v in map.vertex_ids() {
        let Some(list) = nm.neighbours(map, v) else {
            continue;
        };
        let mut first: HashMap<VertexId, EdgeId> = HashMap::with_capacity(list.len());
        for &e in list {
            let Some(edge) = map.edge(e) else { continue };
            let other = edge.other(v);
            match first.get(&other) {
                Some(&kept) if kept != e => doomed[e.0] = true,
                Some(_) => {}
                None => {
                    first.insert(other, e);
                }
            }
        }
    }
    map.retain_edges(|id, _| !doomed[id.0])
}
