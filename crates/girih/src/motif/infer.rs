//! Neighbour-inferred motif: continue the lines that reach a tile's side
//! mid-points from adjacent tiles and join them pairwise inside the tile.

use std::cmp::Ordering;

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::cfg::ANGLE_EPS;
use crate::geom2::{cross, distance_to_segment, line_intersection, near, Aff2, GeomCfg};
use crate::map::Map;
use crate::tiling::Tile;

/// A context line arriving at side `side`, continued into the tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub side: usize,
    pub origin: Vector2<f64>,
    /// Unit direction pointing into the tile.
    pub dir: Vector2<f64>,
}

/// Two contacts joined at `point`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pairing {
    pub a: usize,
    pub b: usize,
    pub point: Vector2<f64>,
    /// Longer of the two ray lengths up to `point`.
    pub reach: f64,
}

/// Contacts of `context` (already in the tile frame) with `tile`'s mid-points.
///
/// An edge contributes when one endpoint sits on a mid-point and the other is
/// outside the tile. Parallel repeats at the same mid-point collapse to one.
pub fn contacts(tile: &Tile, context: &Map, cfg: GeomCfg) -> Vec<Contact> {
    let mids = tile.mid_points();
    let mut out: Vec<Contact> = Vec::new();
    for e in context.edges() {
        if !e.kind.is_line() {
            continue;
        }
        let (Some(p1), Some(p2)) = (context.position(e.v1), context.position(e.v2)) else {
            continue;
        };
        for (at, from) in [(p1, p2), (p2, p1)] {
            let Some(side) = mids.iter().position(|&m| near(at, m, cfg.tolerance)) else {
                continue;
            };
            if tile.contains(from) || on_outline(tile, from, cfg) {
                continue;
            }
            let dir = (mids[side] - from).normalize();
            let repeat = out
                .iter()
                .any(|c| c.side == side && cross(c.dir, dir).abs() < ANGLE_EPS && c.dir.dot(&dir) > 0.0);
            if !repeat {
                out.push(Contact {
                    side,
                    origin: mids[side],
                    dir,
                });
            }
        }
    }
    out
}

fn on_outline(tile: &Tile, p: Vector2<f64>, cfg: GeomCfg) -> bool {
    let c = tile.corners();
    let n = c.len();
    (0..n).any(|i| distance_to_segment(p, c[i], c[(i + 1) % n]).powi(2) < cfg.tolerance)
}

/// Where the rays of `a` and `b` meet inside the tile, with the longer reach.
fn meeting(tile: &Tile, a: &Contact, b: &Contact, cfg: GeomCfg) -> Option<(Vector2<f64>, f64)> {
    if a.side == b.side {
        return None;
    }
    let head_on = cross(a.dir, b.dir).abs() < ANGLE_EPS && a.dir.dot(&b.dir) < 0.0;
    if head_on {
        // Opposite rays on one line meet halfway.
        let gap = b.origin - a.origin;
        if cross(a.dir, gap).abs() > cfg.tolerance.sqrt() || gap.dot(&a.dir) <= 0.0 {
            return None;
        }
        let point = a.origin + gap * 0.5;
        return Some((point, 0.5 * gap.norm()));
    }
    let c = line_intersection(a.origin, a.origin + a.dir, b.origin, b.origin + b.dir, cfg)?;
    if c.t <= cfg.eps_param || c.u <= cfg.eps_param || !tile.contains(c.point) {
        return None;
    }
    Some((c.point, c.t.max(c.u)))
}

/// Greedy pairing: shortest reach first, each contact used at most once.
/// Ties break by contact order, so the result is deterministic.
pub fn pair_contacts(tile: &Tile, contacts: &[Contact], cfg: GeomCfg) -> Vec<Pairing> {
    let mut candidates = Vec::new();
    for a in 0..contacts.len() {
        for b in a + 1..contacts.len() {
            if let Some((point, reach)) = meeting(tile, &contacts[a], &contacts[b], cfg) {
                candidates.push(Pairing { a, b, point, reach });
            }
        }
    }
    candidates.sort_by(|x, y| {
        x.reach
            .partial_cmp(&y.reach)
            .unwrap_or(Ordering::Equal)
            .then(x.a.cmp(&y.a))
            .then(x.b.cmp(&y.b))
    });
    let mut used = vec![false; contacts.len()];
    let mut out = Vec::new();
    for c in candidates {
        if used[c.a] || used[c.b] {
            continue;
        }
        used[c.a] = true;
        used[c.b] = true;
        out.push(c);
    }
    out
}

/// Infer a motif for `tile` placed by `placement`, from `context` in world
/// coordinates. The result is in the tile's local frame.
pub fn infer_motif(tile: &Tile, placement: &Aff2, context: &Map, cfg: GeomCfg) -> Map {
    let mut map = Map::with_tolerance(cfg.tolerance);
    let Some(to_local) = placement.inverse() else {
        warn!("singular tile placement; inferred motif left empty");
        return map;
    };
    let local = context.transformed(&to_local);
    let found = contacts(tile, &local, cfg);
    let pairs = pair_contacts(tile, &found, cfg);
    for p in &pairs {
        map.insert_edge_pts(found[p.a].origin, p.point);
        map.insert_edge_pts(found[p.b].origin, p.point);
    }
    debug!(
        sides = tile.num_sides(),
        contacts = found.len(),
        pairs = pairs.len(),
        unpaired = found.len() - 2 * pairs.len(),
        "inferred motif"
    );
    map
}
