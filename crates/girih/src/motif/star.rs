//! Irregular star branches: rays from side mid-points, cut at their crossings
//! with neighbouring branches.

use nalgebra::Vector2;
use tracing::debug;

use crate::cfg::FRAC_SNAP;
use crate::geom2::{lerp, line_intersection, GeomCfg};
use crate::map::Map;
use crate::tiling::Tile;

/// Normalized star parameters for an `n`-sided tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarShape {
    pub sides: usize,
    /// Integer part of `d`.
    pub di: usize,
    /// Fractional part of `d`, snapped to zero near integers.
    pub dfrac: f64,
    /// Intersection count per branch.
    pub s: usize,
}

impl StarShape {
    /// `d` is clamped into `[1, n/2]`, `s` rounded and clamped into `[0, di]`.
    pub fn new(sides: usize, d: f64, s: f64) -> Self {
        let d_max = (sides as f64 / 2.0).max(1.0);
        let d = if d.is_finite() { d.clamp(1.0, d_max) } else { 1.0 };
        let mut di = d.floor() as usize;
        let mut dfrac = d - di as f64;
        if dfrac < FRAC_SNAP {
            dfrac = 0.0;
        } else if dfrac > 1.0 - FRAC_SNAP {
            di += 1;
            dfrac = 0.0;
        }
        let s = if s.is_finite() { s.round().max(0.0) as usize } else { 0 };
        Self {
            sides,
            di,
            dfrac,
            s: s.min(di),
        }
    }

    #[inline]
    pub fn is_integral(&self) -> bool {
        self.dfrac == 0.0
    }

    /// Whether branches close up (`s == di`).
    #[inline]
    pub fn closes(&self) -> bool {
        self.s == self.di
    }

    /// Crossings each branch is expected to produce.
    fn expected_points(&self) -> usize {
        let open = self.s.min(self.di.saturating_sub(1));
        if self.closes() && !self.is_integral() {
            open + 1
        } else {
            open
        }
    }
}

/// Ray from a mid-point; `dir` is not normalized.
#[derive(Clone, Copy, Debug)]
struct Ray {
    origin: Vector2<f64>,
    dir: Vector2<f64>,
}

/// Points produced along one branch, and whether every crossing resolved.
struct BranchPoints {
    points: Vec<Vector2<f64>>,
    complete: bool,
}

struct Star<'a> {
    shape: StarShape,
    mids: &'a [Vector2<f64>],
    cfg: GeomCfg,
}

impl Star<'_> {
    fn side(&self, i: usize, offset: isize) -> usize {
        let n = self.shape.sides as isize;
        (i as isize + offset).rem_euclid(n) as usize
    }

    fn ray(&self, i: usize, sigma: isize) -> Ray {
        let di = self.shape.di as isize;
        let a = self.mids[self.side(i, sigma * di)];
        let b = self.mids[self.side(i, sigma * (di + 1))];
        let origin = self.mids[i];
        Ray {
            origin,
            dir: lerp(a, b, self.shape.dfrac) - origin,
        }
    }

    /// Forward crossing of two rays as a parameter along `a` plus the point.
    fn meet(&self, a: Ray, b: Ray) -> Option<(f64, Vector2<f64>)> {
        let c = line_intersection(a.origin, a.origin + a.dir, b.origin, b.origin + b.dir, self.cfg)?;
        (c.t > self.cfg.eps_param && c.u > self.cfg.eps_param).then_some((c.t, c.point))
    }

    fn branch(&self, i: usize, sigma: isize) -> BranchPoints {
        let own = self.ray(i, sigma);
        let expected = self.shape.expected_points();
        let mut points = Vec::with_capacity(expected);
        let mut last_t = 0.0;
        for k in 1..=expected as isize {
            let other = self.ray(self.side(i, sigma * k), -sigma);
            match self.meet(own, other) {
                Some((t, p)) if t > last_t => {
                    last_t = t;
                    points.push(p);
                }
                _ => return BranchPoints { points, complete: false },
            }
        }
        BranchPoints {
            points,
            complete: true,
        }
    }
}

/// Build the irregular star motif for `tile` in its local frame.
///
/// Each side `i` and sign `σ` grows a branch from mid-point `m_i` toward the
/// point at fraction `dfrac` between `m_{i+σ·di}` and `m_{i+σ·(di+1)}`. The
/// branch is cut at its crossings with the branches of sides `i+σk`
/// (opposite sign) for `k = 1..=min(s, di-1)`. When `s == di` an integral
/// star joins each branch end to its mirror's end; a fractional one takes one
/// more crossing instead. Branches whose crossings do not resolve stop at the
/// last resolved point and do not close.
pub fn irregular_star_branches(tile: &Tile, d: f64, s: f64, cfg: GeomCfg) -> Map {
    let mids = tile.mid_points();
    let shape = StarShape::new(mids.len(), d, s);
    let mut map = Map::with_tolerance(cfg.tolerance);
    if mids.len() < 3 {
        return map;
    }
    let star = Star {
        shape,
        mids: &mids,
        cfg,
    };
    let mut unresolved = 0usize;
    for i in 0..shape.sides {
        for sigma in [1isize, -1] {
            let branch = star.branch(i, sigma);
            if !branch.complete {
                unresolved += 1;
            }
            let mut prev = mids[i];
            for &p in &branch.points {
                map.insert_edge_pts(prev, p);
                prev = p;
            }
            if !(branch.complete && shape.closes() && shape.is_integral()) {
                continue;
            }
            let j = star.side(i, sigma * shape.di as isize);
            let mirror = star.branch(j, -sigma);
            if mirror.complete {
                let end = mirror.points.last().copied().unwrap_or(mids[j]);
                map.insert_edge_pts(prev, end);
            }
        }
    }
    debug!(
        sides = shape.sides,
        di = shape.di,
        dfrac = shape.dfrac,
        s = shape.s,
        unresolved,
        vertices = map.num_vertices(),
        edges = map.num_edges(),
        "irregular star"
    );
    map
}
