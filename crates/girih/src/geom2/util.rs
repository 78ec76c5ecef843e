use nalgebra::Vector2;

use super::types::GeomCfg;

/// Result of intersecting two parameterized segments `p + t (q - p)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub point: Vector2<f64>,
    /// Parameter along the first segment.
    pub t: f64,
    /// Parameter along the second segment.
    pub u: f64,
}

#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
pub fn lerp(a: Vector2<f64>, b: Vector2<f64>, t: f64) -> Vector2<f64> {
    a + (b - a) * t
}

/// Same-vertex predicate: squared distance below `tolerance`.
#[inline]
pub fn near(a: Vector2<f64>, b: Vector2<f64>, tolerance: f64) -> bool {
    (a - b).norm_squared() < tolerance
}

/// Intersection of the infinite lines through `p1→p2` and `q1→q2`.
///
/// Returns `None` for parallel or degenerate input (`|det| <= eps_det`).
pub fn line_intersection(
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    q1: Vector2<f64>,
    q2: Vector2<f64>,
    cfg: GeomCfg,
) -> Option<Crossing> {
    let r = p2 - p1;
    let s = q2 - q1;
    let det = cross(r, s);
    let scale = r.norm() * s.norm();
    if !det.is_finite() || scale <= 0.0 || det.abs() <= cfg.eps_det * scale {
        return None;
    }
    let qp = q1 - p1;
    let t = cross(qp, s) / det;
    let u = cross(qp, r) / det;
    Some(Crossing {
        point: p1 + r * t,
        t,
        u,
    })
}

/// Closed segment intersection (`t, u ∈ [0, 1]`).
pub fn segment_intersection(
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    q1: Vector2<f64>,
    q2: Vector2<f64>,
    cfg: GeomCfg,
) -> Option<Crossing> {
    let c = line_intersection(p1, p2, q1, q2, cfg)?;
    let on = |x: f64| (-cfg.eps_param..=1.0 + cfg.eps_param).contains(&x);
    (on(c.t) && on(c.u)).then_some(c)
}

/// "True" crossing: interior to both segments, endpoints excluded.
pub fn segment_interior_intersection(
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    q1: Vector2<f64>,
    q2: Vector2<f64>,
    cfg: GeomCfg,
) -> Option<Crossing> {
    let c = line_intersection(p1, p2, q1, q2, cfg)?;
    let inside = |x: f64| x > cfg.eps_param && x < 1.0 - cfg.eps_param;
    (inside(c.t) && inside(c.u)).then_some(c)
}

/// Ray casting point-in-polygon (odd crossings = inside).
pub fn point_in_polygon(p: Vector2<f64>, poly: &[Vector2<f64>]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shoelace signed area; positive for counterclockwise order.
pub fn signed_area(poly: &[Vector2<f64>]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        acc += cross(poly[i], poly[(i + 1) % n]);
    }
    0.5 * acc
}

/// Distance from `p` to the closed segment `a→b`.
pub fn distance_to_segment(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
