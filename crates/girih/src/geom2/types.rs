//! Basic 2D types and tolerances shared by maps, motifs and placements.
//!
//! - `GeomCfg`: centralizes the positional tolerance and the epsilons used by
//!   intersection predicates.
//! - `Affine2`: 2D affine map used for tile placements and lattice translations.
//! - `Bounds`: axis-aligned bounding box of a point set.
//!
//! Code cross-refs: `map::Map`, `fill::FillRegion`, `motif::star`

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Geometry configuration (tolerances).
///
/// `tolerance` is a squared-distance threshold: two points are the same vertex
/// when `|p - q|² < tolerance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomCfg {
    pub tolerance: f64,
    pub eps_det: f64,
    pub eps_param: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            eps_det: 1e-12,
            eps_param: 1e-9,
        }
    }
}

impl GeomCfg {
    #[inline]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

/// 2D affine map: `x ↦ M x + t`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2 {
    pub m: Matrix2<f64>,
    pub t: Vector2<f64>,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    #[inline]
    pub fn identity() -> Self {
        Self {
            m: Matrix2::identity(),
            t: Vector2::zeros(),
        }
    }
    #[inline]
    pub fn translation(t: Vector2<f64>) -> Self {
        Self {
            m: Matrix2::identity(),
            t,
        }
    }
    /// Counterclockwise rotation by `theta` radians about the origin.
    #[inline]
    pub fn rotation(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self {
            m: Matrix2::new(c, -s, s, c),
            t: Vector2::zeros(),
        }
    }
    #[inline]
    pub fn scale(k: f64) -> Self {
        Self {
            m: Matrix2::identity() * k,
            t: Vector2::zeros(),
        }
    }
    #[inline]
    pub fn apply(&self, p: Vector2<f64>) -> Vector2<f64> {
        self.m * p + self.t
    }
    /// Linear part only (directions, lattice vectors).
    #[inline]
    pub fn apply_vector(&self, v: Vector2<f64>) -> Vector2<f64> {
        self.m * v
    }
    /// `self ∘ other`: apply `other` first, then `self`.
    #[inline]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            m: self.m * other.m,
            t: self.m * other.t + self.t,
        }
    }
    #[inline]
    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(|minv| Self {
            m: minv,
            t: -minv * self.t,
        })
    }
    #[inline]
    pub fn is_orientation_preserving(&self) -> bool {
        self.m.determinant() > 0.0
    }
    /// Max-abs comparison against the identity.
    pub fn is_identity_eps(&self, eps: f64) -> bool {
        let dm = (self.m - Matrix2::identity()).amax();
        dm <= eps && self.t.amax() <= eps
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Bounds {
    pub fn from_points<I: IntoIterator<Item = Vector2<f64>>>(pts: I) -> Option<Self> {
        let mut it = pts.into_iter();
        let first = it.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in it {
            b.min = b.min.inf(&p);
            b.max = b.max.sup(&p);
        }
        Some(b)
    }
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
    #[inline]
    pub fn center(&self) -> Vector2<f64> {
        (self.min + self.max) * 0.5
    }
    #[inline]
    pub fn contains_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.x <= self.max.x + eps
            && p.y >= self.min.y - eps
            && p.y <= self.max.y + eps
    }
}
