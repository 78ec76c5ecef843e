//! Periodic fill placements.
//!
//! Purpose
//! - Turn two lattice translation vectors plus a fill specification into the
//!   ordered list of translations that replicate one translational unit over
//!   the requested region.
//!
//! Conventions
//! - Output is lexicographic in `(h, v)`: `h` outer, `v` inner. Consumers rely
//!   on the order being deterministic, not on any geometric sorting.
//! - `Pack` is a quick preview neighbourhood (`h ∈ {−1,0,1}`, `v ∈ {0,1}`),
//!   kept literally; it is not meant to cover the region exhaustively.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geom2::Aff2;

/// Which lattice cells to populate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FillSpec {
    /// No replication: the identity placement only.
    Singleton,
    /// Small fixed preview neighbourhood.
    Pack,
    /// Every integer `(h, v)` in the inclusive rectangle.
    Defined {
        min_h: i32,
        max_h: i32,
        min_v: i32,
        max_v: i32,
    },
}

impl Default for FillSpec {
    fn default() -> Self {
        FillSpec::Defined {
            min_h: -3,
            max_h: 3,
            min_v: -3,
            max_v: 3,
        }
    }
}

impl FillSpec {
    /// Symmetric `[-n, n]²` rectangle.
    pub fn square(n: i32) -> Self {
        FillSpec::Defined {
            min_h: -n,
            max_h: n,
            min_v: -n,
            max_v: n,
        }
    }

    /// Lattice coordinates to visit, in output order.
    pub fn cells(&self) -> Vec<(i32, i32)> {
        match *self {
            FillSpec::Singleton => vec![(0, 0)],
            FillSpec::Pack => {
                let mut out = Vec::with_capacity(6);
                for h in -1..=1 {
                    for v in 0..=1 {
                        out.push((h, v));
                    }
                }
                out
            }
            FillSpec::Defined {
                min_h,
                max_h,
                min_v,
                max_v,
            } => {
                let mut out = Vec::new();
                for h in min_h..=max_h {
                    for v in min_v..=max_v {
                        out.push((h, v));
                    }
                }
                out
            }
        }
    }
}

/// Lattice `(t1, t2)` with a fill specification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillRegion {
    pub t1: Vector2<f64>,
    pub t2: Vector2<f64>,
    pub spec: FillSpec,
}

impl FillRegion {
    pub fn new(t1: Vector2<f64>, t2: Vector2<f64>, spec: FillSpec) -> Self {
        Self { t1, t2, spec }
    }

    /// Pure translations `h·t1 + v·t2`. `Singleton` yields exactly the identity.
    pub fn placements(&self) -> Vec<Aff2> {
        if self.spec == FillSpec::Singleton {
            return vec![Aff2::identity()];
        }
        self.spec
            .cells()
            .into_iter()
            .map(|(h, v)| Aff2::translation(self.t1 * h as f64 + self.t2 * v as f64))
            .collect()
    }
}
