//! 2D primitives: affine placements, tolerances and segment predicates.
//!
//! Purpose
//! - Provide the small set of numerically explicit building blocks that the
//!   planar map, the cleanser and motif construction share.
//! - Keep every predicate eps-aware; tolerances arrive through `GeomCfg`
//!   rather than globals.
//!
//! Code cross-refs: `Aff2`, `GeomCfg`, `Bounds`, `Crossing`

mod types;
mod util;

pub use types::{Affine2 as Aff2, Bounds, GeomCfg};
pub use util::{
    cross, distance_to_segment, lerp, line_intersection, near, point_in_polygon,
    segment_interior_intersection, segment_intersection, signed_area, Crossing,
};

#[cfg(test)]
mod tests;
