//! Motif construction: the line-art drawn inside one tile.
//!
//! Purpose
//! - Produce a `Map` in a tile's local frame for each design element.
//! - `IrregularStar` grows branches from side mid-points and cuts them at
//!   their crossings with neighbouring branches.
//! - `Inferred` reads the already-built neighbourhood and continues the lines
//!   that reach the tile's mid-points.
//!
//! Notes
//! - Inferred motifs depend on other motifs, so prototypes build them in a
//!   second pass (see `prototype::Prototype::proto_map`).
//!
//! Code cross-refs: `tiling::Tile`, `map::Map`

mod infer;
mod star;

pub use infer::{contacts, infer_motif, pair_contacts, Contact, Pairing};
pub use star::{irregular_star_branches, StarShape};

use serde::{Deserialize, Serialize};

use crate::geom2::{Aff2, GeomCfg};
use crate::map::Map;
use crate::tiling::Tile;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "motif", rename_all = "snake_case")]
pub enum Motif {
    /// Caller-supplied geometry, already in the tile frame.
    Explicit { map: Map },
    IrregularStar { d: f64, s: f64 },
    Inferred,
}

impl Motif {
    #[inline]
    pub fn star(d: f64, s: f64) -> Self {
        Motif::IrregularStar { d, s }
    }

    #[inline]
    pub fn explicit(map: Map) -> Self {
        Motif::Explicit { map }
    }

    /// True when building needs the maps of the other elements.
    #[inline]
    pub fn depends_on_neighbours(&self) -> bool {
        matches!(self, Motif::Inferred)
    }

    /// Build a motif that does not depend on neighbours. `Inferred` yields an
    /// empty map here; use `build_with_context`.
    pub fn build(&self, tile: &Tile, cfg: GeomCfg) -> Map {
        match self {
            Motif::Explicit { map } => map.clone(),
            Motif::IrregularStar { d, s } => irregular_star_branches(tile, *d, *s, cfg),
            Motif::Inferred => Map::with_tolerance(cfg.tolerance),
        }
    }

    /// Build with the surrounding geometry in world coordinates available.
    pub fn build_with_context(
        &self,
        tile: &Tile,
        placement: &Aff2,
        context: &Map,
        cfg: GeomCfg,
    ) -> Map {
        match self {
            Motif::Inferred => infer_motif(tile, placement, context, cfg),
            other => other.build(tile, cfg),
        }
    }
}
