//! Planar-subdivision engine for periodic tiling art.
//!
//! Tile motifs are drawn as planar maps, replicated over a lattice, merged,
//! cropped and cleansed into one consistent map for downstream rendering.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - Prefer clarity and better design over compatibility; breaking changes are
//!   fine when they improve quality.

pub mod api;
pub(crate) mod cfg;
pub mod cleanse;
pub mod crop;
pub mod fill;
pub mod geom2;
pub mod map;
pub mod motif;
pub mod prototype;
pub mod tiling;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom2::{Aff2, GeomCfg};
pub use nalgebra::{Matrix2 as Mat2, Vector2 as Vec2};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cleanse::{cleanse, CleanseFlags};
    pub use crate::fill::{FillRegion, FillSpec};
    pub use crate::geom2::{Aff2, GeomCfg};
    pub use crate::map::{EdgeKind, Map, NeighbourMap};
    pub use crate::motif::Motif;
    pub use crate::prototype::{DesignElement, ProtoCfg, Prototype};
    pub use crate::tiling::{Tile, Tiling};
    pub use nalgebra::{Matrix2 as Mat2, Vector2 as Vec2};
}
