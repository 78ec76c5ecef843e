//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for project-internal
//!   code, the CLI and benches. Breaking changes are allowed and expected.

// 2D primitives
pub use crate::geom2::{
    line_intersection, point_in_polygon, segment_interior_intersection, segment_intersection,
    Aff2, Bounds, Crossing, GeomCfg,
};
// Planar map
pub use crate::map::{Edge, EdgeId, EdgeKind, Map, MapDefects, NeighbourMap, Vertex, VertexId};
// Cleanser
pub use crate::cleanse::{analyze, cleanse, CleanseFlags};
// Placement and cropping
pub use crate::crop::{Crop, CropRegion};
pub use crate::fill::{FillRegion, FillSpec};
pub use crate::tiling::{PlacedTile, Tile, Tiling};
// Motifs
pub use crate::motif::{infer_motif, irregular_star_branches, Motif, StarShape};
// Prototype
pub use crate::prototype::{BuildReport, Cached, DesignElement, ProtoCfg, ProtoWarning, Prototype};
