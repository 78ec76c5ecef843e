//! Tile outlines and tiling placement data.
//!
//! A `Tiling` is the external collaborator the prototype consumes: unique tile
//! outlines, each tile's placements within one translational unit, the two
//! lattice vectors and a default fill. A few classic tilings are provided for
//! tests, benches and the command line.

use std::f64::consts::{PI, SQRT_2};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::fill::{FillRegion, FillSpec};
use crate::geom2::{lerp, near, point_in_polygon, signed_area, Aff2};
use crate::map::Map;

/// Polygon outline in the tile's local frame, counterclockwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    corners: Vec<Vector2<f64>>,
}

impl Tile {
    /// Corners in either winding; stored counterclockwise.
    pub fn new(mut corners: Vec<Vector2<f64>>) -> Self {
        if signed_area(&corners) < 0.0 {
            corners.reverse();
        }
        Self { corners }
    }

    /// Regular `n`-gon with unit sides centred on the origin. Corner `k` sits at
    /// angle `(k − ½)·2π/n`, so side 0 is bisected by the positive x-axis.
    pub fn regular(n: usize) -> Self {
        let n = n.max(3);
        let step = 2.0 * PI / n as f64;
        let radius = 0.5 / (PI / n as f64).sin();
        let corners = (0..n)
            .map(|k| {
                let a = (k as f64 - 0.5) * step;
                Vector2::new(radius * a.cos(), radius * a.sin())
            })
            .collect();
        Self { corners }
    }

    #[inline]
    pub fn corners(&self) -> &[Vector2<f64>] {
        &self.corners
    }
    #[inline]
    pub fn num_sides(&self) -> usize {
        self.corners.len()
    }

    /// `m_i` is the midpoint of side `i` (corner `i` to corner `i+1`).
    pub fn mid_points(&self) -> Vec<Vector2<f64>> {
        let n = self.corners.len();
        (0..n)
            .map(|i| lerp(self.corners[i], self.corners[(i + 1) % n], 0.5))
            .collect()
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        point_in_polygon(p, &self.corners)
    }

    pub fn centroid(&self) -> Vector2<f64> {
        let n = self.corners.len().max(1) as f64;
        self.corners.iter().sum::<Vector2<f64>>() / n
    }

    pub fn transformed(&self, f: &Aff2) -> Tile {
        Tile::new(self.corners.iter().map(|&c| f.apply(c)).collect())
    }

    /// Same corners up to a cyclic shift (squared-distance `tolerance`).
    pub fn same_outline(&self, other: &Tile, tolerance: f64) -> bool {
        let n = self.corners.len();
        if n != other.corners.len() {
            return false;
        }
        if n == 0 {
            return true;
        }
        (0..n).any(|shift| {
            (0..n).all(|i| near(self.corners[i], other.corners[(i + shift) % n], tolerance))
        })
    }

    /// Boundary polygon as a map (one edge per side).
    pub fn outline_map(&self, tolerance: f64) -> Map {
        let mut m = Map::with_tolerance(tolerance);
        let n = self.corners.len();
        for i in 0..n {
            m.insert_edge_pts(self.corners[i], self.corners[(i + 1) % n]);
        }
        m
    }
}

/// A tile with its placements inside one translational unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: Tile,
    pub placements: Vec<Aff2>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tiling {
    pub name: String,
    pub t1: Vector2<f64>,
    pub t2: Vector2<f64>,
    pub tiles: Vec<PlacedTile>,
    #[serde(default)]
    pub fill: FillSpec,
}

impl Tiling {
    pub fn new(name: impl Into<String>, t1: Vector2<f64>, t2: Vector2<f64>) -> Self {
        Self {
            name: name.into(),
            t1,
            t2,
            tiles: Vec::new(),
            fill: FillSpec::default(),
        }
    }

    pub fn with_tile(mut self, tile: Tile, placements: Vec<Aff2>) -> Self {
        self.tiles.push(PlacedTile { tile, placements });
        self
    }

    pub fn with_fill(mut self, fill: FillSpec) -> Self {
        self.fill = fill;
        self
    }

    pub fn unique_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().map(|t| &t.tile)
    }

    pub fn num_unique_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Placements of the first tile whose outline matches `tile`.
    pub fn placements_for(&self, tile: &Tile, tolerance: f64) -> Option<&[Aff2]> {
        self.tiles
            .iter()
            .find(|t| t.tile.same_outline(tile, tolerance))
            .map(|t| t.placements.as_slice())
    }

    /// Fill region over this lattice, `spec` overriding the tiling's own fill.
    pub fn fill_region(&self, spec: Option<FillSpec>) -> FillRegion {
        FillRegion::new(self.t1, self.t2, spec.unwrap_or(self.fill))
    }

    /// Unit squares on the integer lattice.
    pub fn square() -> Self {
        Tiling::new("square", Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0))
            .with_tile(Tile::regular(4), vec![Aff2::identity()])
            .with_fill(FillSpec::square(2))
    }

    /// Pointy-top regular hexagons with unit sides.
    pub fn hexagonal() -> Self {
        let r3 = 3f64.sqrt();
        Tiling::new("hexagonal", Vector2::new(r3, 0.0), Vector2::new(0.5 * r3, 1.5))
            .with_tile(Tile::regular(6), vec![Aff2::identity()])
            .with_fill(FillSpec::square(2))
    }

    /// 4.8.8: one octagon and one diamond per unit, unit sides.
    pub fn truncated_square() -> Self {
        let period = 1.0 + SQRT_2;
        let a = 0.5 * period;
        let diamond = Aff2::translation(Vector2::new(a, a)).compose(&Aff2::rotation(PI / 4.0));
        Tiling::new(
            "truncated-square",
            Vector2::new(period, 0.0),
            Vector2::new(0.0, period),
        )
        .with_tile(Tile::regular(8), vec![Aff2::identity()])
        .with_tile(Tile::regular(4), vec![diamond])
        .with_fill(FillSpec::square(2))
    }
}
