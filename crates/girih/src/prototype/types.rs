//! Prototype inputs, configuration, cache cell and build diagnostics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cleanse::CleanseFlags;
use crate::fill::FillSpec;
use crate::geom2::GeomCfg;
use crate::motif::Motif;
use crate::tiling::Tile;

/// One tile outline with the motif drawn in it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesignElement {
    pub tile: Tile,
    pub motif: Motif,
}

impl DesignElement {
    pub fn new(tile: Tile, motif: Motif) -> Self {
        Self { tile, motif }
    }
}

/// Build configuration.
///
/// `sensitivity` is the squared-distance tolerance handed to the cleanser and
/// used for every map the build creates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtoCfg {
    pub cleanse_level: CleanseFlags,
    pub sensitivity: f64,
    /// Replaces the tiling's own fill when set.
    pub fill_override: Option<FillSpec>,
}

impl Default for ProtoCfg {
    fn default() -> Self {
        Self {
            cleanse_level: CleanseFlags::VERIFY_FIX,
            sensitivity: GeomCfg::default().tolerance,
            fill_override: None,
        }
    }
}

impl ProtoCfg {
    #[inline]
    pub fn geom(&self) -> GeomCfg {
        GeomCfg::with_tolerance(self.sensitivity)
    }
}

/// Lazily built value shared as `Arc<T>`.
#[derive(Debug)]
pub struct Cached<T> {
    value: Option<Arc<T>>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value, building it first if needed.
    pub fn get_or_build<F: FnOnce() -> T>(&mut self, build: F) -> Arc<T> {
        if let Some(v) = &self.value {
            return Arc::clone(v);
        }
        let v = Arc::new(build());
        self.value = Some(Arc::clone(&v));
        v
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.value.clone()
    }

    /// Drop the cached value; handed-out `Arc`s stay valid.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.value.is_some()
    }
}

/// Non-fatal build diagnostics. The map is still produced.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ProtoWarning {
    #[error("tiling has {tiles} unique tiles but the design has {elements} elements")]
    TileCountMismatch { tiles: usize, elements: usize },

    #[error("design element {index} matches no tile of the tiling; placed at identity")]
    UnmatchedTile { index: usize },

    #[error("prototype map inconsistent after cleansing: {summary}")]
    Inconsistent { summary: String },
}

/// What the last build did.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub warnings: Vec<ProtoWarning>,
    pub vertices: usize,
    pub edges: usize,
    pub fill_placements: usize,
    /// The single motif map was adopted without merging.
    pub short_circuited: bool,
    /// Cleanser passes that changed the map.
    pub cleansed: CleanseFlags,
}

impl BuildReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
