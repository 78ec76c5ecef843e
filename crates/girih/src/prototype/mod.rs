//! Prototype: assemble per-tile motifs into one consistent map.
//!
//! Purpose
//! - Own the design elements, the tiling, an optional crop and the build
//!   configuration, and hand out the merged map lazily as `Arc<Map>`.
//!
//! Pipeline (see `build.rs`)
//! 1. fill placements from the tiling lattice (config override wins);
//! 2. motif maps: independent motifs first, inferred ones second;
//! 3. merge each motif under its tile placements, then under the fill
//!    (a single identity-placed element skips merging);
//! 4. crop, cleanse at the configured level, `verify(true)`.
//!
//! Notes
//! - Structural mismatches and a final inconsistency are `ProtoWarning`s in
//!   the `BuildReport`; the map is returned regardless.
//! - Every setter invalidates the cache. Maps already handed out stay valid.
//!
//! Code cross-refs: `motif::Motif`, `fill::FillRegion`, `crop::Crop`,
//! `cleanse::cleanse`

mod build;
mod types;

pub use types::{BuildReport, Cached, DesignElement, ProtoCfg, ProtoWarning};

use std::sync::{Arc, Mutex, PoisonError};

use crate::crop::Crop;
use crate::map::Map;
use crate::tiling::Tiling;

#[derive(Debug, Default)]
struct ProtoCache {
    map: Cached<Map>,
    report: BuildReport,
}

#[derive(Debug)]
pub struct Prototype {
    tiling: Tiling,
    elements: Vec<DesignElement>,
    crop: Option<Crop>,
    cfg: ProtoCfg,
    cache: Mutex<ProtoCache>,
}

impl Prototype {
    pub fn new(tiling: Tiling, cfg: ProtoCfg) -> Self {
        Self {
            tiling,
            elements: Vec::new(),
            crop: None,
            cfg,
            cache: Mutex::new(ProtoCache::default()),
        }
    }

    pub fn with_element(mut self, element: DesignElement) -> Self {
        self.add_element(element);
        self
    }

    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    /// Append an element; returns its index.
    pub fn add_element(&mut self, element: DesignElement) -> usize {
        self.elements.push(element);
        self.invalidate_mut();
        self.elements.len() - 1
    }

    pub fn remove_element(&mut self, index: usize) -> Option<DesignElement> {
        if index >= self.elements.len() {
            return None;
        }
        let el = self.elements.remove(index);
        self.invalidate_mut();
        Some(el)
    }

    pub fn set_elements(&mut self, elements: Vec<DesignElement>) {
        self.elements = elements;
        self.invalidate_mut();
    }

    pub fn crop(&self) -> Option<&Crop> {
        self.crop.as_ref()
    }

    pub fn set_crop(&mut self, crop: Option<Crop>) {
        self.crop = crop;
        self.invalidate_mut();
    }

    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }

    pub fn set_tiling(&mut self, tiling: Tiling) {
        self.tiling = tiling;
        self.invalidate_mut();
    }

    pub fn config(&self) -> &ProtoCfg {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: ProtoCfg) {
        self.cfg = cfg;
        self.invalidate_mut();
    }

    /// Force the next `proto_map` to rebuild.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.map.invalidate();
    }

    fn invalidate_mut(&mut self) {
        let cache = self.cache.get_mut().unwrap_or_else(PoisonError::into_inner);
        cache.map.invalidate();
    }

    pub fn is_built(&self) -> bool {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.map.is_built()
    }

    /// The merged, cropped and cleansed map; built on first use.
    pub fn proto_map(&self) -> Arc<Map> {
        self.with_built(|map, _| Arc::clone(map))
    }

    /// Report of the current build (building first if needed).
    pub fn report(&self) -> BuildReport {
        self.with_built(|_, report| report.clone())
    }

    /// Build if needed and read map and report under one lock.
    fn with_built<R>(&self, read: impl FnOnce(&Arc<Map>, &BuildReport) -> R) -> R {
        let mut guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let ProtoCache { map, report } = &mut *guard;
        let built = map.get_or_build(|| {
            let (built, rep) = build::build(
                &self.tiling,
                &self.elements,
                self.crop.as_ref(),
                &self.cfg,
            );
            *report = rep;
            built
        });
        read(&built, report)
    }
}

#[cfg(test)]
mod tests;
