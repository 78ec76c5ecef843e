//! The prototype build pipeline: motifs, placements, merge, crop, cleanse,
//! verify.

use tracing::{debug, warn};

use crate::cfg::IDENTITY_EPS;
use crate::cleanse::cleanse;
use crate::crop::Crop;
use crate::fill::{FillRegion, FillSpec};
use crate::geom2::{Aff2, GeomCfg};
use crate::map::Map;
use crate::tiling::Tiling;

use super::types::{BuildReport, DesignElement, ProtoCfg, ProtoWarning};

fn record(report: &mut BuildReport, w: ProtoWarning) {
    warn!("{w}");
    report.warnings.push(w);
}

/// Per-element placements inside one translational unit. Unmatched elements
/// and tiles without placements fall back to the identity.
fn element_placements(
    tiling: &Tiling,
    elements: &[DesignElement],
    tolerance: f64,
    report: &mut BuildReport,
) -> Vec<Vec<Aff2>> {
    if tiling.num_unique_tiles() != elements.len() {
        record(
            report,
            ProtoWarning::TileCountMismatch {
                tiles: tiling.num_unique_tiles(),
                elements: elements.len(),
            },
        );
    }
    elements
        .iter()
        .enumerate()
        .map(|(index, el)| match tiling.placements_for(&el.tile, tolerance) {
            Some(p) if !p.is_empty() => p.to_vec(),
            Some(_) => vec![Aff2::identity()],
            None => {
                record(report, ProtoWarning::UnmatchedTile { index });
                vec![Aff2::identity()]
            }
        })
        .collect()
}

/// Every motif built so far, placed over the unit and its lattice ring.
fn neighbourhood(
    tiling: &Tiling,
    motifs: &[Option<Map>],
    placements: &[Vec<Aff2>],
    geom: GeomCfg,
) -> Map {
    let mut unit = Map::with_tolerance(geom.tolerance);
    for (motif, places) in motifs.iter().zip(placements) {
        if let Some(m) = motif {
            unit.merge_many(m, places);
        }
    }
    let ring = FillRegion::new(tiling.t1, tiling.t2, FillSpec::square(1)).placements();
    let mut context = Map::with_tolerance(geom.tolerance);
    context.merge_many(&unit, &ring);
    context
}

/// Independent motifs first, then dependent ones in element order, each
/// seeing everything built before it.
fn build_motifs(
    tiling: &Tiling,
    elements: &[DesignElement],
    placements: &[Vec<Aff2>],
    geom: GeomCfg,
) -> Vec<Map> {
    let mut motifs: Vec<Option<Map>> = elements
        .iter()
        .map(|el| {
            (!el.motif.depends_on_neighbours()).then(|| el.motif.build(&el.tile, geom))
        })
        .collect();
    for (i, el) in elements.iter().enumerate() {
        if !el.motif.depends_on_neighbours() {
            continue;
        }
        let context = neighbourhood(tiling, &motifs, placements, geom);
        let placement = placements[i].first().copied().unwrap_or_default();
        motifs[i] = Some(el.motif.build_with_context(&el.tile, &placement, &context, geom));
    }
    motifs
        .into_iter()
        .map(|m| m.unwrap_or_else(|| Map::with_tolerance(geom.tolerance)))
        .collect()
}

fn is_single_identity(placements: &[Aff2]) -> bool {
    placements.len() == 1 && placements[0].is_identity_eps(IDENTITY_EPS)
}

pub(super) fn build(
    tiling: &Tiling,
    elements: &[DesignElement],
    crop: Option<&Crop>,
    cfg: &ProtoCfg,
) -> (Map, BuildReport) {
    let geom = cfg.geom();
    let mut report = BuildReport::default();
    let fill = tiling.fill_region(cfg.fill_override).placements();
    report.fill_placements = fill.len();

    let placements = element_placements(tiling, elements, geom.tolerance, &mut report);
    let motifs = build_motifs(tiling, elements, &placements, geom);

    // A tile without placements already maps to `[identity]` here.
    let mut map = if elements.len() == 1
        && is_single_identity(&fill)
        && is_single_identity(&placements[0])
    {
        report.short_circuited = true;
        motifs.into_iter().next().unwrap_or_default()
    } else {
        let mut acc = Map::with_tolerance(geom.tolerance);
        for (motif, places) in motifs.iter().zip(&placements) {
            let mut unit = Map::with_tolerance(geom.tolerance);
            unit.merge_many(motif, places);
            acc.merge_many(&unit, &fill);
        }
        acc
    };
    map.set_tolerance(cfg.sensitivity);
    debug!(
        elements = elements.len(),
        fill = fill.len(),
        short_circuited = report.short_circuited,
        vertices = map.num_vertices(),
        edges = map.num_edges(),
        "prototype merged"
    );

    if let Some(c) = crop {
        c.run(&mut map, geom);
    }
    if !cfg.cleanse_level.is_empty() {
        report.cleansed = cleanse(&mut map, cfg.cleanse_level, cfg.sensitivity);
    }
    if !map.verify(true) {
        let summary = map.summary();
        record(&mut report, ProtoWarning::Inconsistent { summary });
    }
    report.vertices = map.num_vertices();
    report.edges = map.num_edges();
    debug!(
        vertices = report.vertices,
        edges = report.edges,
        cleansed = %report.cleansed,
        warnings = report.warnings.len(),
        "prototype built"
    );
    (map, report)
}
