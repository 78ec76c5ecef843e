//! Map cleanser: batch repair passes restoring map invariants.
//!
//! Purpose
//! - Merging motif maps under many placements leaves coincident vertices,
//!   duplicate edges and unsplit crossings behind. The cleanser repairs them in
//!   a fixed pass order selected by `CleanseFlags`.
//!
//! Pass order (later passes consume earlier output)
//! 1. coalesce points, 2. join collinear edges, 3. divide intersecting edges,
//! 4. remove bad edges, 5. remove dangling (degree 1) vertices,
//! 6. remove isolated (degree 0) vertices, 7. de-duplicate edges.
//!
//! Notes
//! - Each pass runs to its own fixed point: coalescing and joining repeat
//!   internally, and dangling removal peels whole open chains in one call.
//! - `cleanse` repeats the selected sequence until a whole round changes
//!   nothing, so a second call with the same flags is a no-op. A round only
//!   repeats when one pass exposes work for another (a pruned stem leaving
//!   a collinear vertex, a dedup leaving a leaf).
//! - Open geometry survives unless `REMOVE_DANGLING` is selected; the
//!   default level `VERIFY_FIX` leaves it alone.
//! - All comparisons use absolute tolerances; pattern coordinates live in a
//!   bounded range. Positional tolerance is a squared distance.
//!
//! Code cross-refs: `map::Map::verify`, `prototype::Prototype`

mod flags;
mod passes;

pub use flags::CleanseFlags;
pub use passes::{
    coalesce_points, dedup_edges, divide_intersecting, join_collinear, prune_dangling,
    remove_bad_edges, remove_vertices_with_degree,
};

use tracing::{debug, warn};

use crate::cfg::MAX_ROUNDS;
use crate::geom2::GeomCfg;
use crate::map::Map;

/// Run the selected passes until a fixed point. Returns the passes that
/// changed the map at least once.
pub fn cleanse(map: &mut Map, flags: CleanseFlags, tolerance: f64) -> CleanseFlags {
    let mut changed = CleanseFlags::NONE;
    if flags.is_empty() {
        return changed;
    }
    let (v0, e0) = (map.num_vertices(), map.num_edges());
    for round in 0..MAX_ROUNDS {
        let round_changed = run_round(map, flags, tolerance);
        if round_changed.is_empty() {
            debug!(
                %flags,
                %changed,
                rounds = round + 1,
                vertices = format_args!("{v0} -> {}", map.num_vertices()),
                edges = format_args!("{e0} -> {}", map.num_edges()),
                "cleanse"
            );
            return changed;
        }
        changed |= round_changed;
    }
    warn!(%flags, rounds = MAX_ROUNDS, "cleanse stopped before reaching a fixed point");
    changed
}

/// Run every pass once, in order, on a scratch copy and report which passes
/// changed vertex or edge counts. `map` itself is not modified.
pub fn analyze(map: &Map, tolerance: f64) -> CleanseFlags {
    let mut scratch = map.clone();
    let mut changed = CleanseFlags::NONE;
    for pass in CleanseFlags::PASSES {
        let before = (scratch.num_vertices(), scratch.num_edges());
        run_pass(&mut scratch, pass, tolerance);
        if before != (scratch.num_vertices(), scratch.num_edges()) {
            changed |= pass;
        }
    }
    changed
}

fn run_round(map: &mut Map, flags: CleanseFlags, tolerance: f64) -> CleanseFlags {
    let mut changed = CleanseFlags::NONE;
    for pass in CleanseFlags::PASSES {
        if flags.contains(pass) && run_pass(map, pass, tolerance) > 0 {
            changed |= pass;
        }
    }
    changed
}

fn run_pass(map: &mut Map, pass: CleanseFlags, tolerance: f64) -> usize {
    match pass {
        CleanseFlags::COALESCE_POINTS => coalesce_points(map, tolerance),
        CleanseFlags::JOIN_COLLINEAR => join_collinear(map, tolerance),
        CleanseFlags::DIVIDE_INTERSECTING => {
            divide_intersecting(map, GeomCfg::with_tolerance(tolerance))
        }
        CleanseFlags::REMOVE_BAD_EDGES => remove_bad_edges(map, tolerance),
        CleanseFlags::REMOVE_DANGLING => prune_dangling(map),
        CleanseFlags::REMOVE_ISOLATED => remove_vertices_with_degree(map, 0),
        CleanseFlags::DEDUP_EDGES => dedup_edges(map),
        _ => 0,
    }
}
