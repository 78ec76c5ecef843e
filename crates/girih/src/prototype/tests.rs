use super::*;
use crate::cleanse::{cleanse, CleanseFlags};
use crate::crop::CropRegion;
use crate::fill::FillSpec;
use crate::geom2::{Aff2, GeomCfg};
use crate::motif::Motif;
use crate::tiling::Tile;
use nalgebra::vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn square_star() -> DesignElement {
    DesignElement::new(Tile::regular(4), Motif::star(2.0, 1.0))
}

fn cfg_with_fill(fill: FillSpec) -> ProtoCfg {
    ProtoCfg {
        fill_override: Some(fill),
        ..ProtoCfg::default()
    }
}

#[test]
fn single_identity_element_short_circuits() {
    let proto = Prototype::new(Tiling::square(), cfg_with_fill(FillSpec::Singleton))
        .with_element(square_star());
    let motif = square_star().motif.build(&Tile::regular(4), GeomCfg::default());
    let map = proto.proto_map();
    assert_eq!(map.num_vertices(), motif.num_vertices());
    assert_eq!(map.num_edges(), motif.num_edges());
    let report = proto.report();
    assert!(report.short_circuited);
    assert!(report.is_clean());
    assert_eq!(report.fill_placements, 1);
}

#[test]
fn square_fill_shares_mid_points() {
    let proto = Prototype::new(Tiling::square(), cfg_with_fill(FillSpec::square(1)))
        .with_element(square_star());
    let map = proto.proto_map();
    // 9 centres, 24 distinct mid-points, 4 spokes per cell.
    assert_eq!(map.num_vertices(), 33);
    assert_eq!(map.num_edges(), 36);
    let report = proto.report();
    assert!(!report.short_circuited);
    assert!(report.cleansed.contains(CleanseFlags::COALESCE_POINTS));
    assert_eq!(report.vertices, 33);
}

#[test]
fn merge_under_fill_matches_composed_placements() {
    let tiling = Tiling::truncated_square();
    let g = GeomCfg::default();
    let star = Motif::star(3.0, 1.0).build(&tiling.tiles[0].tile, g);
    let places = &tiling.tiles[0].placements;
    let fill = tiling.fill_region(Some(FillSpec::square(1))).placements();

    let mut unit = Map::new();
    unit.merge_many(&star, places);
    let mut staged = Map::new();
    staged.merge_many(&unit, &fill);

    let composed: Vec<Aff2> = fill
        .iter()
        .flat_map(|f| places.iter().map(move |p| f.compose(p)))
        .collect();
    let mut direct = Map::new();
    direct.merge_many(&star, &composed);

    for m in [&mut staged, &mut direct] {
        cleanse(m, CleanseFlags::VERIFY_FIX, g.tolerance);
        m.sort();
    }
    assert_eq!(staged.num_vertices(), direct.num_vertices());
    assert_eq!(staged.num_edges(), direct.num_edges());
    for (a, b) in staged.vertices().iter().zip(direct.vertices()) {
        assert!((a.pt - b.pt).norm() < 1e-9);
    }
}

#[test]
fn inferred_diamonds_build_in_second_pass() {
    let tiling = Tiling::truncated_square();
    let octagon = tiling.tiles[0].tile.clone();
    let diamond = tiling.tiles[1].tile.clone();
    let proto = Prototype::new(tiling, cfg_with_fill(FillSpec::Singleton))
        // Dependent element first: order in the list must not matter.
        .with_element(DesignElement::new(diamond, Motif::Inferred))
        .with_element(DesignElement::new(octagon, Motif::star(3.0, 1.0)));
    let map = proto.proto_map();
    // 16 + 8 vertices less the one mid-point the diamond shares with the octagon.
    assert_eq!(map.num_vertices(), 23);
    assert_eq!(map.num_edges(), 24);
    let report = proto.report();
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert!(!report.short_circuited);
}

#[test]
fn mismatched_design_warns_and_still_builds() {
    let proto = Prototype::new(Tiling::square(), cfg_with_fill(FillSpec::Singleton))
        .with_element(square_star())
        .with_element(DesignElement::new(Tile::regular(6), Motif::star(2.0, 1.0)));
    let map = proto.proto_map();
    assert!(map.num_edges() > 4);
    let report = proto.report();
    assert!(report
        .warnings
        .contains(&ProtoWarning::TileCountMismatch { tiles: 1, elements: 2 }));
    assert!(report
        .warnings
        .contains(&ProtoWarning::UnmatchedTile { index: 1 }));
    assert!(!report.warnings.iter().any(|w| matches!(w, ProtoWarning::Inconsistent { .. })));
}

#[test]
fn setters_invalidate_the_cache() {
    let mut proto = Prototype::new(Tiling::square(), cfg_with_fill(FillSpec::square(1)))
        .with_element(square_star());
    assert!(!proto.is_built());
    let first = proto.proto_map();
    assert!(proto.is_built());
    assert!(Arc::ptr_eq(&first, &proto.proto_map()));

    proto.invalidate();
    assert!(!proto.is_built());
    let second = proto.proto_map();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.num_edges(), second.num_edges());

    proto.set_config(cfg_with_fill(FillSpec::Singleton));
    assert!(!proto.is_built());
    assert_eq!(proto.proto_map().num_edges(), 4);

    proto.set_crop(Some(Crop::new(CropRegion::rect(
        vector![-0.25, -0.25],
        vector![0.25, 0.25],
    ))));
    assert!(!proto.is_built());
    let cropped = proto.proto_map();
    for v in cropped.vertices() {
        assert!(v.pt.x.abs() <= 0.25 + 1e-9 && v.pt.y.abs() <= 0.25 + 1e-9);
    }
    assert_eq!(cropped.num_edges(), 4);

    assert!(proto.remove_element(3).is_none());
    assert!(proto.remove_element(0).is_some());
    assert!(proto.proto_map().is_empty());
    // The first map handed out is untouched.
    assert_eq!(first.num_vertices(), 33);
}

#[test]
fn report_builds_once_and_matches_the_map() {
    let proto = Prototype::new(Tiling::square(), cfg_with_fill(FillSpec::square(1)))
        .with_element(square_star());
    let report = proto.report();
    assert!(proto.is_built());
    let map = proto.proto_map();
    assert_eq!((report.vertices, report.edges), (map.num_vertices(), map.num_edges()));
    assert_eq!(proto.report(), report);
    assert!(Arc::ptr_eq(&map, &proto.proto_map()));
}

#[test]
fn fill_override_wins_over_tiling_fill() {
    let proto = Prototype::new(Tiling::square(), ProtoCfg::default()).with_element(square_star());
    // Tiling::square fills [-2, 2]².
    assert_eq!(proto.report().fill_placements, 25);
    let mut proto = proto;
    proto.set_config(cfg_with_fill(FillSpec::Pack));
    assert_eq!(proto.report().fill_placements, 6);
}

#[test]
fn cached_cell_builds_once() {
    let mut cell: Cached<Vec<u32>> = Cached::new();
    assert!(!cell.is_built());
    let mut calls = 0;
    let a = cell.get_or_build(|| {
        calls += 1;
        vec![1, 2, 3]
    });
    let b = cell.get_or_build(|| {
        calls += 1;
        vec![]
    });
    assert_eq!(calls, 1);
    assert!(Arc::ptr_eq(&a, &b));
    cell.invalidate();
    assert!(cell.get().is_none());
    assert_eq!(a.len(), 3);
}

#[test]
fn random_star_designs_always_verify() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..12 {
        let n = rng.gen_range(3..=12);
        let d = rng.gen_range(1.0..(n as f64 / 2.0 + 0.5));
        let s = rng.gen_range(0..=4) as f64;
        let tiling = Tiling::new("single", vector![10.0, 0.0], vector![0.0, 10.0])
            .with_tile(Tile::regular(n), vec![Aff2::identity()]);
        let proto = Prototype::new(tiling, cfg_with_fill(FillSpec::Pack))
            .with_element(DesignElement::new(Tile::regular(n), Motif::star(d, s)));
        let report = proto.report();
        assert!(report.is_clean(), "n={n} d={d} s={s}: {:?}", report.warnings);
    }
}

#[test]
fn prototype_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Prototype>();
}

#[test]
fn config_and_warnings_serialize() {
    let cfg = cfg_with_fill(FillSpec::Pack);
    let json = serde_json::to_string(&cfg).expect("serialize");
    let back: ProtoCfg = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, cfg);
    let partial: ProtoCfg = serde_json::from_str(r#"{"cleanse_level":127}"#).expect("partial");
    assert_eq!(partial.cleanse_level, CleanseFlags::ALL);
    assert!(partial.fill_override.is_none());
    let w = ProtoWarning::UnmatchedTile { index: 2 };
    assert!(w.to_string().contains("element 2"));
}
