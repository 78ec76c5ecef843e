use super::*;
use crate::geom2::Aff2;
use nalgebra::vector;

fn unit_square() -> Map {
    let mut m = Map::new();
    let pts = [
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ];
    for k in 0..4 {
        m.insert_edge_pts(pts[k], pts[(k + 1) % 4]);
    }
    m
}

#[test]
fn insert_vertex_reuses_within_tolerance() {
    let mut m = Map::with_tolerance(1e-9);
    let a = m.insert_vertex(vector![1.0, 2.0]);
    let b = m.insert_vertex(vector![1.0 + 1e-6, 2.0]);
    let c = m.insert_vertex(vector![1.1, 2.0]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(m.num_vertices(), 2);
}

#[test]
fn degenerate_and_duplicate_edges_are_skipped() {
    let mut m = Map::new();
    let a = m.insert_vertex(vector![0.0, 0.0]);
    let b = m.insert_vertex(vector![1.0, 0.0]);
    assert!(m.insert_edge(a, a).is_none());
    assert!(m.insert_edge_pts(vector![3.0, 3.0], vector![3.0, 3.0]).is_none());
    assert_eq!(m.num_edges(), 0);

    let e = m.insert_edge(a, b).expect("edge");
    // Same unordered pair in either direction is a no-op returning the original.
    assert_eq!(m.insert_edge(b, a), Some(e));
    assert_eq!(m.insert_edge(a, b), Some(e));
    assert_eq!(m.num_edges(), 1);

    // Unknown endpoint ids are rejected.
    assert!(m.insert_edge(a, VertexId(99)).is_none());
}

#[test]
fn remove_vertex_leaves_dangling_edges() {
    let mut m = unit_square();
    assert!(m.is_consistent());
    let v = m.find_vertex(vector![1.0, 1.0]).expect("corner");
    m.remove_vertex(v);
    assert_eq!(m.num_vertices(), 3);
    assert_eq!(m.num_edges(), 4);
    let d = m.defects();
    assert_eq!(d.missing_endpoints, 2);
    assert!(!m.is_consistent());
    // Repair drops the dangling edges; the rest is consistent.
    assert!(m.verify(true));
    assert_eq!(m.num_edges(), 2);
}

#[test]
fn remove_edge_shifts_later_ids() {
    let mut m = unit_square();
    let last = m.edges()[3];
    let removed = m.remove_edge(EdgeId(0)).expect("edge 0");
    assert_eq!(m.num_edges(), 3);
    assert_eq!(m.edges()[2], last);
    assert_ne!(removed, last);
    assert!(m.remove_edge(EdgeId(10)).is_none());
}

#[test]
fn merge_is_not_deduplicating() {
    let sq = unit_square();
    let mut m = Map::new();
    m.merge_map(&sq);
    m.merge_map(&sq);
    assert_eq!(m.num_vertices(), 8);
    assert_eq!(m.num_edges(), 8);
    let d = m.defects();
    assert_eq!(d.near_vertices, 4);
    assert!(!d.is_clean());
    assert!(m.verify(true));
    assert_eq!(m.num_vertices(), 4);
    assert_eq!(m.num_edges(), 4);
}

#[test]
fn merge_many_places_copies() {
    let sq = unit_square();
    let mut m = Map::new();
    let placements: Vec<Aff2> = (0..3)
        .map(|h| Aff2::translation(vector![h as f64, 0.0]))
        .collect();
    m.merge_many(&sq, &placements);
    assert_eq!(m.num_vertices(), 12);
    assert_eq!(m.num_edges(), 12);
    assert!(m.verify(true));
    // Three squares in a row share two vertical edges.
    assert_eq!(m.num_vertices(), 8);
    assert_eq!(m.num_edges(), 10);
    let b = m.bounds().expect("bounds");
    assert!((b.max.x - 3.0).abs() < 1e-12);
}

#[test]
fn reflection_flips_arc_convexity() {
    let mut m = Map::new();
    let a = m.insert_vertex(vector![1.0, 0.0]);
    let b = m.insert_vertex(vector![0.0, 1.0]);
    m.insert_arc(a, b, vector![0.0, 0.0], true).expect("arc");
    let refl = Aff2 {
        m: nalgebra::matrix![-1.0, 0.0; 0.0, 1.0],
        t: vector![2.0, 0.0],
    };
    let r = m.transformed(&refl);
    match r.edges()[0].kind {
        EdgeKind::Arc { center, convex } => {
            assert!(!convex);
            assert!((center - vector![2.0, 0.0]).norm() < 1e-12);
        }
        other => panic!("expected arc, got {other:?}"),
    }
    // Pure translation keeps convexity.
    let t = m.transformed(&Aff2::translation(vector![1.0, 1.0]));
    assert!(matches!(t.edges()[0].kind, EdgeKind::Arc { convex: true, .. }));
}

#[test]
fn sort_is_canonical() {
    let mut a = unit_square();
    // Same square built in another order.
    let mut b = Map::new();
    b.insert_edge_pts(vector![0.0, 1.0], vector![0.0, 0.0]);
    b.insert_edge_pts(vector![1.0, 1.0], vector![0.0, 1.0]);
    b.insert_edge_pts(vector![1.0, 0.0], vector![1.0, 1.0]);
    b.insert_edge_pts(vector![0.0, 0.0], vector![1.0, 0.0]);
    a.sort();
    b.sort();
    assert_eq!(a.vertices(), b.vertices());
    let ka: Vec<_> = a.edges().iter().map(|e| e.key()).collect();
    let kb: Vec<_> = b.edges().iter().map(|e| e.key()).collect();
    assert_eq!(ka, kb);
    assert_eq!(a.position(VertexId(0)), Some(vector![0.0, 0.0]));
}

#[test]
fn neighbour_map_lists_edges_in_insertion_order() {
    let m = unit_square();
    let nm = NeighbourMap::new(&m);
    let origin = m.find_vertex(vector![0.0, 0.0]).expect("origin");
    let list = nm.neighbours(&m, origin).expect("current");
    assert_eq!(list, &[EdgeId(0), EdgeId(3)]);
    assert_eq!(nm.degree(&m, origin), Some(2));
    let adj = nm.adjacent_vertices(&m, origin).expect("current");
    assert_eq!(adj.len(), 2);
}

#[test]
fn neighbour_map_refresh_follows_mutation() {
    let mut m = unit_square();
    let mut nm = NeighbourMap::new(&m);
    assert!(nm.is_current(&m));
    m.insert_edge_pts(vector![0.0, 0.0], vector![1.0, 1.0]);
    assert!(!nm.is_current(&m));
    nm.refresh(&m);
    assert!(nm.is_current(&m));
    let origin = m.find_vertex(vector![0.0, 0.0]).expect("origin");
    assert_eq!(nm.degree(&m, origin), Some(3));
    // Clones share a generation until one of them mutates.
    let mut c = m.clone();
    assert!(nm.is_current(&c));
    c.clear();
    assert!(!nm.is_current(&c));
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "stale NeighbourMap"))]
fn stale_neighbour_map_never_answers() {
    let mut m = unit_square();
    let nm = NeighbourMap::new(&m);
    m.insert_edge_pts(vector![0.0, 0.0], vector![1.0, 1.0]);
    assert!(nm.neighbours(&m, VertexId(0)).is_none());
}

#[test]
fn summary_reports_counts_and_state() {
    let mut m = unit_square();
    assert_eq!(m.summary(), "4 vertices, 4 edges (consistent)");
    m.insert_vertex(vector![5.0, 5.0]);
    assert!(m.summary().contains("isolated vertices 1"));
    assert!(!m.verify(false));
    assert_eq!(m.num_vertices(), 5);
    assert!(m.verify(true));
    assert_eq!(m.num_vertices(), 4);
}

#[test]
fn serde_round_trip_keeps_geometry() {
    let m = unit_square();
    let json = serde_json::to_string(&m).expect("serialize");
    let back: Map = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.vertices(), m.vertices());
    assert_eq!(back.edges(), m.edges());
    assert!((back.tolerance() - m.tolerance()).abs() < 1e-30);
}
