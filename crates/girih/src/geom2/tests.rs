use super::*;
use nalgebra::{matrix, vector, Vector2};

#[test]
fn affine_compose_inverse_round_trip() {
    let rot = Aff2::rotation(std::f64::consts::FRAC_PI_2);
    let tr = Aff2::translation(vector![2.0, -1.0]);
    // rotate first, then translate
    let f = tr.compose(&rot);
    let p = f.apply(vector![1.0, 0.0]);
    assert!((p - vector![2.0, 0.0]).norm() < 1e-12);
    let inv = f.inverse().expect("invertible");
    assert!((inv.apply(p) - vector![1.0, 0.0]).norm() < 1e-12);
    assert!(f.compose(&inv).is_identity_eps(1e-12));
    // Reflection reverses orientation, singular maps have no inverse.
    let refl = Aff2 {
        m: matrix![-1.0, 0.0; 0.0, 1.0],
        t: vector![0.0, 0.0],
    };
    assert!(!refl.is_orientation_preserving());
    let sing = Aff2 {
        m: matrix![1.0, 2.0; 2.0, 4.0],
        t: vector![0.0, 0.0],
    };
    assert!(sing.inverse().is_none());
    // Vectors ignore the translation part.
    assert!((tr.apply_vector(vector![1.0, 1.0]) - vector![1.0, 1.0]).norm() < 1e-12);
}

#[test]
fn segment_crossings_interior_vs_touching() {
    let cfg = GeomCfg::default();
    let c = segment_interior_intersection(
        vector![0.0, 0.0],
        vector![2.0, 2.0],
        vector![0.0, 2.0],
        vector![2.0, 0.0],
        cfg,
    )
    .expect("X crossing");
    assert!((c.point - vector![1.0, 1.0]).norm() < 1e-12);
    assert!((c.t - 0.5).abs() < 1e-12 && (c.u - 0.5).abs() < 1e-12);

    // Shared endpoint: closed test finds it, interior test does not.
    let (a, b, d) = (vector![0.0, 0.0], vector![1.0, 0.0], vector![0.0, 1.0]);
    assert!(segment_intersection(a, b, a, d, cfg).is_some());
    assert!(segment_interior_intersection(a, b, a, d, cfg).is_none());

    // T-junction: endpoint of one lies inside the other.
    assert!(segment_interior_intersection(
        vector![0.0, 0.0],
        vector![2.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        cfg
    )
    .is_none());

    // Parallel lines never intersect.
    assert!(line_intersection(a, b, d, vector![1.0, 1.0], cfg).is_none());
}

#[test]
fn polygon_predicates() {
    let square: Vec<Vector2<f64>> = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ];
    assert!((signed_area(&square) - 1.0).abs() < 1e-12);
    let cw: Vec<_> = square.iter().rev().copied().collect();
    assert!((signed_area(&cw) + 1.0).abs() < 1e-12);
    assert!(point_in_polygon(vector![0.5, 0.5], &square));
    assert!(!point_in_polygon(vector![1.5, 0.5], &square));
    assert!((distance_to_segment(vector![0.5, 1.0], square[0], square[1]) - 1.0).abs() < 1e-12);
}

#[test]
fn near_is_squared_distance() {
    let a = vector![0.0, 0.0];
    // distance 1e-5 => squared 1e-10 < 1e-9
    assert!(near(a, vector![1e-5, 0.0], 1e-9));
    // distance 1e-4 => squared 1e-8 > 1e-9
    assert!(!near(a, vector![1e-4, 0.0], 1e-9));
}

#[test]
fn bounds_cover_points() {
    let b = Bounds::from_points([vector![1.0, -2.0], vector![-3.0, 4.0], vector![0.0, 0.0]])
        .expect("non-empty");
    assert_eq!(b.min, vector![-3.0, -2.0]);
    assert_eq!(b.max, vector![1.0, 4.0]);
    assert!((b.width() - 4.0).abs() < 1e-12 && (b.height() - 6.0).abs() < 1e-12);
    assert!(Bounds::from_points(std::iter::empty()).is_none());
}
