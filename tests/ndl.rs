use zhl16_deco::{
    no_decompression_limit, DecoError, DiveState, NoDecoLimit, Parameter, Segment, FN2,
};

fn minutes(limit: NoDecoLimit) -> f64 {
    match limit {
        NoDecoLimit::Minutes(m) => m,
        NoDecoLimit::Unlimited => panic!("expected a finite limit"),
    }
}

#[test]
fn test_ndl_on_air_from_surface() {
    let state = DiveState::default();
    for (depth, expected) in [(12.0, 146.20), (18.0, 53.36), (30.0, 15.39), (40.0, 8.617)] {
        let ndl = minutes(no_decompression_limit(&state, depth, FN2, 100.0).unwrap());
        assert!(
            (ndl - expected).abs() < 0.01,
            "{} m: got {}, expected {}",
            depth,
            ndl,
            expected
        );
    }
}

#[test]
fn test_ndl_edge_matches_ceiling() {
    let surface = DiveState::default();
    for depth in [18.0, 30.0, 40.0] {
        let ndl = minutes(no_decompression_limit(&surface, depth, FN2, 100.0).unwrap());

        let before = surface
            .advance(&[Segment::level(depth, ndl - 0.01, FN2)])
            .unwrap();
        assert!(!before.requires_decompression(100.0).unwrap());

        let after = surface
            .advance(&[Segment::level(depth, ndl + 0.01, FN2)])
            .unwrap();
        assert!(after.requires_decompression(100.0).unwrap());
    }
}

#[test]
fn test_ndl_shrinks_during_dive() {
    let surface = DiveState::default();
    let fresh = minutes(no_decompression_limit(&surface, 30.0, FN2, 100.0).unwrap());

    let state = surface
        .advance(&[Segment::level(30.0, 5.0, FN2)])
        .unwrap();
    let remaining = minutes(state.no_decompression_limit(100.0).unwrap());
    assert!((remaining - (fresh - 5.0)).abs() < 1e-6);
}

#[test]
fn test_ndl_is_zero_in_deco() {
    let state = DiveState::default()
        .advance(&[Segment::level(40.0, 30.0, FN2)])
        .unwrap();
    assert_eq!(
        state.no_decompression_limit(100.0).unwrap(),
        NoDecoLimit::Minutes(0.0)
    );
}

#[test]
fn test_ndl_shallow_is_unlimited() {
    let state = DiveState::default();
    assert_eq!(
        no_decompression_limit(&state, 0.0, FN2, 100.0).unwrap(),
        NoDecoLimit::Unlimited
    );
    assert_eq!(
        no_decompression_limit(&state, 3.0, FN2, 100.0).unwrap(),
        NoDecoLimit::Unlimited
    );
}

#[test]
fn test_ndl_invalid_input() {
    let state = DiveState::default();
    assert_eq!(
        no_decompression_limit(&state, -1.0, FN2, 100.0),
        Err(DecoError::InvalidParameter(Parameter::Depth))
    );
    assert_eq!(
        no_decompression_limit(&state, 30.0, 1.2, 100.0),
        Err(DecoError::InvalidParameter(Parameter::InertFraction))
    );
    assert_eq!(
        no_decompression_limit(&state, 30.0, FN2, 0.0),
        Err(DecoError::InvalidParameter(Parameter::SafetyFactor))
    );
}

#[test]
fn test_safety_factor_leaves_surface_threshold_alone() {
    // the factor stretches ceiling depth below the surface, the surface itself does not move
    let state = DiveState::default();
    let normal = no_decompression_limit(&state, 30.0, FN2, 100.0).unwrap();
    let conservative = no_decompression_limit(&state, 30.0, FN2, 150.0).unwrap();
    assert_eq!(normal, conservative);
}
