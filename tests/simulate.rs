use zhl16_deco::simulate::square_profile;
use zhl16_deco::{
    advance, compute_schedule, DecoError, DiveState, Parameter, Segment,
    SegmentKind, FN2,
};

fn multilevel() -> [Segment; 6] {
    [
        Segment::travel(40.0, 2.0, FN2),
        Segment::level(40.0, 20.0, FN2),
        Segment::travel(21.0, 2.0, FN2),
        Segment::level(21.0, 15.0, FN2),
        Segment::travel(12.0, 1.0, FN2),
        Segment::level(12.0, 10.0, FN2),
    ]
}

#[cfg(feature = "std")]
#[test]
fn test_replay_profile_from_csv() {
    use csv::Reader;
    use std::vec::Vec;

    let mut rdr = Reader::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/multilevel.csv"
    ))
    .unwrap();
    let mut segments: Vec<Segment> = Vec::new();
    for result in rdr.records() {
        let record = result.unwrap();
        let depth: f64 = record[1].parse().unwrap();
        let duration: f64 = record[2].parse().unwrap();
        let inert_fraction: f64 = record[3].parse().unwrap();
        let segment = match &record[0] {
            "travel" => Segment::travel(depth, duration, inert_fraction),
            "level" => Segment::level(depth, duration, inert_fraction),
            other => panic!("unknown segment kind {}", other),
        };
        segments.push(segment);
    }
    assert_eq!(segments.as_slice(), multilevel().as_slice());

    let state = DiveState::default().advance(&segments).unwrap();
    assert_eq!(state, DiveState::default().advance(&multilevel()).unwrap());
    assert_eq!(state.elapsed_time_minutes(), 50.0);
    assert_eq!(state.current_depth_meters(), 12.0);
}

#[test]
fn test_multilevel_dive_schedule() {
    let state = DiveState::default().advance(&multilevel()).unwrap();
    let (index, ceiling) = state.controlling_compartment(100.0).unwrap();
    assert_eq!(index, 4);
    assert!(ceiling > 1.0);

    let schedule = compute_schedule(&state, &[9.0, 6.0, 3.0], 100.0).unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule.stops()[0].depth_meters, 3.0);
    assert_eq!(schedule.stops()[0].duration_minutes, 18.0);
}

#[test]
fn test_segments_apply_in_order() {
    let segments = multilevel();
    let all_at_once = DiveState::default().advance(&segments).unwrap();
    let mut one_by_one = DiveState::default();
    for segment in segments.iter() {
        one_by_one = advance(&one_by_one, core::slice::from_ref(segment)).unwrap();
    }
    assert_eq!(all_at_once, one_by_one);
}

#[test]
fn test_square_profile() {
    let segments = square_profile(30.0, 20.0, 18.0, FN2).unwrap();
    assert_eq!(segments[0].kind, SegmentKind::Travel);
    assert!((segments[0].duration_minutes - 30.0 / 18.0).abs() < 1e-12);
    assert_eq!(segments[1], Segment::level(30.0, 20.0, FN2));

    let state = DiveState::default().advance(&segments).unwrap();
    assert!((state.elapsed_time_minutes() - (20.0 + 30.0 / 18.0)).abs() < 1e-12);

    assert_eq!(
        square_profile(30.0, 20.0, 0.0, FN2),
        Err(DecoError::InvalidParameter(Parameter::Duration))
    );
}

#[test]
fn test_invalid_segment_leaves_state_alone() {
    let state = DiveState::default();
    let segments = [
        Segment::level(30.0, 10.0, FN2),
        Segment::level(-3.0, 10.0, FN2),
    ];
    assert_eq!(
        state.advance(&segments),
        Err(DecoError::InvalidParameter(Parameter::Depth))
    );
    assert_eq!(
        state.advance(&[Segment::level(30.0, 10.0, 1.5)]),
        Err(DecoError::InvalidParameter(Parameter::InertFraction))
    );
    assert_eq!(
        state.advance(&[Segment::level(30.0, f64::INFINITY, FN2)]),
        Err(DecoError::InvalidParameter(Parameter::Duration))
    );
}

#[test]
fn test_zero_length_travel_only_moves_diver() {
    let state = DiveState::default()
        .advance(&[Segment::level(20.0, 10.0, FN2)])
        .unwrap();
    let moved = state.advance(&[Segment::travel(10.0, 0.0, FN2)]).unwrap();
    assert_eq!(moved.tissue_pressures(), state.tissue_pressures());
    assert_eq!(moved.current_depth_meters(), 10.0);
    assert_eq!(moved.elapsed_time_minutes(), state.elapsed_time_minutes());
}
