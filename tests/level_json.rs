//! Loading levels from the JSON shape shipped with the game.

use bloomvine::analysis::{analyze, audit};
use bloomvine::level::{LevelError, MaskMode};
use bloomvine::solver::{Strategy, Verdict};
use bloomvine::{Direction, Heading, Level, Point, Solver, StructuralError, VineId};

const STAIRCASE: &str = r#"{
    "id": 7,
    "name": "Staircase",
    "grid_size": [5, 4],
    "vines": [
        {"id": "low", "head_direction": "right", "ordered_path": [{"x": 1, "y": 0}, {"x": 0, "y": 0}], "color_index": 2},
        {"id": "mid", "head_direction": "down", "ordered_path": [{"x": 1, "y": 2}, {"x": 1, "y": 3}]},
        {"id": "top", "head_direction": "left", "ordered_path": [{"x": 2, "y": 2}, {"x": 3, "y": 2}, {"x": 3, "y": 3}]}
    ],
    "max_moves": 5,
    "min_moves": 3,
    "extra": "ignored"
}"#;

#[test]
fn load_and_solve() {
    let level = Level::from_json(STAIRCASE).unwrap();

    assert_eq!(level.definition().id, 7);
    assert_eq!(level.grace(), 3);
    assert_eq!(level.vine_count(), 3);
    assert_eq!(level.vine(2).unwrap().head_direction, Heading::Toward(Direction::Left));
    assert_eq!(level.vine(0).unwrap().color_index, Some(2));
    assert_eq!(level.index_of(&VineId::from("mid")), Some(1));

    assert_eq!(format!("{}", level), ".b.c.
.v<c.
.....
a>...
");

    // mid points down the column and only leaves once low has gone, top waits on mid
    let order = Solver::from(&level).solve_sequence().unwrap();
    assert_eq!(order, ["low", "mid", "top"].map(VineId::from));

    let report = Solver::from(&level).check(Strategy::Auto);
    assert_eq!(report.verdict, Verdict::Solvable);

    let analysis = analyze(&level);
    assert_eq!(analysis.max_depth, 1);
    assert!(audit(&level).is_empty());
}

#[test]
fn round_trip_keeps_content() {
    let level = Level::from_json(STAIRCASE).unwrap();
    let again = Level::from_json(&level.to_json().unwrap()).unwrap();

    assert_eq!(level.definition(), again.definition());
}

#[test]
fn masks_and_grace() {
    let json = r#"{
        "grid_size": [3, 3],
        "grace": 4,
        "mask": {"mode": "show", "points": [{"x": 0, "y": 1}, {"x": 1, "y": 1}, {"x": 2, "y": 1}]},
        "vines": [
            {"id": "bar", "head_direction": "right", "ordered_path": [{"x": 1, "y": 1}, {"x": 0, "y": 1}]}
        ]
    }"#;
    let level = Level::from_json(json).unwrap();

    assert_eq!(level.grace(), 4);
    assert_eq!(level.mask().unwrap().mode, MaskMode::Show);
    assert_eq!(format!("{}", level), "###
a>.
###
");
    assert!((level.coverage() - 2.0 / 3.0).abs() < 1e-9);
    assert!(Solver::from(&level).is_solvable_greedy());
}

#[test]
fn unknown_heading_is_kept() {
    let json = r#"{
        "grid_size": [3, 3],
        "vines": [{"id": "odd", "head_direction": "north", "ordered_path": [{"x": 1, "y": 1}, {"x": 1, "y": 0}]}]
    }"#;
    let level = Level::from_json(json).unwrap();

    assert_eq!(level.vine(0).unwrap().head_direction, Heading::Unrecognized("north".into()));
    assert!(level.to_json().unwrap().contains(r#""head_direction":"north""#));
    assert!(!Solver::from(&level).is_solvable_greedy());
    assert_eq!(audit(&level).len(), 1);
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(Level::from_json("{"), Err(LevelError::Parse(_))));
    assert!(matches!(Level::from_json(r#"{"grid_size": [0, 3], "vines": []}"#), Err(LevelError::Parse(_))));
    assert!(matches!(
        Level::from_json(r#"{"grid_size": [3, 3], "mask": {"mode": "sometimes"}, "vines": []}"#),
        Err(LevelError::Parse(_))
    ));

    let overlapping = r#"{
        "grid_size": [3, 3],
        "vines": [
            {"id": "a", "head_direction": "up", "ordered_path": [{"x": 0, "y": 1}, {"x": 0, "y": 0}]},
            {"id": "b", "head_direction": "right", "ordered_path": [{"x": 1, "y": 0}, {"x": 0, "y": 0}]}
        ]
    }"#;
    match Level::from_json(overlapping) {
        Err(LevelError::Structural(errors)) => assert_eq!(errors, vec![StructuralError::Overlap {
            vine: "b".into(),
            other: "a".into(),
            at: Point::new(0, 0),
        }]),
        other => panic!("expected a structural error, got {other:?}"),
    }
}

#[test]
fn rejects_far_jumps_and_huge_grids() {
    // the x distance between these two cells overflows i32
    let leap = r#"{
        "grid_size": [3, 3],
        "vines": [{"id": "far", "head_direction": "right", "ordered_path": [{"x": -2147483648, "y": 0}, {"x": 1, "y": 0}]}]
    }"#;
    match Level::from_json(leap) {
        Err(LevelError::Structural(errors)) => assert_eq!(errors, vec![
            StructuralError::OutOfBounds { vine: "far".into(), at: Point::new(i32::MIN, 0) },
            StructuralError::NonContiguous { vine: "far".into(), index: 1 },
        ]),
        other => panic!("expected a structural error, got {other:?}"),
    }
    assert!(!Point::new(i32::MIN, 0).is_adjacent_to(Point::new(i32::MAX, 0)));

    assert!(matches!(
        Level::from_json(r#"{"grid_size": [4294967296, 4294967296], "vines": []}"#),
        Err(LevelError::Parse(_))
    ));
    assert!(matches!(Level::from_json(r#"{"grid_size": [1025, 1], "vines": []}"#), Err(LevelError::Parse(_))));
    assert!(Level::from_json(r#"{"grid_size": [1024, 1], "vines": []}"#).is_ok());
}
