//! Walking polylines by arc length.

use approx::assert_relative_eq;
use glam::dvec2;
use vecpath::{MarchLocation, MarchStopReason, PathBuilder, PolylineData, path_march};

fn closed_square(side: f64) -> PolylineData {
    PolylineData::new(vec![
        dvec2(0.0, 0.0),
        dvec2(side, 0.0),
        dvec2(side, side),
        dvec2(0.0, side),
        dvec2(0.0, 0.0),
    ])
    .unwrap()
}

/// March with a fixed step until the first `CompletePolyline`.
fn lap(polyline: &PolylineData, step: f64, threshold: f64) -> Vec<MarchLocation> {
    let mut stops = Vec::new();
    path_march(polyline, 0.0, threshold, |location| {
        stops.push(*location);
        match location.reason {
            MarchStopReason::CompleteStep => step,
            MarchStopReason::CornerPoint => location.remain,
            MarchStopReason::CompletePolyline => f64::NAN,
        }
    });
    stops
}

#[test]
fn one_lap_around_a_square() {
    let square = closed_square(12.0);
    assert!(square.is_closed());
    assert_eq!(square.total_length(), 48.0);

    let stops = lap(&square, 10.0, 180.0);
    let reasons: Vec<_> = stops.iter().map(|s| s.reason).collect();
    assert_eq!(
        reasons,
        [
            MarchStopReason::CompleteStep,
            MarchStopReason::CompleteStep,
            MarchStopReason::CompleteStep,
            MarchStopReason::CompleteStep,
            MarchStopReason::CompleteStep,
            MarchStopReason::CompletePolyline,
        ]
    );
    for (k, stop) in stops[..5].iter().enumerate() {
        assert_relative_eq!(stop.arc_length(&square), 10.0 * k as f64);
        assert_relative_eq!(
            stop.point(&square).distance(square.point_at_arc_length(10.0 * k as f64)),
            0.0,
            epsilon = 1e-12
        );
    }
    assert_relative_eq!(stops[5].remain, 2.0);
}

#[test]
fn fixed_steps_run_on_around_the_loop() {
    for side in [10.0, 12.0, 7.5] {
        let square = closed_square(side);
        let length = square.total_length();
        let per_lap = (length / 10.0).ceil() as usize;

        let mut laps = vec![Vec::new()];
        path_march(&square, 0.0, 180.0, |location| {
            match location.reason {
                MarchStopReason::CompleteStep => {
                    laps.last_mut().unwrap().push(location.arc_length(&square));
                }
                MarchStopReason::CompletePolyline if laps.len() == 3 => return f64::NAN,
                MarchStopReason::CompletePolyline => laps.push(Vec::new()),
                MarchStopReason::CornerPoint => unreachable!("no corner beyond 180 degrees"),
            }
            10.0
        });

        assert_eq!(laps.len(), 3);
        let counts: Vec<_> = laps.iter().map(Vec::len).collect();
        assert_eq!(counts, [per_lap; 3], "side {side}");

        // Every gap is one step, the one across the seam included.
        let positions: Vec<f64> = laps.concat();
        for pair in positions.windows(2) {
            let gap = (pair[1] - pair[0]).rem_euclid(length);
            assert_relative_eq!(gap, 10.0, epsilon = 1e-9);
        }
        // Travel between the first and last steps matches two full laps plus
        // the offset of the last step.
        let travelled = 10.0 * (positions.len() - 1) as f64;
        assert_relative_eq!(
            travelled,
            2.0 * length + positions[positions.len() - 1] - positions[0],
            epsilon = 1e-9
        );
    }
}

#[test]
fn corners_interrupt_long_steps() {
    let square = closed_square(12.0);
    let stops = lap(&square, 10.0, 45.0);
    let corners = stops
        .iter()
        .filter(|s| s.reason == MarchStopReason::CornerPoint)
        .count();
    // Each corner is reported once, after a completed step.
    assert_eq!(corners, 3);
    // Resuming with the remainder keeps the step positions unchanged.
    let steps: Vec<_> = stops
        .iter()
        .filter(|s| s.reason == MarchStopReason::CompleteStep)
        .map(|s| s.arc_length(&square))
        .collect();
    assert_eq!(steps.len(), 5);
    for (k, length) in steps.iter().enumerate() {
        assert_relative_eq!(*length, 10.0 * k as f64, epsilon = 1e-12);
    }
}

#[test]
fn resampling_a_flattened_curve() {
    let path = PathBuilder::new()
        .move_to(dvec2(0.0, 0.0))
        .cubic_to(dvec2(0.0, 60.0), dvec2(100.0, 60.0), dvec2(100.0, 0.0))
        .build();
    let polyline = PolylineData::new(path.flatten(0.1).remove(0)).unwrap();
    let length = polyline.total_length();
    let count = 16;
    let interval = length / count as f64;

    let mut samples = Vec::new();
    path_march(&polyline, 0.0, 90.0, |location| match location.reason {
        MarchStopReason::CompleteStep => {
            samples.push(location.point(&polyline));
            interval
        }
        MarchStopReason::CornerPoint => location.remain,
        MarchStopReason::CompletePolyline => f64::NAN,
    });

    // 0, interval, ..., and possibly the very end depending on rounding.
    assert!(samples.len() == count || samples.len() == count + 1);
    for pair in samples.windows(2) {
        let chord = pair[0].distance(pair[1]);
        assert!(chord <= interval + 1e-9);
        assert!(chord > interval * 0.9);
    }
}
