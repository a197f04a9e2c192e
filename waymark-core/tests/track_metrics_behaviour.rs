//! Behavioural tests for track parsing and metric computation.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::fmt::Write as _;
use waymark_core::{
    MetricsConfig, Track, TrackMetrics, TrackParseError, compute_metrics, parse_track,
};

type ParseOutcome = Option<Result<Track, TrackParseError>>;

#[fixture]
fn document() -> RefCell<String> {
    RefCell::new(String::new())
}

#[fixture]
fn parsed() -> RefCell<ParseOutcome> {
    RefCell::new(None)
}

#[fixture]
fn metrics() -> RefCell<Option<TrackMetrics>> {
    RefCell::new(None)
}

fn wrap_points(points: &str) -> String {
    format!("<gpx><trk><trkseg>{points}</trkseg></trk></gpx>")
}

#[given("a track of three points climbing along the equator")]
fn three_points(#[from(document)] document: &RefCell<String>) {
    *document.borrow_mut() = wrap_points(
        r#"<trkpt lat="0.0" lon="0.0"><ele>0</ele></trkpt>
           <trkpt lat="0.0" lon="0.01"><ele>10</ele></trkpt>
           <trkpt lat="0.02" lon="0.01"><ele>20</ele></trkpt>"#,
    );
}

#[given("a track with a single point")]
fn single_point(#[from(document)] document: &RefCell<String>) {
    *document.borrow_mut() = wrap_points(r#"<trkpt lat="46.5" lon="7.5"><ele>1500</ele></trkpt>"#);
}

#[given("a track of one thousand points")]
fn thousand_points(#[from(document)] document: &RefCell<String>) {
    let mut points = String::new();
    for i in 0..1_000 {
        let lon = f64::from(i) * 0.0001;
        write!(points, r#"<trkpt lat="51.0" lon="{lon}"><ele>{i}</ele></trkpt>"#)
            .expect("write to string");
    }
    *document.borrow_mut() = wrap_points(&points);
}

#[given("a document containing only waypoints")]
fn only_waypoints(#[from(document)] document: &RefCell<String>) {
    *document.borrow_mut() = r#"<gpx><wpt lat="1.0" lon="2.0"/></gpx>"#.to_owned();
}

#[when("I compute metrics for the track")]
fn compute(
    #[from(document)] document: &RefCell<String>,
    #[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>,
) {
    let track = parse_track(&document.borrow()).expect("document parses");
    let computed = compute_metrics(&track, &MetricsConfig::default()).expect("metrics compute");
    *metrics.borrow_mut() = Some(computed);
}

#[when("I parse the document")]
fn parse(
    #[from(document)] document: &RefCell<String>,
    #[from(parsed)] parsed: &RefCell<ParseOutcome>,
) {
    *parsed.borrow_mut() = Some(parse_track(&document.borrow()));
}

#[then("the cumulative distances are 0, 1.112 and 3.336 kilometres")]
fn then_distances(#[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>) {
    let borrow = metrics.borrow();
    let metrics = borrow.as_ref().expect("metrics computed");
    let expected = [0.0, 1.112, 3.336];
    assert_eq!(metrics.samples.len(), expected.len());
    for (sample, want) in metrics.samples.iter().zip(expected) {
        assert!(
            (sample.distance_from_start_km - want).abs() < 1e-3,
            "expected {want} km, got {}",
            sample.distance_from_start_km
        );
    }
}

#[then("the elevation domain spans 0 to 20 metres")]
fn then_domain(#[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>) {
    let borrow = metrics.borrow();
    let domain = borrow.as_ref().expect("metrics computed").elevation_domain();
    assert_eq!((domain.lower, domain.upper), (0.0, 20.0));
}

#[then("exactly one sample is produced at distance zero")]
fn then_single(#[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>) {
    let borrow = metrics.borrow();
    let metrics = borrow.as_ref().expect("metrics computed");
    assert_eq!(metrics.samples.len(), 1);
    assert!(
        metrics
            .samples
            .first()
            .is_some_and(|s| s.distance_from_start_km == 0.0)
    );
}

#[then("at most 201 samples are produced")]
fn then_capped(#[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>) {
    let borrow = metrics.borrow();
    assert!(borrow.as_ref().expect("metrics computed").samples.len() <= 201);
}

#[then("the first and last points are kept")]
fn then_endpoints(#[from(metrics)] metrics: &RefCell<Option<TrackMetrics>>) {
    let borrow = metrics.borrow();
    let metrics = borrow.as_ref().expect("metrics computed");
    assert_eq!(metrics.samples.first().map(|s| s.elevation_m), Some(0.0));
    assert_eq!(metrics.samples.last().map(|s| s.elevation_m), Some(999.0));
}

#[then("parsing fails with no track segments")]
fn then_no_segments(#[from(parsed)] parsed: &RefCell<ParseOutcome>) {
    let borrow = parsed.borrow();
    let outcome = borrow.as_ref().expect("document parsed");
    assert_eq!(outcome.as_ref().err(), Some(&TrackParseError::NoTrackSegments));
}

#[scenario(path = "tests/features/track_metrics.feature", index = 0)]
fn three_point_distances(document: RefCell<String>, metrics: RefCell<Option<TrackMetrics>>) {
    let _ = (document, metrics);
}

#[scenario(path = "tests/features/track_metrics.feature", index = 1)]
fn single_point_track(document: RefCell<String>, metrics: RefCell<Option<TrackMetrics>>) {
    let _ = (document, metrics);
}

#[scenario(path = "tests/features/track_metrics.feature", index = 2)]
fn long_track_downsampled(document: RefCell<String>, metrics: RefCell<Option<TrackMetrics>>) {
    let _ = (document, metrics);
}

#[scenario(path = "tests/features/track_metrics.feature", index = 3)]
fn waypoint_only_document(document: RefCell<String>, parsed: RefCell<ParseOutcome>) {
    let _ = (document, parsed);
}
