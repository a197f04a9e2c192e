//! Behavioural tests for the HTTP clients against a canned local server.

mod support;

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::{CannedServer, closed_base_url};
use waymark_core::test_support::THREE_POINT_GPX;
use waymark_core::{
    CatalogError, DirectionsProvider, DirectionsRequest, RouteAlternative, RouteCatalog,
    RoutePreference, RouteRecord, RoutingError, TravelMode, parse_track,
};
use waymark_data::{HttpDirectionsProvider, HttpRouteCatalog};

const TWO_ROUTES: &str = r#"{
    "code": "Ok",
    "routes": [
        {"distance": 2400.0, "duration": 1800.0,
         "geometry": {"type": "LineString", "coordinates": [[-0.12, 51.5], [-0.08, 51.52]]}},
        {"distance": 2900.0, "duration": 2100.0,
         "geometry": {"type": "LineString", "coordinates": [[-0.12, 51.5], [-0.1, 51.49], [-0.08, 51.52]]}}
    ]
}"#;

const NO_ROUTE: &str = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;

const ONE_ROUTE: &str = r#"[{
    "id": 1,
    "name": "Canal Towpath",
    "difficulty": "easy",
    "trackFile": "/files/towpath.gpx",
    "distance": 8200.0,
    "elevationGain": 35.0,
    "elevationMin": 12.0,
    "elevationMax": 30.0
}]"#;

#[derive(Default)]
struct ClientWorld {
    server: RefCell<Option<CannedServer>>,
    base_url: RefCell<String>,
    routes: RefCell<Option<Result<Vec<RouteAlternative>, RoutingError>>>,
    records: RefCell<Vec<RouteRecord>>,
    track_file: RefCell<Option<String>>,
    catalog_error: RefCell<Option<CatalogError>>,
}

impl ClientWorld {
    fn serve(&self, responses: Vec<(u16, String)>) {
        let server = CannedServer::start(responses);
        self.base_url.replace(server.base_url().to_owned());
        self.server.replace(Some(server));
    }

    fn request_lines(&self) -> Vec<String> {
        self.server
            .borrow_mut()
            .take()
            .map(CannedServer::finish)
            .unwrap_or_default()
    }

    fn routes(&self) -> Result<Vec<RouteAlternative>, RoutingError> {
        self.routes.borrow().clone().expect("a route was requested")
    }

    fn catalog(&self) -> HttpRouteCatalog {
        HttpRouteCatalog::new(self.base_url.borrow().as_str()).expect("catalogue builds")
    }
}

#[fixture]
fn world() -> ClientWorld {
    ClientWorld::default()
}

#[given("a directions service answering with two routes")]
fn given_two_routes(world: &ClientWorld) {
    world.serve(vec![(200, TWO_ROUTES.to_owned())]);
}

#[given("a directions service answering NoRoute")]
fn given_no_route(world: &ClientWorld) {
    world.serve(vec![(400, NO_ROUTE.to_owned())]);
}

#[given("a directions service that is not running")]
fn given_unreachable(world: &ClientWorld) {
    world.base_url.replace(closed_base_url());
}

#[when("a walking route is requested between two stops")]
fn when_route_requested(world: &ClientWorld) {
    let provider =
        HttpDirectionsProvider::new(world.base_url.borrow().as_str()).expect("provider builds");
    let request = DirectionsRequest::new(
        vec![Coord { x: -0.12, y: 51.5 }, Coord { x: -0.08, y: 51.52 }],
        TravelMode::Walking,
        RoutePreference::Fastest,
    )
    .expect("valid request");
    world.routes.replace(Some(provider.route(&request)));
}

#[then("two alternatives are returned")]
fn then_two_alternatives(world: &ClientWorld) {
    let routes = world.routes().expect("routes fetched");
    assert_eq!(routes.len(), 2);
    assert_eq!(routes.first().map(|route| route.distance_m), Some(2400.0));
    assert_eq!(routes.get(1).map(|route| route.geometry.0.len()), Some(3));
}

#[then("the service was asked for full geometry with steps")]
fn then_query_options(world: &ClientWorld) {
    let lines = world.request_lines();
    let line = lines.first().expect("one request served");
    assert!(line.starts_with("GET /route/v1/walking/-0.12,51.5;-0.08,51.52?"));
    assert!(line.contains("alternatives=true"));
    assert!(line.contains("steps=true"));
    assert!(line.contains("geometries=geojson"));
    assert!(line.contains("overview=full"));
}

#[then("no alternatives are returned")]
fn then_no_alternatives(world: &ClientWorld) {
    assert_eq!(world.routes(), Ok(Vec::new()));
}

#[then("a network error is returned")]
fn then_network_error(world: &ClientWorld) {
    let err = world.routes().expect_err("unreachable service fails");
    assert!(
        matches!(err, RoutingError::NetworkError { .. }),
        "unexpected error: {err:?}"
    );
}

#[given("a catalogue serving one route and its track file")]
fn given_catalogue(world: &ClientWorld) {
    world.serve(vec![
        (200, ONE_ROUTE.to_owned()),
        (200, THREE_POINT_GPX.to_owned()),
    ]);
}

#[given("a catalogue without route 42")]
fn given_missing_route(world: &ClientWorld) {
    world.serve(vec![(404, r#"{"error": "not found"}"#.to_owned())]);
}

#[when("the routes are listed and the first track file is fetched")]
fn when_listed(world: &ClientWorld) {
    let catalog = world.catalog();
    let records = catalog.list_routes().expect("routes listed");
    let reference = records
        .first()
        .map(|record| record.track_file.clone())
        .expect("one route");
    let gpx = catalog.fetch_track_file(&reference).expect("track fetched");
    world.records.replace(records);
    world.track_file.replace(Some(gpx));
}

#[when("route 42 is fetched")]
fn when_fetch_missing(world: &ClientWorld) {
    let err = world.catalog().fetch_route(42).expect_err("route is missing");
    world.catalog_error.replace(Some(err));
}

#[then("the route carries its published statistics")]
fn then_route_stats(world: &ClientWorld) {
    let records = world.records.borrow();
    let record = records.first().expect("one route");
    assert_eq!(record.name, "Canal Towpath");
    assert_eq!(record.stats.map(|stats| stats.total_distance_m), Some(8200.0));
}

#[then("the track file parses as a GPX track")]
fn then_track_parses(world: &ClientWorld) {
    let gpx = world.track_file.borrow().clone().expect("track fetched");
    let track = parse_track(&gpx).expect("valid GPX");
    assert_eq!(track.point_count(), 3);
    let lines = world.request_lines();
    assert_eq!(
        lines,
        vec![
            "GET /routes HTTP/1.1".to_owned(),
            "GET /files/towpath.gpx HTTP/1.1".to_owned(),
        ]
    );
}

#[then("a not-found error is returned")]
fn then_not_found(world: &ClientWorld) {
    let err = world.catalog_error.borrow().clone().expect("fetch failed");
    assert_eq!(
        err,
        CatalogError::NotFound {
            resource: "route 42".to_owned()
        }
    );
    assert_eq!(world.request_lines(), vec!["GET /routes/42 HTTP/1.1".to_owned()]);
}

#[scenario(path = "tests/features/http_clients.feature", index = 0)]
fn directions_service_routes(world: ClientWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_clients.feature", index = 1)]
fn directions_service_no_route(world: ClientWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_clients.feature", index = 2)]
fn directions_service_unreachable(world: ClientWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_clients.feature", index = 3)]
fn catalogue_lists_and_fetches(world: ClientWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_clients.feature", index = 4)]
fn catalogue_missing_route(world: ClientWorld) {
    let _ = world;
}
