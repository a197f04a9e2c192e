#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

//! Behavioural tests for `RoutePlanner` using rstest-bdd.

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use waymark_core::test_support::{StubDirectionsProvider, straight_route};
use waymark_core::{RouteAlternative, Waypoint};
use waymark_map::{MapLayerRegistry, SceneHandle, SceneSurface};
use waymark_planner::{PlannerState, RoutePlanner, RouteRequest};

struct PlannerWorld {
    planner: RefCell<RoutePlanner>,
    registry: RefCell<MapLayerRegistry<SceneSurface>>,
    scene: SceneHandle,
    provider: RefCell<StubDirectionsProvider>,
    stops: RefCell<Vec<Waypoint>>,
    requests: RefCell<Vec<RouteRequest>>,
}

impl PlannerWorld {
    fn new() -> Self {
        let surface = SceneSurface::new();
        let scene = surface.handle();
        Self {
            planner: RefCell::new(RoutePlanner::new()),
            registry: RefCell::new(MapLayerRegistry::new(surface)),
            scene,
            provider: RefCell::new(StubDirectionsProvider::straight_line(1.0, 1.0)),
            stops: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn resolve(&self, request: &RouteRequest) {
        self.planner
            .borrow_mut()
            .resolve(
                &*self.provider.borrow(),
                request,
                &mut *self.registry.borrow_mut(),
            )
            .expect("route resolves");
    }

    fn apply(&self, request: &RouteRequest, route: RouteAlternative) {
        self.planner
            .borrow_mut()
            .apply_response(
                request.token,
                Ok(vec![route]),
                &mut *self.registry.borrow_mut(),
            )
            .expect("response handled");
    }

    fn last_coordinates(&self) -> Vec<Coord<f64>> {
        self.requests
            .borrow()
            .last()
            .map(|request| request.directions.coordinates().to_vec())
            .expect("a request was issued")
    }

    fn stop_coordinates(&self) -> Vec<Coord<f64>> {
        self.stops.borrow().iter().map(Waypoint::coord).collect()
    }
}

fn via_stop() -> Waypoint {
    Waypoint::at(51.51, -0.1)
}

#[fixture]
fn world() -> PlannerWorld {
    PlannerWorld::new()
}

#[given("an origin and a destination")]
fn given_endpoints(world: &PlannerWorld) {
    world
        .stops
        .replace(vec![Waypoint::at(51.5, -0.12), Waypoint::at(51.52, -0.08)]);
}

#[given("a directions service answering 5000 metres in 900 seconds")]
fn given_service(world: &PlannerWorld) {
    world
        .provider
        .replace(StubDirectionsProvider::straight_line(5000.0, 900.0));
}

fn calculate(world: &PlannerWorld) {
    let mut planner = world.planner.borrow_mut();
    for stop in world.stops.borrow().iter() {
        let transition = planner.select_waypoint(stop.clone()).expect("stop selected");
        if let Some(request) = transition.into_request() {
            world.requests.borrow_mut().push(request);
        }
    }
    drop(planner);
    let request = world
        .requests
        .borrow()
        .last()
        .cloned()
        .expect("selection issues a request");
    world.resolve(&request);
}

#[given("the route has been calculated")]
fn given_calculated(world: &PlannerWorld) {
    calculate(world);
    assert_eq!(world.planner.borrow().state(), PlannerState::Calculated);
}

#[when("the route is resolved")]
fn when_resolved(world: &PlannerWorld) {
    calculate(world);
}

#[when("a via stop is inserted")]
fn when_via_inserted(world: &PlannerWorld) {
    let request = {
        let mut planner = world.planner.borrow_mut();
        planner.add_waypoint().expect("add waypoint");
        planner
            .select_waypoint(via_stop())
            .expect("via selected")
            .into_request()
            .expect("request issued")
    };
    world.requests.borrow_mut().push(request.clone());
    world.resolve(&request);
}

#[when("the via stop is removed")]
fn when_via_removed(world: &PlannerWorld) {
    let request = world
        .planner
        .borrow_mut()
        .remove_waypoint(1)
        .expect("remove waypoint");
    world.requests.borrow_mut().push(request.clone());
    world.resolve(&request);
}

#[when("two route requests are issued before either resolves")]
fn when_two_requests(world: &PlannerWorld) {
    let mut planner = world.planner.borrow_mut();
    let earlier = planner
        .load_waypoints(world.stops.borrow().clone())
        .expect("first request");
    let later = planner.issue_request().expect("second request");
    world.requests.replace(vec![earlier, later]);
}

#[when("the later request resolves first")]
fn when_later_resolves(world: &PlannerWorld) {
    let later = world.requests.borrow().last().cloned().expect("later request");
    world.apply(&later, straight_route(&world.stop_coordinates(), 2000.0, 600.0));
}

#[when("the earlier request resolves afterwards")]
fn when_earlier_resolves(world: &PlannerWorld) {
    let earlier = world
        .requests
        .borrow()
        .first()
        .cloned()
        .expect("earlier request");
    world.apply(&earlier, straight_route(&world.stop_coordinates(), 9000.0, 3600.0));
}

#[when("the route is cleared")]
fn when_cleared(world: &PlannerWorld) {
    world
        .planner
        .borrow_mut()
        .clear_route(&mut *world.registry.borrow_mut())
        .expect("route cleared");
}

#[then("the summary reads 5.0 km and 15 min")]
fn then_summary(world: &PlannerWorld) {
    let summary = world.planner.borrow().summary().expect("route displayed");
    assert_eq!(summary.distance_label(), "5.0 km");
    assert_eq!(summary.duration_label(), "15 min");
}

#[then("the last request runs through origin, via stop and destination")]
fn then_three_stops(world: &PlannerWorld) {
    let stops = world.stop_coordinates();
    let expected = vec![
        stops.first().copied().expect("origin"),
        via_stop().coord(),
        stops.last().copied().expect("destination"),
    ];
    assert_eq!(world.last_coordinates(), expected);
}

#[then("the last request runs through origin and destination")]
fn then_two_stops(world: &PlannerWorld) {
    assert_eq!(world.last_coordinates(), world.stop_coordinates());
}

#[then("the displayed route comes from the later request")]
fn then_later_displayed(world: &PlannerWorld) {
    let summary = world.planner.borrow().summary().expect("route displayed");
    assert_eq!(summary.distance_label(), "2.0 km");
    assert_eq!(summary.duration_label(), "10 min");
}

#[then("the planner is idle with no waypoints")]
fn then_idle(world: &PlannerWorld) {
    let planner = world.planner.borrow();
    assert_eq!(planner.state(), PlannerState::Idle);
    assert!(planner.waypoints().is_empty());
    assert!(planner.displayed_route().is_none());
}

#[then("no route artifacts remain on the map")]
fn then_no_artifacts(world: &PlannerWorld) {
    assert_eq!(world.scene.live_artifacts(), 0);
    assert_eq!(world.registry.borrow().total_handles(), 0);
}

#[scenario(path = "tests/features/route_planner.feature", index = 0)]
fn calculated_summary(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 1)]
fn via_stop_round_trip(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 2)]
fn out_of_order_responses(world: PlannerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 3)]
fn clearing_the_route(world: PlannerWorld) {
    let _ = world;
}
