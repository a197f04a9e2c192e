//! Behavioural tests for map rendering and teardown.

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use waymark_core::test_support::{MALFORMED_GPX, THREE_POINT_GPX};
use waymark_map::{
    BatchReport, ElevationProfile, LayerKey, MapLayerRegistry, MarkerId, RenderOptions,
    RouteSource, SceneHandle, SceneSurface, render_route_batch, render_route_source,
};

struct View {
    registry: MapLayerRegistry<SceneSurface>,
    scene: SceneHandle,
}

#[fixture]
fn view() -> RefCell<View> {
    let surface = SceneSurface::new();
    let scene = surface.handle();
    RefCell::new(View {
        registry: MapLayerRegistry::new(surface),
        scene,
    })
}

#[fixture]
fn batch() -> RefCell<Vec<RouteSource>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn report() -> RefCell<Option<BatchReport>> {
    RefCell::new(None)
}

#[fixture]
fn profile() -> RefCell<(ElevationProfile, Option<MarkerId>)> {
    RefCell::new((ElevationProfile::new(), None))
}

#[given("a map showing two rendered routes")]
fn two_routes(#[from(view)] view: &RefCell<View>) {
    let mut view = view.borrow_mut();
    for id in [1, 2] {
        render_route_source(
            &mut view.registry,
            &LayerKey::route(id),
            THREE_POINT_GPX,
            None,
            &RenderOptions::default(),
        )
        .expect("route renders");
    }
    assert!(view.scene.live_artifacts() > 0);
}

#[given("a batch with one valid and one malformed track")]
fn mixed_batch(#[from(batch)] batch: &RefCell<Vec<RouteSource>>) {
    *batch.borrow_mut() = vec![
        RouteSource {
            key: LayerKey::route(10),
            raw: THREE_POINT_GPX.to_owned(),
            record: None,
        },
        RouteSource {
            key: LayerKey::route(11),
            raw: MALFORMED_GPX.to_owned(),
            record: None,
        },
    ];
}

#[given("an elevation profile for the first route with a cursor")]
fn profile_with_cursor(
    #[from(view)] view: &RefCell<View>,
    #[from(profile)] profile: &RefCell<(ElevationProfile, Option<MarkerId>)>,
) {
    let mut view = view.borrow_mut();
    let rendered = render_route_source(
        &mut view.registry,
        &LayerKey::route(1),
        THREE_POINT_GPX,
        None,
        &RenderOptions::default(),
    )
    .expect("route renders");
    let mut profile = profile.borrow_mut();
    let (loaded, cursor) = &mut *profile;
    loaded.load(&rendered.metrics);
    *cursor = loaded
        .attach_cursor(&mut view.registry, &LayerKey::new("profile-cursor"))
        .expect("cursor attaches");
}

#[when("the view is cleared")]
fn clear_view(#[from(view)] view: &RefCell<View>) {
    view.borrow_mut().registry.clear_all().expect("clear");
}

#[when("the batch is rendered")]
fn render_batch(
    #[from(view)] view: &RefCell<View>,
    #[from(batch)] batch: &RefCell<Vec<RouteSource>>,
    #[from(report)] report: &RefCell<Option<BatchReport>>,
) {
    let sources = batch.borrow().clone();
    let outcome = render_route_batch(&mut view.borrow_mut().registry, sources, &RenderOptions::default())
        .expect("surface healthy");
    *report.borrow_mut() = Some(outcome);
}

#[when("the chart is hovered at the last sample")]
fn hover_last(
    #[from(view)] view: &RefCell<View>,
    #[from(profile)] profile: &RefCell<(ElevationProfile, Option<MarkerId>)>,
) {
    let profile = profile.borrow();
    let last = profile.0.samples().len().saturating_sub(1);
    profile
        .0
        .on_hover(&mut view.borrow_mut().registry, last)
        .expect("hover");
}

#[then("no artifacts remain on the surface")]
fn nothing_left(#[from(view)] view: &RefCell<View>) {
    let view = view.borrow();
    assert_eq!(view.scene.live_artifacts(), 0);
    assert_eq!(view.registry.total_handles(), 0);
}

#[then("the valid track is drawn")]
fn valid_drawn(
    #[from(view)] view: &RefCell<View>,
    #[from(report)] report: &RefCell<Option<BatchReport>>,
) {
    let borrow = report.borrow();
    let report = borrow.as_ref().expect("batch rendered");
    assert_eq!(report.rendered_keys().collect::<Vec<_>>(), vec![&LayerKey::route(10)]);
    assert!(view.borrow().registry.handle_count(&LayerKey::route(10)) > 0);
}

#[then("the malformed track is reported as skipped")]
fn malformed_skipped(
    #[from(view)] view: &RefCell<View>,
    #[from(report)] report: &RefCell<Option<BatchReport>>,
) {
    let borrow = report.borrow();
    let report = borrow.as_ref().expect("batch rendered");
    assert_eq!(report.skipped_keys().collect::<Vec<_>>(), vec![&LayerKey::route(11)]);
    assert_eq!(view.borrow().registry.handle_count(&LayerKey::route(11)), 0);
}

#[then("the cursor sits on the last track point")]
fn cursor_on_last(
    #[from(view)] view: &RefCell<View>,
    #[from(profile)] profile: &RefCell<(ElevationProfile, Option<MarkerId>)>,
) {
    let marker = profile.borrow().1.expect("cursor attached");
    assert_eq!(
        view.borrow().scene.marker_position(marker),
        Some(Coord { x: 0.01, y: 0.02 })
    );
}

#[scenario(path = "tests/features/map_registry.feature", index = 0)]
fn teardown_removes_everything(view: RefCell<View>) {
    let _ = view;
}

#[scenario(path = "tests/features/map_registry.feature", index = 1)]
fn batch_isolates_failures(
    view: RefCell<View>,
    batch: RefCell<Vec<RouteSource>>,
    report: RefCell<Option<BatchReport>>,
) {
    let _ = (view, batch, report);
}

#[scenario(path = "tests/features/map_registry.feature", index = 2)]
fn profile_drives_cursor(view: RefCell<View>, profile: RefCell<(ElevationProfile, Option<MarkerId>)>) {
    let _ = (view, profile);
}
