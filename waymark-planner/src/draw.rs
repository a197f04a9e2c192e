//! Drawing a planned route through the map layer registry.

use waymark_core::{RouteAlternative, RouteSummary, Waypoint, WaypointRole};
use waymark_map::{
    EndpointLabels, LayerKey, MapLayerRegistry, MapSurface, MarkerKind, PopupContent,
    RegistryError, StyleHint,
};

/// Key of the `slot`th non-selected alternative drawn beside `key`.
pub(crate) fn alternative_key(key: &LayerKey, slot: usize) -> LayerKey {
    LayerKey::new(format!("{key}-alt-{slot}"))
}

fn summary_text(summary: &RouteSummary) -> String {
    format!("{}, {}", summary.distance_label(), summary.duration_label())
}

/// Draw `routes[selected]` under `key` with markers for `stops`, and every
/// other alternative under its own key.
///
/// Redrawing reuses the existing line; alternatives no longer present are
/// removed.
pub(crate) fn draw_plan<S: MapSurface>(
    registry: &mut MapLayerRegistry<S>,
    key: &LayerKey,
    routes: &[RouteAlternative],
    selected: usize,
    stops: &[Waypoint],
) -> Result<(), RegistryError> {
    let Some(route) = routes.get(selected) else {
        return Ok(());
    };
    registry.add_or_update_track(key, &route.geometry, StyleHint::PlannedRoute)?;

    let summary = summary_text(&route.summary());
    if let (Some(origin), Some(destination)) = (stops.first(), stops.last()) {
        let labels = EndpointLabels {
            start: PopupContent::new(origin.label(), format!("Start. {summary}")),
            end: PopupContent::new(destination.label(), format!("Finish. {summary}")),
        };
        registry.add_endpoint_markers(key, origin.coord(), destination.coord(), &labels)?;
    }

    registry.remove_markers_of_kind(key, MarkerKind::Via)?;
    for (index, stop) in stops.iter().enumerate() {
        if WaypointRole::at(index, stops.len()) != Some(WaypointRole::Via) {
            continue;
        }
        let popup = PopupContent::new(stop.label(), format!("Stop {index}"));
        registry.add_marker(key, stop.coord(), MarkerKind::Via, Some(&popup))?;
    }
    registry.set_details(key, PopupContent::new("Planned route", summary));

    let others = routes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != selected)
        .map(|(_, other)| other);
    let mut drawn = 0;
    for other in others {
        let alt = alternative_key(key, drawn);
        registry.add_or_update_track(&alt, &other.geometry, StyleHint::Alternative)?;
        drawn += 1;
    }
    erase_alternatives(registry, key, drawn)
}

/// Remove the plan under `key` and all of its alternatives.
pub(crate) fn erase_plan<S: MapSurface>(
    registry: &mut MapLayerRegistry<S>,
    key: &LayerKey,
) -> Result<(), RegistryError> {
    let removed = registry.remove(key);
    let alternatives = erase_alternatives(registry, key, 0);
    removed.and(alternatives)
}

fn erase_alternatives<S: MapSurface>(
    registry: &mut MapLayerRegistry<S>,
    key: &LayerKey,
    keep: usize,
) -> Result<(), RegistryError> {
    let stale: Vec<LayerKey> = registry
        .keys()
        .filter(|candidate| is_alternative_at_or_after(key, candidate, keep))
        .cloned()
        .collect();
    let mut first_error = None;
    for alt in &stale {
        if let Err(err) = registry.remove(alt) {
            log::warn!("failed to remove alternative `{alt}`: {err}");
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn is_alternative_at_or_after(key: &LayerKey, candidate: &LayerKey, keep: usize) -> bool {
    candidate
        .as_str()
        .strip_prefix(key.as_str())
        .and_then(|rest| rest.strip_prefix("-alt-"))
        .and_then(|slot| slot.parse::<usize>().ok())
        .is_some_and(|slot| slot >= keep)
}
