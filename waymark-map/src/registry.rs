//! Ownership of everything drawn on one map surface.
//!
//! [`MapLayerRegistry`] is the only code that talks to a [`MapSurface`]. Every
//! artifact it creates is recorded under the [`LayerKey`] that owns it and is
//! released exactly once, by [`MapLayerRegistry::remove`],
//! [`MapLayerRegistry::clear_all`] or when the registry is dropped.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use geo::{Coord, LineString};
use thiserror::Error;

use crate::surface::{
    LayerId, LinePaint, ListenerId, MapSurface, MapSurfaceError, MarkerId, MarkerKind,
    PointerEventKind, PopupContent, PopupId, SourceId,
};

const ROUTE_PLAN_KEY: &str = "route-plan";

/// Name under which a group of artifacts is registered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey(String);

impl LayerKey {
    /// Arbitrary key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a catalogue route.
    #[must_use]
    pub fn route(id: u64) -> Self {
        Self(format!("route-{id}"))
    }

    /// Key reserved for the interactive route plan.
    #[must_use]
    pub fn route_plan() -> Self {
        Self(ROUTE_PLAN_KEY.to_owned())
    }

    /// Raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual role of a line, mapped to paint by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleHint {
    /// A published catalogue route.
    Route,
    /// The displayed planned route.
    PlannedRoute,
    /// A track previewed before upload.
    Preview,
    /// A non-selected route alternative.
    Alternative,
}

impl StyleHint {
    /// Paint for this role, raised when hovered.
    #[must_use]
    pub const fn paint(self, hovered: bool) -> LinePaint {
        match (self, hovered) {
            (Self::Route, false) => LinePaint {
                color: "#2563eb",
                width: 4.0,
                opacity: 0.8,
            },
            (Self::Route, true) => LinePaint {
                color: "#2563eb",
                width: 6.0,
                opacity: 1.0,
            },
            (Self::PlannedRoute, false) => LinePaint {
                color: "#16a34a",
                width: 5.0,
                opacity: 0.9,
            },
            (Self::PlannedRoute, true) => LinePaint {
                color: "#16a34a",
                width: 7.0,
                opacity: 1.0,
            },
            (Self::Preview, false) => LinePaint {
                color: "#f97316",
                width: 4.0,
                opacity: 0.8,
            },
            (Self::Preview, true) => LinePaint {
                color: "#f97316",
                width: 6.0,
                opacity: 1.0,
            },
            (Self::Alternative, false) => LinePaint {
                color: "#94a3b8",
                width: 3.0,
                opacity: 0.6,
            },
            (Self::Alternative, true) => LinePaint {
                color: "#94a3b8",
                width: 5.0,
                opacity: 0.9,
            },
        }
    }
}

/// Any artifact the registry has created on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapArtifactHandle {
    /// Line geometry source.
    Source(SourceId),
    /// Line layer.
    Layer(LayerId),
    /// Marker.
    Marker(MarkerId),
    /// Popup, free-standing or attached to a marker.
    Popup(PopupId),
    /// Pointer listener.
    Listener(ListenerId),
}

/// Start and end markers of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointMarkers {
    /// Start marker.
    pub start: MarkerId,
    /// End marker.
    pub end: MarkerId,
}

/// Popup text for each endpoint marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointLabels {
    /// Shown on the start marker.
    pub start: PopupContent,
    /// Shown on the end marker.
    pub end: PopupContent,
}

/// A pointer event reported by the surface host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEvent {
    /// Listener that fired.
    pub listener: ListenerId,
    /// Pointer position.
    pub at: Coord<f64>,
}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The surface rejected an operation.
    #[error("map surface operation failed")]
    Surface(#[from] MapSurfaceError),
    /// A line needs at least two coordinates.
    #[error("cannot draw `{key}` as a line from {points} point(s)")]
    DegenerateGeometry {
        /// Key the line was meant for.
        key: LayerKey,
        /// Number of coordinates supplied.
        points: usize,
    },
}

#[derive(Debug)]
struct LineArtifacts {
    source: SourceId,
    layer: LayerId,
    listeners: Vec<ListenerId>,
    style: StyleHint,
    visible: bool,
    hovered: bool,
}

impl LineArtifacts {
    fn handles(&self) -> impl Iterator<Item = MapArtifactHandle> + '_ {
        self.listeners
            .iter()
            .map(|id| MapArtifactHandle::Listener(*id))
            .chain([
                MapArtifactHandle::Layer(self.layer.clone()),
                MapArtifactHandle::Source(self.source.clone()),
            ])
    }
}

#[derive(Debug)]
struct MarkerEntry {
    id: MarkerId,
    kind: MarkerKind,
    popup: Option<PopupId>,
}

#[derive(Debug, Default)]
struct Entry {
    line: Option<LineArtifacts>,
    markers: Vec<MarkerEntry>,
    endpoints: Option<EndpointMarkers>,
    open_popup: Option<PopupId>,
    details: Option<PopupContent>,
}

impl Entry {
    fn handle_count(&self) -> usize {
        let line = self
            .line
            .as_ref()
            .map_or(0, |line| line.listeners.len().saturating_add(2));
        let markers: usize = self
            .markers
            .iter()
            .map(|marker| usize::from(marker.popup.is_some()).saturating_add(1))
            .sum();
        line.saturating_add(markers)
            .saturating_add(usize::from(self.open_popup.is_some()))
    }

    /// Handles in safe release order: popups, markers, listeners, layer,
    /// source.
    fn into_handles(self) -> Vec<MapArtifactHandle> {
        let mut handles: Vec<MapArtifactHandle> =
            self.open_popup.map(MapArtifactHandle::Popup).into_iter().collect();
        for marker in &self.markers {
            handles.extend(marker.popup.map(MapArtifactHandle::Popup));
            handles.push(MapArtifactHandle::Marker(marker.id));
        }
        if let Some(line) = &self.line {
            handles.extend(line.handles());
        }
        handles
    }
}

/// Owns a [`MapSurface`] and every artifact drawn on it.
///
/// # Examples
///
/// ```
/// use geo::LineString;
/// use waymark_map::{LayerKey, MapLayerRegistry, SceneSurface, StyleHint};
///
/// let mut registry = MapLayerRegistry::new(SceneSurface::new());
/// let key = LayerKey::route(1);
/// let line: LineString<f64> = vec![(7.0, 46.0), (7.1, 46.1)].into();
/// registry.add_or_update_track(&key, &line, StyleHint::Route)?;
/// assert_eq!(registry.handle_count(&key), 5);
/// registry.remove(&key)?;
/// assert_eq!(registry.handle_count(&key), 0);
/// # Ok::<(), waymark_map::RegistryError>(())
/// ```
pub struct MapLayerRegistry<S: MapSurface> {
    surface: S,
    entries: BTreeMap<LayerKey, Entry>,
    listeners: HashMap<ListenerId, (LayerKey, PointerEventKind)>,
}

impl<S: MapSurface> MapLayerRegistry<S> {
    /// Take ownership of an initialised surface.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            entries: BTreeMap::new(),
            listeners: HashMap::new(),
        }
    }

    /// Initialise a surface and wrap it.
    ///
    /// # Errors
    ///
    /// Propagates the surface constructor's failure.
    pub fn open<F>(init: F) -> Result<Self, MapSurfaceError>
    where
        F: FnOnce() -> Result<S, MapSurfaceError>,
    {
        init().map(Self::new)
    }

    /// Read-only access to the surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Draw or redraw the line for `key`.
    ///
    /// The first call creates a source, a layer and hover/click listeners;
    /// later calls replace the geometry in place and restyle if `style`
    /// changed. Nothing is left behind if creation fails part way.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DegenerateGeometry`] for fewer than two coordinates;
    /// [`RegistryError::Surface`] if the surface rejects an operation.
    pub fn add_or_update_track(
        &mut self,
        key: &LayerKey,
        geometry: &LineString<f64>,
        style: StyleHint,
    ) -> Result<(), RegistryError> {
        if geometry.0.len() < 2 {
            return Err(RegistryError::DegenerateGeometry {
                key: key.clone(),
                points: geometry.0.len(),
            });
        }

        if let Some(line) = self
            .entries
            .get_mut(key)
            .and_then(|entry| entry.line.as_mut())
        {
            self.surface.set_line_geometry(&line.source, geometry)?;
            if line.style != style {
                self.surface
                    .set_line_paint(&line.layer, style.paint(line.hovered))?;
                line.style = style;
            }
            return Ok(());
        }

        let line = self.create_line(key, geometry, style)?;
        for (listener, kind) in line.listeners.iter().zip(LISTENED_EVENTS) {
            self.listeners.insert(*listener, (key.clone(), kind));
        }
        self.entries.entry(key.clone()).or_default().line = Some(line);
        Ok(())
    }

    fn create_line(
        &mut self,
        key: &LayerKey,
        geometry: &LineString<f64>,
        style: StyleHint,
    ) -> Result<LineArtifacts, RegistryError> {
        let source = SourceId::new(format!("{key}-source"));
        let layer = LayerId::new(format!("{key}-line"));
        let mut created = Vec::new();

        match self.build_line(&source, &layer, geometry, style, &mut created) {
            Ok(listeners) => Ok(LineArtifacts {
                source,
                layer,
                listeners,
                style,
                visible: true,
                hovered: false,
            }),
            Err(err) => {
                created.reverse();
                self.release_all(&created);
                Err(err.into())
            }
        }
    }

    fn build_line(
        &mut self,
        source: &SourceId,
        layer: &LayerId,
        geometry: &LineString<f64>,
        style: StyleHint,
        created: &mut Vec<MapArtifactHandle>,
    ) -> Result<Vec<ListenerId>, MapSurfaceError> {
        self.surface.add_line_source(source, geometry)?;
        created.push(MapArtifactHandle::Source(source.clone()));
        self.surface.add_line_layer(layer, source, style.paint(false))?;
        created.push(MapArtifactHandle::Layer(layer.clone()));
        let mut listeners = Vec::with_capacity(LISTENED_EVENTS.len());
        for kind in LISTENED_EVENTS {
            let id = self.surface.listen(layer, kind)?;
            created.push(MapArtifactHandle::Listener(id));
            listeners.push(id);
        }
        Ok(listeners)
    }

    /// Place start and end markers for `key`, replacing any previous pair.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects an operation; any
    /// marker created before the failure is removed again.
    pub fn add_endpoint_markers(
        &mut self,
        key: &LayerKey,
        start: Coord<f64>,
        end: Coord<f64>,
        labels: &EndpointLabels,
    ) -> Result<EndpointMarkers, RegistryError> {
        let previous = self
            .entries
            .get_mut(key)
            .and_then(|entry| entry.endpoints.take());
        if let Some(previous) = previous {
            self.remove_marker_ids(key, &[previous.start, previous.end])?;
        }

        let start_entry = self.create_marker(start, MarkerKind::Start, Some(&labels.start))?;
        let end_entry = match self.create_marker(end, MarkerKind::End, Some(&labels.end)) {
            Ok(entry) => entry,
            Err(err) => {
                self.release_marker(&start_entry);
                return Err(err);
            }
        };

        let markers = EndpointMarkers {
            start: start_entry.id,
            end: end_entry.id,
        };
        let entry = self.entries.entry(key.clone()).or_default();
        entry.markers.push(start_entry);
        entry.markers.push(end_entry);
        entry.endpoints = Some(markers);
        Ok(markers)
    }

    /// Place a marker owned by `key`, optionally with an attached popup.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects an operation.
    pub fn add_marker(
        &mut self,
        key: &LayerKey,
        at: Coord<f64>,
        kind: MarkerKind,
        popup: Option<&PopupContent>,
    ) -> Result<MarkerId, RegistryError> {
        let marker = self.create_marker(at, kind, popup)?;
        let id = marker.id;
        self.entries.entry(key.clone()).or_default().markers.push(marker);
        Ok(id)
    }

    fn create_marker(
        &mut self,
        at: Coord<f64>,
        kind: MarkerKind,
        popup: Option<&PopupContent>,
    ) -> Result<MarkerEntry, RegistryError> {
        let id = self.surface.add_marker(at, kind)?;
        let Some(content) = popup else {
            return Ok(MarkerEntry {
                id,
                kind,
                popup: None,
            });
        };
        match self.surface.attach_popup(id, content) {
            Ok(popup_id) => Ok(MarkerEntry {
                id,
                kind,
                popup: Some(popup_id),
            }),
            Err(err) => {
                self.release(&MapArtifactHandle::Marker(id));
                Err(err.into())
            }
        }
    }

    /// Move a registry-owned marker.
    ///
    /// Returns `false` without touching the surface when `marker` is not
    /// owned by the registry, e.g. after its key was removed.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects the move.
    pub fn move_marker(&mut self, marker: MarkerId, at: Coord<f64>) -> Result<bool, RegistryError> {
        if !self.owns_marker(marker) {
            log::debug!("ignoring move of unowned marker {}", marker.0);
            return Ok(false);
        }
        self.surface.move_marker(marker, at)?;
        Ok(true)
    }

    /// Remove every marker of `kind` owned by `key`. Returns how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects a removal; the
    /// markers are forgotten regardless.
    pub fn remove_markers_of_kind(
        &mut self,
        key: &LayerKey,
        kind: MarkerKind,
    ) -> Result<usize, RegistryError> {
        let ids: Vec<MarkerId> = self
            .entries
            .get(key)
            .map(|entry| {
                entry
                    .markers
                    .iter()
                    .filter(|m| m.kind == kind)
                    .map(|m| m.id)
                    .collect()
            })
            .unwrap_or_default();
        if matches!(kind, MarkerKind::Start | MarkerKind::End)
            && let Some(entry) = self.entries.get_mut(key)
        {
            entry.endpoints = None;
        }
        self.remove_marker_ids(key, &ids)?;
        Ok(ids.len())
    }

    fn remove_marker_ids(&mut self, key: &LayerKey, ids: &[MarkerId]) -> Result<(), RegistryError> {
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(());
        };
        let (removed, kept): (Vec<MarkerEntry>, Vec<MarkerEntry>) = std::mem::take(&mut entry.markers)
            .into_iter()
            .partition(|m| ids.contains(&m.id));
        entry.markers = kept;

        let mut first_error = None;
        for marker in &removed {
            if let Err(err) = self.try_release_marker(marker) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), |err| Err(err.into()))
    }

    /// Show or hide the line of `key`. Markers are unaffected. Returns
    /// `false` if the key has no line.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects the change.
    pub fn set_visibility(&mut self, key: &LayerKey, visible: bool) -> Result<bool, RegistryError> {
        let Some(line) = self
            .entries
            .get_mut(key)
            .and_then(|entry| entry.line.as_mut())
        else {
            return Ok(false);
        };
        if line.visible != visible {
            self.surface.set_layer_visibility(&line.layer, visible)?;
            line.visible = visible;
        }
        Ok(true)
    }

    /// Set the popup content shown when the line of `key` is clicked.
    pub fn set_details(&mut self, key: &LayerKey, details: PopupContent) {
        self.entries.entry(key.clone()).or_default().details = Some(details);
    }

    /// Handle a pointer event from the surface host.
    ///
    /// Hovering raises the line, leaving restores it and clicking opens the
    /// key's details popup, closing any popup opened by an earlier click.
    /// Events from unknown listeners are ignored.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects an operation.
    pub fn dispatch(&mut self, event: MapEvent) -> Result<(), RegistryError> {
        let Some((key, kind)) = self.listeners.get(&event.listener).cloned() else {
            log::debug!("ignoring event from unknown listener {}", event.listener.0);
            return Ok(());
        };
        match kind {
            PointerEventKind::Enter => self.set_hovered(&key, true),
            PointerEventKind::Leave => self.set_hovered(&key, false),
            PointerEventKind::Click => self.open_details(&key, event.at),
        }
    }

    fn set_hovered(&mut self, key: &LayerKey, hovered: bool) -> Result<(), RegistryError> {
        let Some(line) = self
            .entries
            .get_mut(key)
            .and_then(|entry| entry.line.as_mut())
        else {
            return Ok(());
        };
        if line.hovered != hovered {
            self.surface
                .set_line_paint(&line.layer, line.style.paint(hovered))?;
            line.hovered = hovered;
        }
        Ok(())
    }

    fn open_details(&mut self, key: &LayerKey, at: Coord<f64>) -> Result<(), RegistryError> {
        let open: Vec<PopupId> = self
            .entries
            .values_mut()
            .filter_map(|entry| entry.open_popup.take())
            .collect();
        for popup in open {
            self.surface.close_popup(popup)?;
        }

        let content = self
            .entries
            .get(key)
            .and_then(|entry| entry.details.clone())
            .unwrap_or_else(|| PopupContent::new(key.as_str(), ""));
        let popup = self.surface.open_popup(at, &content)?;
        self.entries.entry(key.clone()).or_default().open_popup = Some(popup);
        Ok(())
    }

    /// Remove everything owned by `key`. Returns whether anything was
    /// registered. Removing an unknown key is a no-op.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] with the first surface failure; every
    /// artifact is still attempted and forgotten.
    pub fn remove(&mut self, key: &LayerKey) -> Result<bool, RegistryError> {
        let Some(entry) = self.entries.remove(key) else {
            return Ok(false);
        };
        if let Some(line) = &entry.line {
            for listener in &line.listeners {
                self.listeners.remove(listener);
            }
        }
        let mut first_error = None;
        for handle in entry.into_handles() {
            if let Err(err) = self.try_release(&handle) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(true), |err| Err(err.into()))
    }

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] with the first surface failure; every key
    /// is still removed.
    pub fn clear_all(&mut self) -> Result<(), RegistryError> {
        let keys: Vec<LayerKey> = self.entries.keys().cloned().collect();
        let mut first_error = None;
        for key in keys {
            if let Err(err) = self.remove(&key) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Number of live surface artifacts owned by `key`.
    #[must_use]
    pub fn handle_count(&self, key: &LayerKey) -> usize {
        self.entries.get(key).map_or(0, Entry::handle_count)
    }

    /// Number of live surface artifacts across all keys.
    #[must_use]
    pub fn total_handles(&self) -> usize {
        self.entries.values().map(Entry::handle_count).sum()
    }

    /// Registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &LayerKey> + '_ {
        self.entries.keys()
    }

    /// Markers of `kind` owned by `key`, in creation order.
    #[must_use]
    pub fn markers(&self, key: &LayerKey, kind: MarkerKind) -> Vec<MarkerId> {
        self.entries
            .get(key)
            .map(|entry| {
                entry
                    .markers
                    .iter()
                    .filter(|m| m.kind == kind)
                    .map(|m| m.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Listener ids of the line of `key`, in enter, leave, click order.
    #[must_use]
    pub fn listeners(&self, key: &LayerKey) -> Vec<ListenerId> {
        self.entries
            .get(key)
            .and_then(|entry| entry.line.as_ref())
            .map(|line| line.listeners.clone())
            .unwrap_or_default()
    }

    /// Whether `marker` is still owned by some key.
    #[must_use]
    pub fn owns_marker(&self, marker: MarkerId) -> bool {
        self.entries
            .values()
            .any(|entry| entry.markers.iter().any(|m| m.id == marker))
    }

    /// Layer id of the line of `key`, if drawn.
    #[must_use]
    pub fn layer_id(&self, key: &LayerKey) -> Option<&LayerId> {
        self.entries
            .get(key)
            .and_then(|entry| entry.line.as_ref())
            .map(|line| &line.layer)
    }

    fn release_all(&mut self, handles: &[MapArtifactHandle]) {
        for handle in handles {
            self.release(handle);
        }
    }

    fn release_marker(&mut self, marker: &MarkerEntry) {
        if let Err(err) = self.try_release_marker(marker) {
            log::warn!("failed to release marker {}: {err}", marker.id.0);
        }
    }

    fn try_release_marker(&mut self, marker: &MarkerEntry) -> Result<(), MapSurfaceError> {
        let popup_result = marker
            .popup
            .map_or(Ok(()), |popup| self.try_release(&MapArtifactHandle::Popup(popup)));
        let marker_result = self.try_release(&MapArtifactHandle::Marker(marker.id));
        popup_result.and(marker_result)
    }

    fn release(&mut self, handle: &MapArtifactHandle) {
        if let Err(err) = self.try_release(handle) {
            log::warn!("failed to release {handle:?}: {err}");
        }
    }

    fn try_release(&mut self, handle: &MapArtifactHandle) -> Result<(), MapSurfaceError> {
        match handle {
            MapArtifactHandle::Source(id) => self.surface.remove_source(id),
            MapArtifactHandle::Layer(id) => self.surface.remove_layer(id),
            MapArtifactHandle::Marker(id) => self.surface.remove_marker(*id),
            MapArtifactHandle::Popup(id) => self.surface.close_popup(*id),
            MapArtifactHandle::Listener(id) => self.surface.unlisten(*id),
        }
    }
}

const LISTENED_EVENTS: [PointerEventKind; 3] = [
    PointerEventKind::Enter,
    PointerEventKind::Leave,
    PointerEventKind::Click,
];

impl<S: MapSurface> Drop for MapLayerRegistry<S> {
    fn drop(&mut self) {
        if let Err(err) = self.clear_all() {
            log::warn!("map teardown left artifacts behind: {err}");
        }
    }
}

impl<S: MapSurface> fmt::Debug for MapLayerRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLayerRegistry")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("total_handles", &self.total_handles())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SceneHandle, SceneSurface, SurfaceOp};
    use rstest::{fixture, rstest};

    struct Harness {
        registry: MapLayerRegistry<SceneSurface>,
        scene: SceneHandle,
    }

    #[fixture]
    fn harness() -> Harness {
        let surface = SceneSurface::new();
        let scene = surface.handle();
        Harness {
            registry: MapLayerRegistry::new(surface),
            scene,
        }
    }

    fn line(points: &[(f64, f64)]) -> LineString<f64> {
        points.to_vec().into()
    }

    fn at(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[rstest]
    fn counts_are_zero_before_add_and_after_remove(mut harness: Harness) {
        let key = LayerKey::route(1);
        assert_eq!(harness.registry.handle_count(&key), 0);
        harness
            .registry
            .add_or_update_track(&key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
            .expect("draw");
        assert_eq!(harness.registry.handle_count(&key), 5);
        assert!(harness.registry.remove(&key).expect("remove"));
        assert_eq!(harness.registry.handle_count(&key), 0);
        assert_eq!(harness.scene.live_artifacts(), 0);
        assert!(!harness.registry.remove(&key).expect("second remove"));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(1.0, 1.0)])]
    fn degenerate_lines_are_rejected(mut harness: Harness, #[case] points: &[(f64, f64)]) {
        let key = LayerKey::new("tiny");
        let err = harness
            .registry
            .add_or_update_track(&key, &line(points), StyleHint::Preview)
            .expect_err("degenerate");
        assert_eq!(
            err,
            RegistryError::DegenerateGeometry {
                key,
                points: points.len()
            }
        );
        assert_eq!(harness.scene.created_artifacts(), 0);
    }

    #[rstest]
    fn repeated_adds_update_in_place(mut harness: Harness) {
        let key = LayerKey::route(2);
        harness
            .registry
            .add_or_update_track(&key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
            .expect("draw");
        let created = harness.scene.created_artifacts();
        let replacement = line(&[(5.0, 5.0), (6.0, 6.0), (7.0, 7.0)]);
        harness
            .registry
            .add_or_update_track(&key, &replacement, StyleHint::Alternative)
            .expect("redraw");

        assert_eq!(harness.scene.created_artifacts(), created);
        assert_eq!(
            harness
                .scene
                .source_geometry(&SourceId::new("route-2-source")),
            Some(replacement)
        );
        let layer = harness.registry.layer_id(&key).cloned().expect("layer");
        assert_eq!(
            harness.scene.layer_paint(&layer),
            Some(StyleHint::Alternative.paint(false))
        );
    }

    #[rstest]
    #[case(SurfaceOp::AddLayer)]
    #[case(SurfaceOp::Listen)]
    fn partial_creation_is_rolled_back(mut harness: Harness, #[case] failing: SurfaceOp) {
        harness.scene.fail_next(failing);
        let key = LayerKey::route(3);
        let err = harness
            .registry
            .add_or_update_track(&key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
            .expect_err("injected failure");
        assert!(matches!(err, RegistryError::Surface(_)));
        assert_eq!(harness.registry.handle_count(&key), 0);
        assert_eq!(harness.scene.live_artifacts(), 0);
    }

    #[rstest]
    fn endpoint_markers_replace_previous_pair(mut harness: Harness) {
        let key = LayerKey::route(4);
        let labels = EndpointLabels::default();
        let first = harness
            .registry
            .add_endpoint_markers(&key, at(0.0, 0.0), at(1.0, 1.0), &labels)
            .expect("markers");
        assert_ne!(first.start, first.end);
        let second = harness
            .registry
            .add_endpoint_markers(&key, at(2.0, 2.0), at(3.0, 3.0), &labels)
            .expect("markers");

        assert_eq!(harness.scene.marker_count(None), 2);
        assert_eq!(harness.scene.marker_position(first.start), None);
        assert_eq!(harness.scene.marker_position(second.end), Some(at(3.0, 3.0)));
        assert_eq!(harness.registry.handle_count(&key), 4);
    }

    #[rstest]
    fn hover_raises_and_leave_restores(mut harness: Harness) {
        let key = LayerKey::route(5);
        harness
            .registry
            .add_or_update_track(&key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
            .expect("draw");
        let layer = harness.registry.layer_id(&key).cloned().expect("layer");
        let listeners = harness.registry.listeners(&key);
        let (Some(enter), Some(leave)) = (listeners.first(), listeners.get(1)) else {
            panic!("expected enter and leave listeners");
        };

        harness
            .registry
            .dispatch(MapEvent {
                listener: *enter,
                at: at(0.5, 0.5),
            })
            .expect("enter");
        assert_eq!(
            harness.scene.layer_paint(&layer),
            Some(StyleHint::Route.paint(true))
        );
        harness
            .registry
            .dispatch(MapEvent {
                listener: *leave,
                at: at(0.5, 0.5),
            })
            .expect("leave");
        assert_eq!(
            harness.scene.layer_paint(&layer),
            Some(StyleHint::Route.paint(false))
        );
    }

    #[rstest]
    fn clicks_replace_the_open_popup(mut harness: Harness) {
        let a = LayerKey::route(6);
        let b = LayerKey::route(7);
        for key in [&a, &b] {
            harness
                .registry
                .add_or_update_track(key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
                .expect("draw");
        }
        harness
            .registry
            .set_details(&a, PopupContent::new("Alpha", "first"));
        harness
            .registry
            .set_details(&b, PopupContent::new("Bravo", "second"));

        for key in [&a, &b] {
            let click = harness
                .registry
                .listeners(key)
                .get(2)
                .copied()
                .expect("click listener");
            harness
                .registry
                .dispatch(MapEvent {
                    listener: click,
                    at: at(0.2, 0.2),
                })
                .expect("click");
        }

        assert_eq!(harness.scene.popup_titles(), vec!["Bravo"]);
        assert_eq!(harness.registry.handle_count(&a), 5);
        assert_eq!(harness.registry.handle_count(&b), 6);
    }

    #[rstest]
    fn visibility_toggles_only_the_layer(mut harness: Harness) {
        let key = LayerKey::route(8);
        harness
            .registry
            .add_or_update_track(&key, &line(&[(0.0, 0.0), (1.0, 1.0)]), StyleHint::Route)
            .expect("draw");
        harness
            .registry
            .add_marker(&key, at(0.0, 0.0), MarkerKind::Poi, None)
            .expect("marker");
        let layer = harness.registry.layer_id(&key).cloned().expect("layer");

        assert!(harness.registry.set_visibility(&key, false).expect("hide"));
        assert_eq!(harness.scene.layer_visible(&layer), Some(false));
        assert_eq!(harness.scene.marker_count(None), 1);
        assert!(
            !harness
                .registry
                .set_visibility(&LayerKey::new("nothing"), false)
                .expect("unknown key")
        );
    }

    #[rstest]
    fn stale_marker_moves_are_ignored(mut harness: Harness) {
        let key = LayerKey::new("cursor");
        let marker = harness
            .registry
            .add_marker(&key, at(0.0, 0.0), MarkerKind::Cursor, None)
            .expect("marker");
        assert!(harness.registry.move_marker(marker, at(1.0, 1.0)).expect("move"));
        harness.registry.remove(&key).expect("remove");
        assert!(!harness.registry.move_marker(marker, at(2.0, 2.0)).expect("stale"));
    }

    #[rstest]
    fn dropping_the_registry_clears_the_surface() {
        let surface = SceneSurface::new();
        let scene = surface.handle();
        {
            let mut registry = MapLayerRegistry::new(surface);
            for id in 0..3 {
                registry
                    .add_or_update_track(
                        &LayerKey::route(id),
                        &line(&[(0.0, 0.0), (1.0, 1.0)]),
                        StyleHint::Route,
                    )
                    .expect("draw");
            }
            registry
                .add_endpoint_markers(
                    &LayerKey::route(0),
                    at(0.0, 0.0),
                    at(1.0, 1.0),
                    &EndpointLabels::default(),
                )
                .expect("markers");
            assert_eq!(registry.total_handles(), scene.live_artifacts());
        }
        assert_eq!(scene.live_artifacts(), 0);
    }
}
