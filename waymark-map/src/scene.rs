//! Headless in-memory surface.
//!
//! [`SceneSurface`] keeps every artifact in plain collections so views can be
//! exercised without a map widget, and exports the visible scene as GeoJSON.
//! A [`SceneHandle`] shares the same state for inspection after the surface
//! has been handed to a registry.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::surface::{
    LayerId, LinePaint, ListenerId, MapSurface, MapSurfaceError, MarkerId, MarkerKind,
    PointerEventKind, PopupContent, PopupId, SourceId,
};

/// Surface operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    /// [`MapSurface::add_line_source`].
    AddSource,
    /// [`MapSurface::set_line_geometry`].
    SetGeometry,
    /// [`MapSurface::add_line_layer`].
    AddLayer,
    /// [`MapSurface::set_line_paint`].
    SetPaint,
    /// [`MapSurface::add_marker`].
    AddMarker,
    /// [`MapSurface::move_marker`].
    MoveMarker,
    /// [`MapSurface::attach_popup`].
    AttachPopup,
    /// [`MapSurface::open_popup`].
    OpenPopup,
    /// [`MapSurface::listen`].
    Listen,
}

#[derive(Debug, Clone)]
struct SceneLayer {
    source: SourceId,
    paint: LinePaint,
    visible: bool,
}

#[derive(Debug, Clone, Copy)]
struct SceneMarker {
    at: Coord<f64>,
    kind: MarkerKind,
}

#[derive(Debug, Clone, Copy)]
enum PopupAnchor {
    Marker(MarkerId),
    At(Coord<f64>),
}

#[derive(Debug, Clone)]
struct ScenePopup {
    anchor: PopupAnchor,
    content: PopupContent,
}

#[derive(Debug, Default)]
struct Scene {
    sources: BTreeMap<SourceId, LineString<f64>>,
    layers: BTreeMap<LayerId, SceneLayer>,
    markers: BTreeMap<MarkerId, SceneMarker>,
    popups: BTreeMap<PopupId, ScenePopup>,
    listeners: BTreeMap<ListenerId, (LayerId, PointerEventKind)>,
    next_id: u64,
    created: usize,
    fail_next: Vec<SurfaceOp>,
}

impl Scene {
    fn next_id(&mut self) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.created = self.created.saturating_add(1);
        self.next_id
    }

    fn check(&mut self, op: SurfaceOp) -> Result<(), MapSurfaceError> {
        if let Some(pos) = self.fail_next.iter().position(|pending| *pending == op) {
            self.fail_next.remove(pos);
            return Err(MapSurfaceError::Backend {
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }

    fn live(&self) -> usize {
        self.sources.len()
            + self.layers.len()
            + self.markers.len()
            + self.popups.len()
            + self.listeners.len()
    }
}

fn unknown(kind: &'static str, id: impl ToString) -> MapSurfaceError {
    MapSurfaceError::UnknownArtifact {
        kind,
        id: id.to_string(),
    }
}

/// In-memory [`MapSurface`].
#[derive(Debug, Default)]
pub struct SceneSurface {
    scene: Rc<RefCell<Scene>>,
}

impl SceneSurface {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared read access to the scene.
    #[must_use]
    pub fn handle(&self) -> SceneHandle {
        SceneHandle {
            scene: Rc::clone(&self.scene),
        }
    }
}

impl MapSurface for SceneSurface {
    fn add_line_source(
        &mut self,
        id: &SourceId,
        geometry: &LineString<f64>,
    ) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::AddSource)?;
        if scene.sources.contains_key(id) {
            return Err(MapSurfaceError::DuplicateArtifact {
                kind: "source",
                id: id.to_string(),
            });
        }
        scene.sources.insert(id.clone(), geometry.clone());
        scene.created = scene.created.saturating_add(1);
        Ok(())
    }

    fn set_line_geometry(
        &mut self,
        id: &SourceId,
        geometry: &LineString<f64>,
    ) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::SetGeometry)?;
        let source = scene.sources.get_mut(id).ok_or_else(|| unknown("source", id))?;
        source.clone_from(geometry);
        Ok(())
    }

    fn remove_source(&mut self, id: &SourceId) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        if scene.layers.values().any(|layer| &layer.source == id) {
            return Err(MapSurfaceError::Backend {
                message: format!("source `{id}` is still used by a layer"),
            });
        }
        scene
            .sources
            .remove(id)
            .map(drop)
            .ok_or_else(|| unknown("source", id))
    }

    fn add_line_layer(
        &mut self,
        id: &LayerId,
        source: &SourceId,
        paint: LinePaint,
    ) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::AddLayer)?;
        if !scene.sources.contains_key(source) {
            return Err(unknown("source", source));
        }
        if scene.layers.contains_key(id) {
            return Err(MapSurfaceError::DuplicateArtifact {
                kind: "layer",
                id: id.to_string(),
            });
        }
        scene.layers.insert(
            id.clone(),
            SceneLayer {
                source: source.clone(),
                paint,
                visible: true,
            },
        );
        scene.created = scene.created.saturating_add(1);
        Ok(())
    }

    fn set_line_paint(&mut self, id: &LayerId, paint: LinePaint) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::SetPaint)?;
        let layer = scene.layers.get_mut(id).ok_or_else(|| unknown("layer", id))?;
        layer.paint = paint;
        Ok(())
    }

    fn set_layer_visibility(
        &mut self,
        id: &LayerId,
        visible: bool,
    ) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        let layer = scene.layers.get_mut(id).ok_or_else(|| unknown("layer", id))?;
        layer.visible = visible;
        Ok(())
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        if scene.listeners.values().any(|(layer, _)| layer == id) {
            return Err(MapSurfaceError::Backend {
                message: format!("layer `{id}` still has listeners"),
            });
        }
        scene
            .layers
            .remove(id)
            .map(drop)
            .ok_or_else(|| unknown("layer", id))
    }

    fn add_marker(
        &mut self,
        at: Coord<f64>,
        kind: MarkerKind,
    ) -> Result<MarkerId, MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::AddMarker)?;
        let id = MarkerId(scene.next_id());
        scene.markers.insert(id, SceneMarker { at, kind });
        Ok(id)
    }

    fn move_marker(&mut self, id: MarkerId, at: Coord<f64>) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::MoveMarker)?;
        let marker = scene.markers.get_mut(&id).ok_or_else(|| unknown("marker", id.0))?;
        marker.at = at;
        Ok(())
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        let attached = scene
            .popups
            .values()
            .any(|popup| matches!(popup.anchor, PopupAnchor::Marker(marker) if marker == id));
        if attached {
            return Err(MapSurfaceError::Backend {
                message: format!("marker {} still has a popup", id.0),
            });
        }
        scene
            .markers
            .remove(&id)
            .map(drop)
            .ok_or_else(|| unknown("marker", id.0))
    }

    fn attach_popup(
        &mut self,
        marker: MarkerId,
        content: &PopupContent,
    ) -> Result<PopupId, MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::AttachPopup)?;
        if !scene.markers.contains_key(&marker) {
            return Err(unknown("marker", marker.0));
        }
        let id = PopupId(scene.next_id());
        scene.popups.insert(
            id,
            ScenePopup {
                anchor: PopupAnchor::Marker(marker),
                content: content.clone(),
            },
        );
        Ok(id)
    }

    fn open_popup(
        &mut self,
        at: Coord<f64>,
        content: &PopupContent,
    ) -> Result<PopupId, MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::OpenPopup)?;
        let id = PopupId(scene.next_id());
        scene.popups.insert(
            id,
            ScenePopup {
                anchor: PopupAnchor::At(at),
                content: content.clone(),
            },
        );
        Ok(id)
    }

    fn close_popup(&mut self, id: PopupId) -> Result<(), MapSurfaceError> {
        self.scene
            .borrow_mut()
            .popups
            .remove(&id)
            .map(drop)
            .ok_or_else(|| unknown("popup", id.0))
    }

    fn listen(
        &mut self,
        layer: &LayerId,
        kind: PointerEventKind,
    ) -> Result<ListenerId, MapSurfaceError> {
        let mut scene = self.scene.borrow_mut();
        scene.check(SurfaceOp::Listen)?;
        if !scene.layers.contains_key(layer) {
            return Err(unknown("layer", layer));
        }
        let id = ListenerId(scene.next_id());
        scene.listeners.insert(id, (layer.clone(), kind));
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) -> Result<(), MapSurfaceError> {
        self.scene
            .borrow_mut()
            .listeners
            .remove(&id)
            .map(drop)
            .ok_or_else(|| unknown("listener", id.0))
    }
}

/// Read access to a [`SceneSurface`] that outlives its owner.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    scene: Rc<RefCell<Scene>>,
}

impl SceneHandle {
    /// Make the next call of `op` fail with [`MapSurfaceError::Backend`].
    pub fn fail_next(&self, op: SurfaceOp) {
        self.scene.borrow_mut().fail_next.push(op);
    }

    /// Artifacts currently alive on the surface.
    #[must_use]
    pub fn live_artifacts(&self) -> usize {
        self.scene.borrow().live()
    }

    /// Artifacts ever created on the surface.
    #[must_use]
    pub fn created_artifacts(&self) -> usize {
        self.scene.borrow().created
    }

    /// Number of live line sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.scene.borrow().sources.len()
    }

    /// Number of live line layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.scene.borrow().layers.len()
    }

    /// Number of live markers, optionally only of one kind.
    #[must_use]
    pub fn marker_count(&self, kind: Option<MarkerKind>) -> usize {
        self.scene
            .borrow()
            .markers
            .values()
            .filter(|marker| kind.is_none_or(|k| marker.kind == k))
            .count()
    }

    /// Number of live popups.
    #[must_use]
    pub fn popup_count(&self) -> usize {
        self.scene.borrow().popups.len()
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.scene.borrow().listeners.len()
    }

    /// Current position of a marker.
    #[must_use]
    pub fn marker_position(&self, id: MarkerId) -> Option<Coord<f64>> {
        self.scene.borrow().markers.get(&id).map(|marker| marker.at)
    }

    /// Current geometry of a source.
    #[must_use]
    pub fn source_geometry(&self, id: &SourceId) -> Option<LineString<f64>> {
        self.scene.borrow().sources.get(id).cloned()
    }

    /// Current paint of a layer.
    #[must_use]
    pub fn layer_paint(&self, id: &LayerId) -> Option<LinePaint> {
        self.scene.borrow().layers.get(id).map(|layer| layer.paint)
    }

    /// Whether a layer is shown.
    #[must_use]
    pub fn layer_visible(&self, id: &LayerId) -> Option<bool> {
        self.scene.borrow().layers.get(id).map(|layer| layer.visible)
    }

    /// Titles of every live popup, in creation order.
    #[must_use]
    pub fn popup_titles(&self) -> Vec<String> {
        self.scene
            .borrow()
            .popups
            .values()
            .map(|popup| popup.content.title.clone())
            .collect()
    }

    /// Export visible lines, markers and free-standing popups as GeoJSON.
    ///
    /// Lines carry `layer`, `color`, `width` and `opacity` properties;
    /// markers carry `marker` and `kind`; popups carry `title`, `body` and
    /// `thumbnail`.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let scene = self.scene.borrow();
        let mut features = Vec::new();

        for (id, layer) in scene.layers.iter().filter(|(_, layer)| layer.visible) {
            let Some(line) = scene.sources.get(&layer.source) else {
                continue;
            };
            let coords: Vec<Vec<f64>> = line.coords().map(|c| vec![c.x, c.y]).collect();
            let mut props = Map::new();
            props.insert("layer".to_owned(), JsonValue::from(id.as_str()));
            props.insert("color".to_owned(), JsonValue::from(layer.paint.color));
            props.insert("width".to_owned(), JsonValue::from(layer.paint.width));
            props.insert("opacity".to_owned(), JsonValue::from(layer.paint.opacity));
            features.push(feature(Value::LineString(coords), props));
        }

        for (id, marker) in &scene.markers {
            let mut props = Map::new();
            props.insert("marker".to_owned(), JsonValue::from(id.0));
            props.insert("kind".to_owned(), JsonValue::from(marker.kind.as_str()));
            features.push(feature(point(marker.at), props));
        }

        for popup in scene.popups.values() {
            let PopupAnchor::At(at) = popup.anchor else {
                continue;
            };
            let mut props = Map::new();
            props.insert("title".to_owned(), JsonValue::from(popup.content.title.as_str()));
            props.insert("body".to_owned(), JsonValue::from(popup.content.body.as_str()));
            props.insert(
                "thumbnail".to_owned(),
                popup
                    .content
                    .thumbnail
                    .as_deref()
                    .map_or(JsonValue::Null, JsonValue::from),
            );
            features.push(feature(point(at), props));
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn point(at: Coord<f64>) -> Value {
    Value::Point(vec![at.x, at.y])
}

fn feature(value: Value, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}
