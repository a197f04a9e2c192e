//! The drawing surface the registry renders onto.
//!
//! A [`MapSurface`] is whatever actually shows geometry: a web map, a native
//! widget or the in-memory [`SceneSurface`](crate::SceneSurface). The
//! registry is its only caller; every artifact a surface creates is later
//! removed through the matching `remove_*`, `close_popup` or `unlisten` call.

use std::fmt;

use geo::{Coord, LineString};
use thiserror::Error;

/// Identifier of a line geometry source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(String);

/// Identifier of a rendered line layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a raw identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(SourceId);
string_id!(LayerId);

/// Surface-assigned marker handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Surface-assigned popup handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(pub u64);

/// Surface-assigned pointer listener handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// What a marker represents; surfaces pick an icon per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    /// Start of a track or route.
    Start,
    /// End of a track or route.
    End,
    /// Intermediate stop of a planned route.
    Via,
    /// Elevation profile hover cursor.
    Cursor,
    /// Point of interest.
    Poi,
}

impl MarkerKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Via => "via",
            Self::Cursor => "cursor",
            Self::Poi => "poi",
        }
    }
}

/// Line styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePaint {
    /// CSS colour.
    pub color: &'static str,
    /// Width in pixels.
    pub width: f64,
    /// Opacity between zero and one.
    pub opacity: f64,
}

/// Pointer interactions a layer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerEventKind {
    /// Pointer entered the line.
    Enter,
    /// Pointer left the line.
    Leave,
    /// Line was clicked.
    Click,
}

/// Text shown in a popup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupContent {
    /// Heading.
    pub title: String,
    /// Body text; may be empty.
    pub body: String,
    /// Optional image reference.
    pub thumbnail: Option<String>,
}

impl PopupContent {
    /// Popup with a title and body and no image.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            thumbnail: None,
        }
    }

    /// Attach a thumbnail reference.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

/// Failures reported by a surface. Fatal for the view that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapSurfaceError {
    /// The surface could not be created.
    #[error("map surface failed to initialise: {message}")]
    Initialisation {
        /// Host-supplied description.
        message: String,
    },
    /// An identifier was not known to the surface.
    #[error("unknown {kind} `{id}`")]
    UnknownArtifact {
        /// Artifact kind, e.g. `source`.
        kind: &'static str,
        /// Offending identifier.
        id: String,
    },
    /// An identifier was already in use.
    #[error("{kind} `{id}` already exists")]
    DuplicateArtifact {
        /// Artifact kind, e.g. `layer`.
        kind: &'static str,
        /// Offending identifier.
        id: String,
    },
    /// The host rejected an operation.
    #[error("map surface operation failed: {message}")]
    Backend {
        /// Host-supplied description.
        message: String,
    },
}

/// Primitive drawing operations.
pub trait MapSurface {
    /// Create a line source.
    fn add_line_source(
        &mut self,
        id: &SourceId,
        geometry: &LineString<f64>,
    ) -> Result<(), MapSurfaceError>;

    /// Replace a source's geometry in place.
    fn set_line_geometry(
        &mut self,
        id: &SourceId,
        geometry: &LineString<f64>,
    ) -> Result<(), MapSurfaceError>;

    /// Remove a source. Its layers must already be gone.
    fn remove_source(&mut self, id: &SourceId) -> Result<(), MapSurfaceError>;

    /// Draw `source` as a line layer.
    fn add_line_layer(
        &mut self,
        id: &LayerId,
        source: &SourceId,
        paint: LinePaint,
    ) -> Result<(), MapSurfaceError>;

    /// Restyle a layer.
    fn set_line_paint(&mut self, id: &LayerId, paint: LinePaint) -> Result<(), MapSurfaceError>;

    /// Show or hide a layer.
    fn set_layer_visibility(&mut self, id: &LayerId, visible: bool)
    -> Result<(), MapSurfaceError>;

    /// Remove a layer.
    fn remove_layer(&mut self, id: &LayerId) -> Result<(), MapSurfaceError>;

    /// Place a marker.
    fn add_marker(&mut self, at: Coord<f64>, kind: MarkerKind)
    -> Result<MarkerId, MapSurfaceError>;

    /// Move an existing marker.
    fn move_marker(&mut self, id: MarkerId, at: Coord<f64>) -> Result<(), MapSurfaceError>;

    /// Remove a marker. Attached popups must already be closed.
    fn remove_marker(&mut self, id: MarkerId) -> Result<(), MapSurfaceError>;

    /// Attach a popup to a marker, shown when the marker is activated.
    fn attach_popup(
        &mut self,
        marker: MarkerId,
        content: &PopupContent,
    ) -> Result<PopupId, MapSurfaceError>;

    /// Open a free-standing popup at `at`.
    fn open_popup(
        &mut self,
        at: Coord<f64>,
        content: &PopupContent,
    ) -> Result<PopupId, MapSurfaceError>;

    /// Close and discard a popup of either kind.
    fn close_popup(&mut self, id: PopupId) -> Result<(), MapSurfaceError>;

    /// Subscribe to pointer events on a layer.
    fn listen(
        &mut self,
        layer: &LayerId,
        kind: PointerEventKind,
    ) -> Result<ListenerId, MapSurfaceError>;

    /// Drop a subscription.
    fn unlisten(&mut self, id: ListenerId) -> Result<(), MapSurfaceError>;
}
