//! Elevation chart series with a synchronised map cursor.
//!
//! The chart drives the map, never the reverse: hovering a chart sample moves
//! a single cursor marker to that sample's position.

use waymark_core::units::meters_to_feet;
use waymark_core::{ElevationDomain, ElevationSample, TrackMetrics};

use crate::registry::{LayerKey, MapLayerRegistry, RegistryError};
use crate::surface::{MapSurface, MarkerId, MarkerKind};

/// Unit for the elevation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationUnit {
    /// Metres.
    #[default]
    Meters,
    /// Feet.
    Feet,
}

impl ElevationUnit {
    fn convert(self, meters: f64) -> f64 {
        match self {
            Self::Meters => meters,
            Self::Feet => meters_to_feet(meters),
        }
    }
}

/// Chart-ready data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// `(distance_km, elevation)` pairs in the requested unit.
    pub points: Vec<(f64, f64)>,
    /// Outward-rounded axis domain in the requested unit.
    pub domain: ElevationDomain,
    /// Unit of the elevation values.
    pub unit: ElevationUnit,
}

#[derive(Debug, Clone)]
struct Cursor {
    key: LayerKey,
    marker: MarkerId,
}

/// Elevation profile for one track.
#[derive(Debug, Clone, Default)]
pub struct ElevationProfile {
    samples: Vec<ElevationSample>,
    domain: Option<ElevationDomain>,
    cursor: Option<Cursor>,
}

impl ElevationProfile {
    /// Empty, uninitialised profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the samples with those of `metrics`.
    ///
    /// An attached cursor stays where it is until the next hover.
    pub fn load(&mut self, metrics: &TrackMetrics) {
        self.samples.clone_from(&metrics.samples);
        self.domain = Some(metrics.elevation_domain());
    }

    /// Loaded samples.
    #[must_use]
    pub fn samples(&self) -> &[ElevationSample] {
        &self.samples
    }

    /// Cursor marker, once attached.
    #[must_use]
    pub fn cursor(&self) -> Option<MarkerId> {
        self.cursor.as_ref().map(|cursor| cursor.marker)
    }

    /// Series for the chart, or `None` before [`Self::load`].
    ///
    /// Feet values are converted point by point; the domain is converted and
    /// then rounded outward to ten feet again.
    #[must_use]
    pub fn chart_series(&self, unit: ElevationUnit) -> Option<ChartSeries> {
        let domain = self.domain?;
        let points = self
            .samples
            .iter()
            .map(|sample| (sample.distance_from_start_km, unit.convert(sample.elevation_m)))
            .collect();
        let domain = match unit {
            ElevationUnit::Meters => domain,
            ElevationUnit::Feet => {
                waymark_core::elevation_domain(unit.convert(domain.lower), unit.convert(domain.upper))
            }
        };
        Some(ChartSeries {
            points,
            domain,
            unit,
        })
    }

    /// Create the cursor marker at the first sample, owned by `key`.
    ///
    /// Returns the existing cursor while `registry` still owns it. A cursor
    /// removed along with its key (or by [`MapLayerRegistry::clear_all`]) is
    /// forgotten and created afresh. Does nothing if there are no samples.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the marker cannot be created.
    pub fn attach_cursor<S: MapSurface>(
        &mut self,
        registry: &mut MapLayerRegistry<S>,
        key: &LayerKey,
    ) -> Result<Option<MarkerId>, RegistryError> {
        if let Some(cursor) = self.cursor.take_if(|cursor| !registry.owns_marker(cursor.marker)) {
            log::debug!("profile cursor for `{}` was removed; recreating", cursor.key);
        }
        if let Some(cursor) = &self.cursor {
            return Ok(Some(cursor.marker));
        }
        let Some(first) = self.samples.first() else {
            return Ok(None);
        };
        let marker = registry.add_marker(key, first.coordinate, MarkerKind::Cursor, None)?;
        self.cursor = Some(Cursor {
            key: key.clone(),
            marker,
        });
        Ok(Some(marker))
    }

    /// Move the cursor to sample `index`.
    ///
    /// Silently ignored when no cursor is attached, `index` is out of range
    /// or the cursor's key has been removed from the registry.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Surface`] if the surface rejects the move.
    pub fn on_hover<S: MapSurface>(
        &self,
        registry: &mut MapLayerRegistry<S>,
        index: usize,
    ) -> Result<(), RegistryError> {
        let (Some(cursor), Some(sample)) = (&self.cursor, self.samples.get(index)) else {
            return Ok(());
        };
        if !registry.move_marker(cursor.marker, sample.coordinate)? {
            log::debug!("profile cursor for `{}` no longer registered", cursor.key);
        }
        Ok(())
    }
}
