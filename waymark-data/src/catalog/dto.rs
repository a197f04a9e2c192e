//! Wire format of the backend data API.

use geo::Coord;
use serde::Deserialize;
use waymark_core::{Difficulty, PointOfInterest, RouteRecord, RouteStats};

/// A route as served by `GET /routes` and `GET /routes/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RouteDto {
    id: u64,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    difficulty: Difficulty,
    track_file: String,
    distance: Option<f64>,
    elevation_gain: Option<f64>,
    elevation_min: Option<f64>,
    elevation_max: Option<f64>,
    #[serde(default)]
    images: Vec<String>,
}

impl From<RouteDto> for RouteRecord {
    fn from(dto: RouteDto) -> Self {
        // Statistics are published as a whole or not at all.
        let stats = match (
            dto.distance,
            dto.elevation_gain,
            dto.elevation_min,
            dto.elevation_max,
        ) {
            (Some(total_distance_m), Some(elevation_gain_m), Some(elevation_min_m), Some(elevation_max_m)) => {
                Some(RouteStats {
                    total_distance_m,
                    elevation_gain_m,
                    elevation_min_m,
                    elevation_max_m,
                })
            }
            _ => None,
        };
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            region: dto.region,
            difficulty: dto.difficulty,
            track_file: dto.track_file,
            stats,
            images: dto.images,
        }
    }
}

/// A point of interest as served by `GET /pois`.
#[derive(Debug, Deserialize)]
pub(crate) struct PoiDto {
    id: u64,
    name: String,
    #[serde(default)]
    category: String,
    latitude: f64,
    longitude: f64,
}

impl From<PoiDto> for PointOfInterest {
    fn from(dto: PoiDto) -> Self {
        Self::new(
            dto.id,
            dto.name,
            dto.category,
            Coord {
                x: dto.longitude,
                y: dto.latitude,
            },
        )
    }
}
