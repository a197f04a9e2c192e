//! Route directions between ordered waypoints.
//!
//! The [`DirectionsProvider`] trait abstracts the external directions service.
//! Callers build a validated [`DirectionsRequest`] and receive zero or more
//! [`RouteAlternative`]s; an empty list means the service found no route.

mod alternative;
mod error;
mod provider;

pub use alternative::{RouteAlternative, RouteLeg, RouteStep, RouteSummary};
pub use error::RoutingError;
pub use provider::{DirectionsProvider, DirectionsRequest, RoutePreference, TravelMode};
