//! HTTP adapters for the Waymark engine.
//!
//! Responsibilities:
//! - Implement [`waymark_core::DirectionsProvider`] over an OSRM-compatible
//!   Route API.
//! - Implement [`waymark_core::RouteCatalog`] over the backend data API.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `waymark-core`).
//! - Read-only: nothing here writes to the backend.
//!
//! Invariants:
//! - Every request carries a timeout, reported as a `Timeout` error.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod catalog;
mod http;
pub mod routing;

pub use catalog::{HttpCatalogConfig, HttpRouteCatalog};
pub use http::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use routing::{HttpDirectionsConfig, HttpDirectionsProvider};
