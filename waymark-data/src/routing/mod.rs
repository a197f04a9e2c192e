//! HTTP directions for the route planner.
//!
//! [`HttpDirectionsProvider`] implements [`waymark_core::DirectionsProvider`]
//! against an OSRM-compatible Route API. A response whose code is `NoRoute`,
//! or which carries no routes, is returned as an empty list rather than an
//! error; the planner turns that into [`waymark_core::RoutingError::NoRoute`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use waymark_data::routing::{HttpDirectionsConfig, HttpDirectionsProvider};
//!
//! let config = HttpDirectionsConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpDirectionsProvider::with_config(config)?;
//! # Ok::<(), waymark_data::ClientBuildError>(())
//! ```

mod osrm;
mod provider;

pub use provider::{HttpDirectionsConfig, HttpDirectionsProvider, decode_route_response};
