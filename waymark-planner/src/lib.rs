//! Route planning for the Waymark engine.
//!
//! [`RoutePlanner`] walks a user through picking an origin, a destination and
//! any stops between them, then keeps the drawn route in step with edits.
//! Directions are fetched outside the planner: it hands out a
//! [`RouteRequest`] and later accepts the matching response through
//! [`RoutePlanner::apply_response`], discarding any that a newer request has
//! superseded.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod draw;
mod error;
mod planner;
mod request;
mod state;

pub use error::PlannerError;
pub use planner::RoutePlanner;
pub use request::{RequestToken, ResponseOutcome, RouteRequest};
pub use state::{PlannerState, Transition};
