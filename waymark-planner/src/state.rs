//! Planner states and the transitions reported to callers.

use std::fmt;

use crate::request::RouteRequest;

/// Where the planner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerState {
    /// No plan in progress.
    #[default]
    Idle,
    /// Waiting for the user to pick the stop at `index`.
    SelectingWaypoint {
        /// Slot that the next selection fills.
        index: usize,
    },
    /// A route is displayed and the plan may be edited.
    Calculated,
}

impl fmt::Display for PlannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::SelectingWaypoint { index } => write!(f, "selecting waypoint {index}"),
            Self::Calculated => f.write_str("calculated"),
        }
    }
}

/// What a selection step asks of the caller next.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Another stop must be picked for slot `index`.
    AwaitingWaypoint {
        /// Slot awaiting a selection.
        index: usize,
    },
    /// Every stop is set; resolve this request and feed the result back.
    Request(RouteRequest),
}

impl Transition {
    /// The issued request, if any.
    #[must_use]
    pub fn into_request(self) -> Option<RouteRequest> {
        match self {
            Self::Request(request) => Some(request),
            Self::AwaitingWaypoint { .. } => None,
        }
    }
}
