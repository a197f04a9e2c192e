//! Route requests and the tokens that order them.

use std::fmt;

use waymark_core::{DirectionsRequest, RouteSummary, Waypoint};

/// Monotonically increasing identifier of an issued request.
///
/// Only the response carrying the latest issued token is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn after(previous: Option<Self>) -> Self {
        match previous {
            Some(Self(value)) => Self(value.saturating_add(1)),
            None => Self(1),
        }
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A directions query tagged with the token its response must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Token to pass back to [`crate::RoutePlanner::apply_response`].
    pub token: RequestToken,
    /// Query for the directions provider.
    pub directions: DirectionsRequest,
}

/// The single request whose response is still wanted.
#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    token: RequestToken,
    waypoints: Vec<Waypoint>,
}

impl PendingRequest {
    pub(crate) const fn new(token: RequestToken, waypoints: Vec<Waypoint>) -> Self {
        Self { token, waypoints }
    }

    pub(crate) const fn token(&self) -> RequestToken {
        self.token
    }

    pub(crate) fn into_waypoints(self) -> Vec<Waypoint> {
        self.waypoints
    }
}

/// Result of feeding a response back to the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseOutcome {
    /// The response was current and is now displayed.
    Applied {
        /// Token of the applied request.
        token: RequestToken,
        /// Summary of the displayed alternative.
        summary: RouteSummary,
        /// Number of alternatives received.
        alternatives: usize,
    },
    /// A newer request was issued or the plan changed; nothing happened.
    Discarded {
        /// Token of the ignored response.
        token: RequestToken,
    },
}

impl ResponseOutcome {
    /// Whether the response changed the displayed route.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
