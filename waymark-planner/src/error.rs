//! Planner error type.

use thiserror::Error;
use waymark_core::RoutingError;
use waymark_map::RegistryError;

use crate::state::PlannerState;

/// Errors raised by [`crate::RoutePlanner`].
///
/// Illegal transitions and bad indices are caller bugs and never touch the
/// plan. Routing failures leave the displayed route as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The operation is not allowed in the current state.
    #[error("`{operation}` is not allowed while {state}")]
    IllegalTransition {
        /// Rejected operation.
        operation: &'static str,
        /// State at the time of the call.
        state: PlannerState,
    },
    /// A waypoint index is past the end of the list.
    #[error("waypoint index {index} is out of range for {len} waypoints")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Current number of waypoints.
        len: usize,
    },
    /// The origin or destination cannot be removed or reordered.
    #[error("waypoint {index} is an origin or destination")]
    ProtectedWaypoint {
        /// Offending index.
        index: usize,
    },
    /// A slot has not been filled yet.
    #[error("waypoint {index} has not been selected")]
    MissingWaypoint {
        /// First empty slot.
        index: usize,
    },
    /// No alternative exists at the requested index.
    #[error("route alternative {index} does not exist ({count} available)")]
    UnknownAlternative {
        /// Requested index.
        index: usize,
        /// Alternatives currently held.
        count: usize,
    },
    /// The directions request could not be built or resolved.
    #[error(transparent)]
    Routing(#[from] RoutingError),
    /// Drawing the plan failed.
    #[error(transparent)]
    Map(#[from] RegistryError),
}
