//! The route planner state machine.
//!
//! Issuing a request and applying its response are separate steps so a host
//! event loop can await the directions service in between. Each request gets
//! a fresh [`RequestToken`]; only the response for the latest one is applied,
//! whatever order responses arrive in.

use waymark_core::{
    DirectionsProvider, DirectionsRequest, RouteAlternative, RoutePreference, RouteSummary,
    RoutingError, TravelMode, Waypoint, WaypointRole,
};
use waymark_map::{LayerKey, MapLayerRegistry, MapSurface};

use crate::draw::{draw_plan, erase_plan};
use crate::error::PlannerError;
use crate::request::{PendingRequest, RequestToken, ResponseOutcome, RouteRequest};
use crate::state::{PlannerState, Transition};

/// Interactive planner for a route through an ordered list of waypoints.
///
/// # Examples
///
/// ```
/// use waymark_core::Waypoint;
/// use waymark_core::test_support::StubDirectionsProvider;
/// use waymark_map::{MapLayerRegistry, SceneSurface};
/// use waymark_planner::{PlannerState, RoutePlanner};
///
/// let provider = StubDirectionsProvider::straight_line(5000.0, 900.0);
/// let mut registry = MapLayerRegistry::new(SceneSurface::new());
/// let mut planner = RoutePlanner::new();
///
/// planner.select_waypoint(Waypoint::at(46.0, 7.0))?;
/// let request = planner
///     .select_waypoint(Waypoint::at(46.1, 7.1))?
///     .into_request()
///     .expect("both stops chosen");
/// planner.resolve(&provider, &request, &mut registry)?;
///
/// assert_eq!(planner.state(), PlannerState::Calculated);
/// let summary = planner.summary().expect("route displayed");
/// assert_eq!(summary.distance_label(), "5.0 km");
/// assert_eq!(summary.duration_label(), "15 min");
/// # Ok::<(), waymark_planner::PlannerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    key: LayerKey,
    state: PlannerState,
    waypoints: Vec<Option<Waypoint>>,
    mode: TravelMode,
    preference: RoutePreference,
    alternatives: Vec<RouteAlternative>,
    selected: Option<usize>,
    routed: Vec<Waypoint>,
    last_token: Option<RequestToken>,
    pending: Option<PendingRequest>,
}

impl Default for RoutePlanner {
    fn default() -> Self {
        Self::with_layer_key(LayerKey::route_plan())
    }
}

impl RoutePlanner {
    /// Idle planner drawing under [`LayerKey::route_plan`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle planner drawing under `key`.
    #[must_use]
    pub const fn with_layer_key(key: LayerKey) -> Self {
        Self {
            key,
            state: PlannerState::Idle,
            waypoints: Vec::new(),
            mode: TravelMode::Walking,
            preference: RoutePreference::Shortest,
            alternatives: Vec::new(),
            selected: None,
            routed: Vec::new(),
            last_token: None,
            pending: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PlannerState {
        self.state
    }

    /// Waypoint slots in order; `None` marks a slot still to be picked.
    #[must_use]
    pub const fn waypoints(&self) -> &[Option<Waypoint>] {
        self.waypoints.as_slice()
    }

    /// Travel mode used for the next request.
    #[must_use]
    pub const fn travel_mode(&self) -> TravelMode {
        self.mode
    }

    /// Route preference used for the next request.
    #[must_use]
    pub const fn preference(&self) -> RoutePreference {
        self.preference
    }

    /// Layer key the plan is drawn under.
    #[must_use]
    pub const fn layer_key(&self) -> &LayerKey {
        &self.key
    }

    /// Alternatives from the last applied response.
    #[must_use]
    pub const fn alternatives(&self) -> &[RouteAlternative] {
        self.alternatives.as_slice()
    }

    /// Index of the displayed alternative.
    #[must_use]
    pub const fn selected_alternative(&self) -> Option<usize> {
        self.selected
    }

    /// Token of the request whose response would still be applied.
    #[must_use]
    pub fn pending(&self) -> Option<RequestToken> {
        self.pending.as_ref().map(PendingRequest::token)
    }

    /// The displayed alternative.
    #[must_use]
    pub fn displayed_route(&self) -> Option<&RouteAlternative> {
        self.selected.and_then(|index| self.alternatives.get(index))
    }

    /// Distance and duration of the displayed alternative.
    #[must_use]
    pub fn summary(&self) -> Option<RouteSummary> {
        self.displayed_route().map(RouteAlternative::summary)
    }

    fn illegal(&self, operation: &'static str) -> PlannerError {
        PlannerError::IllegalTransition {
            operation,
            state: self.state,
        }
    }

    /// A route is shown and every slot is filled, even if a newer request
    /// is still in flight.
    fn is_mutable(&self) -> bool {
        match self.state {
            PlannerState::Calculated => true,
            PlannerState::SelectingWaypoint { .. } => {
                self.displayed_route().is_some() && self.waypoints.iter().all(Option::is_some)
            }
            PlannerState::Idle => false,
        }
    }

    fn require_mutable(&self, operation: &'static str) -> Result<(), PlannerError> {
        if self.is_mutable() {
            Ok(())
        } else {
            Err(self.illegal(operation))
        }
    }

    /// Keep a selecting state inside the shortened stop list.
    fn clamp_selection(&mut self) {
        if let PlannerState::SelectingWaypoint { index } = self.state {
            let last = self.waypoints.len().saturating_sub(1);
            self.state = PlannerState::SelectingWaypoint {
                index: index.min(last),
            };
        }
    }

    /// Start a plan with an empty origin and destination.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] unless idle.
    pub fn begin(&mut self) -> Result<Transition, PlannerError> {
        if self.state != PlannerState::Idle {
            return Err(self.illegal("begin"));
        }
        self.waypoints = vec![None, None];
        self.state = PlannerState::SelectingWaypoint { index: 0 };
        Ok(Transition::AwaitingWaypoint { index: 0 })
    }

    /// Fill the slot being selected.
    ///
    /// From idle a plan is begun first. Once no slot is empty a request is
    /// issued and returned in [`Transition::Request`]; the planner stays in
    /// its selecting state until the response is applied. A route already
    /// shown stays mutable meanwhile, so stops can be removed, reordered or
    /// added before the response arrives.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] while calculated, and
    /// [`PlannerError::Routing`] if the filled stops do not form a valid
    /// request.
    pub fn select_waypoint(&mut self, waypoint: Waypoint) -> Result<Transition, PlannerError> {
        if self.state == PlannerState::Idle {
            self.begin()?;
        }
        let PlannerState::SelectingWaypoint { index } = self.state else {
            return Err(self.illegal("select_waypoint"));
        };
        let len = self.waypoints.len();
        let slot = self
            .waypoints
            .get_mut(index)
            .ok_or(PlannerError::IndexOutOfRange { index, len })?;
        *slot = Some(waypoint);

        if let Some(next) = self.waypoints.iter().position(Option::is_none) {
            self.state = PlannerState::SelectingWaypoint { index: next };
            return Ok(Transition::AwaitingWaypoint { index: next });
        }
        self.issue_request().map(Transition::Request)
    }

    /// Re-open the stop at `index` for selection.
    ///
    /// Any in-flight response is discarded when it arrives.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] unless a route is shown and no
    /// slot is empty; [`PlannerError::IndexOutOfRange`] for a bad index.
    pub fn edit_waypoint(&mut self, index: usize) -> Result<Transition, PlannerError> {
        self.require_mutable("edit_waypoint")?;
        self.check_index(index)?;
        self.pending = None;
        self.state = PlannerState::SelectingWaypoint { index };
        Ok(Transition::AwaitingWaypoint { index })
    }

    /// Insert an empty stop before the destination and select it.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] unless a route is shown and no
    /// slot is empty.
    pub fn add_waypoint(&mut self) -> Result<Transition, PlannerError> {
        self.require_mutable("add_waypoint")?;
        let index = self.waypoints.len().saturating_sub(1);
        self.waypoints.insert(index, None);
        self.pending = None;
        self.state = PlannerState::SelectingWaypoint { index };
        Ok(Transition::AwaitingWaypoint { index })
    }

    /// Remove an intermediate stop and request a new route.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] unless a route is shown and no
    /// slot is empty; [`PlannerError::IndexOutOfRange`] or
    /// [`PlannerError::ProtectedWaypoint`] for an index that is not an
    /// intermediate stop.
    pub fn remove_waypoint(&mut self, index: usize) -> Result<RouteRequest, PlannerError> {
        self.require_mutable("remove_waypoint")?;
        self.check_via(index)?;
        self.waypoints.remove(index);
        self.clamp_selection();
        self.issue_request()
    }

    /// Swap two intermediate stops and request a new route.
    ///
    /// # Errors
    ///
    /// As [`Self::remove_waypoint`], for either index.
    pub fn reorder_waypoint(&mut self, from: usize, to: usize) -> Result<RouteRequest, PlannerError> {
        self.require_mutable("reorder_waypoint")?;
        self.check_via(from)?;
        self.check_via(to)?;
        self.waypoints.swap(from, to);
        self.issue_request()
    }

    /// Change the travel mode, re-requesting the route if one is shown and
    /// no slot is empty.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Routing`] if the re-request cannot be built.
    pub fn set_travel_mode(&mut self, mode: TravelMode) -> Result<Option<RouteRequest>, PlannerError> {
        if self.mode == mode {
            return Ok(None);
        }
        self.mode = mode;
        self.reissue_if_calculated()
    }

    /// Change the route preference, re-requesting the route if one is shown
    /// and no slot is empty.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Routing`] if the re-request cannot be built.
    pub fn set_preference(
        &mut self,
        preference: RoutePreference,
    ) -> Result<Option<RouteRequest>, PlannerError> {
        if self.preference == preference {
            return Ok(None);
        }
        self.preference = preference;
        self.reissue_if_calculated()
    }

    fn reissue_if_calculated(&mut self) -> Result<Option<RouteRequest>, PlannerError> {
        if self.is_mutable() {
            self.issue_request().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Replace every stop at once and request a route through them.
    ///
    /// Nothing changes if the stops do not form a valid request. A shown
    /// route stays shown until the response arrives.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Routing`] for fewer than two stops or an invalid
    /// coordinate.
    pub fn load_waypoints(&mut self, waypoints: Vec<Waypoint>) -> Result<RouteRequest, PlannerError> {
        let directions = self.directions_for(&waypoints)?;
        self.waypoints = waypoints.iter().cloned().map(Some).collect();
        if self.state != PlannerState::Calculated {
            self.state = PlannerState::SelectingWaypoint {
                index: waypoints.len().saturating_sub(1),
            };
        }
        Ok(self.register(directions, waypoints))
    }

    /// Issue a request for the current stops, superseding any pending one.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] when idle,
    /// [`PlannerError::MissingWaypoint`] while a slot is empty and
    /// [`PlannerError::Routing`] for an invalid coordinate.
    pub fn issue_request(&mut self) -> Result<RouteRequest, PlannerError> {
        if self.state == PlannerState::Idle {
            return Err(self.illegal("issue_request"));
        }
        let stops = self
            .waypoints
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.clone().ok_or(PlannerError::MissingWaypoint { index }))
            .collect::<Result<Vec<_>, _>>()?;
        let directions = self.directions_for(&stops)?;
        Ok(self.register(directions, stops))
    }

    fn directions_for(&self, stops: &[Waypoint]) -> Result<DirectionsRequest, RoutingError> {
        let coordinates = stops.iter().map(Waypoint::coord).collect();
        DirectionsRequest::new(coordinates, self.mode, self.preference)
    }

    fn register(&mut self, directions: DirectionsRequest, stops: Vec<Waypoint>) -> RouteRequest {
        let token = RequestToken::after(self.last_token);
        self.last_token = Some(token);
        if let Some(stale) = self.pending.replace(PendingRequest::new(token, stops)) {
            log::debug!("route request {} superseded by {token}", stale.token());
        }
        RouteRequest { token, directions }
    }

    /// Apply the response to the request tagged `token`.
    ///
    /// A response for anything but the latest issued request is discarded.
    /// On success every alternative is kept, the first is drawn through
    /// `registry` and the planner becomes calculated.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Routing`] when the service failed or found no route,
    /// and [`PlannerError::Map`] if drawing failed. Neither changes the
    /// state or the displayed route; a partly drawn response is replaced by
    /// the route shown before it, or erased if there was none.
    pub fn apply_response<S: MapSurface>(
        &mut self,
        token: RequestToken,
        result: Result<Vec<RouteAlternative>, RoutingError>,
        registry: &mut MapLayerRegistry<S>,
    ) -> Result<ResponseOutcome, PlannerError> {
        let Some(pending) = self.pending.take_if(|pending| pending.token() == token) else {
            log::debug!("discarding stale route response {token}");
            return Ok(ResponseOutcome::Discarded { token });
        };
        let routes = match result {
            Ok(routes) => routes,
            Err(err) => {
                log::warn!("route request {token} failed: {err}");
                return Err(err.into());
            }
        };
        let Some(summary) = routes.first().map(RouteAlternative::summary) else {
            log::warn!("route request {token} found no route");
            return Err(RoutingError::NoRoute.into());
        };

        let stops = pending.into_waypoints();
        if let Err(err) = draw_plan(registry, &self.key, &routes, 0, &stops) {
            log::warn!("failed to draw route {token}: {err}");
            self.restore_drawing(registry);
            return Err(err.into());
        }
        let alternatives = routes.len();
        self.alternatives = routes;
        self.selected = Some(0);
        self.routed = stops;
        self.state = PlannerState::Calculated;
        Ok(ResponseOutcome::Applied {
            token,
            summary,
            alternatives,
        })
    }

    /// Resolve `request` synchronously through `provider` and apply it.
    ///
    /// # Errors
    ///
    /// As [`Self::apply_response`].
    pub fn resolve<P, S>(
        &mut self,
        provider: &P,
        request: &RouteRequest,
        registry: &mut MapLayerRegistry<S>,
    ) -> Result<ResponseOutcome, PlannerError>
    where
        P: DirectionsProvider + ?Sized,
        S: MapSurface,
    {
        let result = provider.route(&request.directions);
        self.apply_response(request.token, result, registry)
    }

    /// Issue a request for the current stops and resolve it.
    ///
    /// # Errors
    ///
    /// As [`Self::issue_request`] and [`Self::apply_response`].
    pub fn recalculate<P, S>(
        &mut self,
        provider: &P,
        registry: &mut MapLayerRegistry<S>,
    ) -> Result<ResponseOutcome, PlannerError>
    where
        P: DirectionsProvider + ?Sized,
        S: MapSurface,
    {
        let request = self.issue_request()?;
        self.resolve(provider, &request, registry)
    }

    /// Display another alternative from the last response. No request is
    /// made.
    ///
    /// # Errors
    ///
    /// [`PlannerError::IllegalTransition`] unless a route is shown and no
    /// slot is empty, [`PlannerError::UnknownAlternative`] for a bad index
    /// and [`PlannerError::Map`] if drawing failed, in which case the
    /// previous alternative is drawn again.
    pub fn select_alternative<S: MapSurface>(
        &mut self,
        index: usize,
        registry: &mut MapLayerRegistry<S>,
    ) -> Result<RouteSummary, PlannerError> {
        self.require_mutable("select_alternative")?;
        let summary = self
            .alternatives
            .get(index)
            .map(RouteAlternative::summary)
            .ok_or(PlannerError::UnknownAlternative {
                index,
                count: self.alternatives.len(),
            })?;
        if let Err(err) = draw_plan(registry, &self.key, &self.alternatives, index, &self.routed) {
            log::warn!("failed to draw alternative {index}: {err}");
            self.restore_drawing(registry);
            return Err(err.into());
        }
        self.selected = Some(index);
        Ok(summary)
    }

    /// Redraw the displayed route after a failed draw, or erase the plan's
    /// artifacts when nothing was displayed.
    fn restore_drawing<S: MapSurface>(&self, registry: &mut MapLayerRegistry<S>) {
        let restored = match self.selected {
            Some(selected) => {
                draw_plan(registry, &self.key, &self.alternatives, selected, &self.routed)
            }
            None => erase_plan(registry, &self.key),
        };
        if let Err(err) = restored {
            log::warn!("failed to restore the drawn plan under `{}`: {err}", self.key);
        }
    }

    /// Forget the plan and remove everything it drew.
    ///
    /// The planner is idle afterwards even if the surface fails to remove an
    /// artifact.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Map`] if the surface rejected a removal.
    pub fn clear_route<S: MapSurface>(
        &mut self,
        registry: &mut MapLayerRegistry<S>,
    ) -> Result<(), PlannerError> {
        self.state = PlannerState::Idle;
        self.waypoints.clear();
        self.alternatives.clear();
        self.selected = None;
        self.routed.clear();
        self.pending = None;
        erase_plan(registry, &self.key)?;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), PlannerError> {
        let len = self.waypoints.len();
        if index < len {
            Ok(())
        } else {
            Err(PlannerError::IndexOutOfRange { index, len })
        }
    }

    fn check_via(&self, index: usize) -> Result<(), PlannerError> {
        self.check_index(index)?;
        if WaypointRole::at(index, self.waypoints.len()) == Some(WaypointRole::Via) {
            Ok(())
        } else {
            Err(PlannerError::ProtectedWaypoint { index })
        }
    }
}
