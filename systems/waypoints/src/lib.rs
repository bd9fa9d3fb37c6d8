#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Waypoint generator that expands a destination into a walkable path.

use std::sync::Arc;

use geowalk_core::{
    collab::{Directions, DirectionsResponse},
    distance, Command, Event, LatLng, NavError, Target,
};
use geowalk_world::{self as world, query, World};

/// Destinations closer than this are always reached in a single hop.
pub const ROAD_FOLLOWING_MIN_DISTANCE_M: f64 = 10.0;

/// Configuration parameters required to construct the waypoint generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    follow_roads: bool,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(follow_roads: bool) -> Self {
        Self { follow_roads }
    }
}

/// Expands targets into ordered waypoint queues.
#[derive(Clone)]
pub struct WaypointGenerator {
    follow_roads: bool,
    directions: Option<Arc<dyn Directions>>,
}

impl std::fmt::Debug for WaypointGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaypointGenerator")
            .field("follow_roads", &self.follow_roads)
            .field("directions", &self.directions.is_some())
            .finish()
    }
}

impl WaypointGenerator {
    /// Creates a generator that walks straight to every destination until a
    /// directions service is attached.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            follow_roads: config.follow_roads,
            directions: None,
        }
    }

    /// Attaches the directions service used for road following.
    #[must_use]
    pub fn with_directions(mut self, directions: Arc<dyn Directions>) -> Self {
        self.directions = Some(directions);
        self
    }

    /// Reports whether paths follow roads rather than straight lines.
    #[must_use]
    pub fn follows_roads(&self) -> bool {
        self.follow_roads && self.directions.is_some()
    }

    /// Produces the ordered waypoints leading from `origin` to `target`.
    ///
    /// The target itself is always the last waypoint. Nothing is mutated, so
    /// a failed lookup leaves the caller's path untouched.
    pub async fn expand(&self, origin: LatLng, target: &Target) -> Result<Vec<Target>, NavError> {
        let directions = match &self.directions {
            Some(directions) if self.follow_roads => directions,
            _ => return Ok(vec![target.clone()]),
        };

        if distance(&origin, target) <= ROAD_FOLLOWING_MIN_DISTANCE_M {
            return Ok(vec![target.clone()]);
        }

        let response = directions.route(origin, target.coords()).await?;
        if let Some(message) = response.error_message {
            return Err(NavError::Directions(message));
        }

        let mut waypoints = flatten(&response);
        waypoints.push(target.clone());
        log::debug!(
            "road path to {} has {} waypoints",
            target.coords(),
            waypoints.len()
        );
        Ok(waypoints)
    }

    /// Expands `target` and installs it with its waypoints as the current path.
    ///
    /// The queue is only replaced once the whole path is known.
    pub async fn plan(
        &self,
        world: &mut World,
        target: Target,
        out_events: &mut Vec<Event>,
    ) -> Result<Vec<Target>, NavError> {
        let origin = query::position(world);
        let waypoints = self.expand(origin, &target).await?;
        world::apply(
            world,
            Command::ReplacePath {
                target: Some(target),
                waypoints: waypoints.clone(),
            },
            out_events,
        );
        Ok(waypoints)
    }
}

/// Intermediate waypoints of the first route, in walking order.
#[must_use]
pub fn flatten(response: &DirectionsResponse) -> Vec<Target> {
    response
        .routes
        .first()
        .map(|route| {
            route
                .legs
                .iter()
                .flat_map(|leg| &leg.steps)
                .map(|step| Target::waypoint(step.end_location))
                .collect()
        })
        .unwrap_or_default()
}
