#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection strategies and the navigator that swaps between them.
//!
//! Every tick the driver asks the [`Navigator`] whether the current path still
//! holds. The active [`Router`] either keeps it, installs a new path through
//! the waypoint generator, or reports that its excursion finished, in which
//! case the previously active router takes over within the same tick.

use std::str::FromStr;

use async_trait::async_trait;
use geowalk_core::{Command, Event, NavError, Target};
use geowalk_system_waypoints::WaypointGenerator;
use geowalk_world::{self as world, query, World};

mod detour;
mod seeking;
mod track;

pub use detour::{DetourRouter, VisitRouter};
pub use seeking::{CreatureRouter, HumanRouter, StationaryRouter, StopRouter, DEFAULT_BALL_THRESHOLD};
pub use track::TrackRouter;

/// Mutable navigation state handed to a router for the duration of one tick.
#[derive(Debug)]
pub struct Context<'a> {
    /// Navigation state owned by the driver.
    pub world: &'a mut World,
    /// Generator used to turn a destination into waypoints.
    pub waypoints: &'a WaypointGenerator,
    /// Events emitted while the tick runs.
    pub events: &'a mut Vec<Event>,
}

impl Context<'_> {
    /// Applies `command` to the world.
    pub fn apply(&mut self, command: Command) {
        world::apply(self.world, command, self.events);
    }

    /// Plans a path from the current position to `target` and installs it.
    pub async fn plan(&mut self, target: Target) -> Result<Vec<Target>, NavError> {
        self.waypoints.plan(self.world, target, self.events).await
    }

    /// Records the current target as visited once its waypoints are drained.
    pub fn complete_arrival(&mut self) {
        if query::is_idle(self.world) && query::target(self.world).is_some() {
            self.apply(Command::CompleteTarget);
        }
    }
}

/// Outcome of a router tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// The current path is still valid.
    Hold,
    /// A new path was installed.
    Rerouted(Vec<Target>),
    /// The router is done and hands control back.
    Finished,
}

/// Strategy deciding where the avatar heads next.
#[async_trait]
pub trait Router: Send {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Validates the current path, replacing it when a better target exists.
    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError>;
}

/// Strategies selectable by name from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterKind {
    /// [`StationaryRouter`].
    Stationary,
    /// [`StopRouter`].
    Stops,
    /// [`HumanRouter`].
    Human,
    /// [`CreatureRouter`].
    Creatures,
    /// [`TrackRouter`].
    Track,
}

/// Raised when a router name is not recognized.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown router '{0}'")]
pub struct UnknownRouter(pub String);

impl FromStr for RouterKind {
    type Err = UnknownRouter;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "stand" | "stationary" => Ok(Self::Stationary),
            "stops" => Ok(Self::Stops),
            "human" => Ok(Self::Human),
            "creatures" => Ok(Self::Creatures),
            "track" => Ok(Self::Track),
            _ => Err(UnknownRouter(name.to_owned())),
        }
    }
}

/// Owns the active router and the routers suspended by detours.
pub struct Navigator {
    active: Box<dyn Router>,
    suspended: Vec<Box<dyn Router>>,
    waypoints: WaypointGenerator,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("active", &self.active.name())
            .field("suspended", &self.suspended.len())
            .field("waypoints", &self.waypoints)
            .finish()
    }
}

impl Navigator {
    /// Creates a navigator driving `router`.
    #[must_use]
    pub fn new(router: Box<dyn Router>, waypoints: WaypointGenerator) -> Self {
        Self {
            active: router,
            suspended: Vec::new(),
            waypoints,
        }
    }

    /// Name of the router currently in control.
    #[must_use]
    pub fn active_name(&self) -> &'static str {
        self.active.name()
    }

    /// Number of routers waiting for a detour to finish.
    #[must_use]
    pub fn detour_depth(&self) -> usize {
        self.suspended.len()
    }

    /// Replaces the active router, leaving suspended routers in place.
    pub fn set_router(&mut self, router: Box<dyn Router>) {
        log::info!("switching router from {} to {}", self.active.name(), router.name());
        self.active = router;
    }

    /// Suspends the active router until `router` finishes.
    pub fn detour(&mut self, router: Box<dyn Router>) {
        log::info!("{} detour suspends {}", router.name(), self.active.name());
        let previous = std::mem::replace(&mut self.active, router);
        self.suspended.push(previous);
    }

    /// Runs one routing tick.
    ///
    /// Returns the new waypoint queue when the path was replaced, or `None`
    /// when nothing changed. A router that finishes is replaced by the one it
    /// suspended, which handles the same tick.
    pub async fn check_path(
        &mut self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<Option<Vec<Target>>, NavError> {
        loop {
            let mut ctx = Context {
                world: &mut *world,
                waypoints: &self.waypoints,
                events: &mut *out_events,
            };
            let decision = self.active.check_path(&mut ctx).await?;
            match decision {
                Decision::Hold => return Ok(None),
                Decision::Rerouted(path) => return Ok(Some(path)),
                Decision::Finished => self.resume(),
            }
        }
    }

    fn resume(&mut self) {
        let previous = match self.suspended.pop() {
            Some(previous) => previous,
            None => {
                log::warn!("{} finished with nothing to resume, standing still", self.active.name());
                Box::new(StationaryRouter)
            }
        };
        let finished = std::mem::replace(&mut self.active, previous);
        log::info!("{} finished, resuming {}", finished.name(), self.active.name());
    }
}
