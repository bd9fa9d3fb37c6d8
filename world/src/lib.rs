#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative navigation state for geowalk.
//!
//! The [`World`] owns the avatar position, the path state shared between the
//! router and the walker, and the latest world snapshot reported by the game.
//! It is only ever mutated through [`apply`], and read through [`query`].

use std::collections::{HashSet, VecDeque};

use geowalk_core::{Command, Event, LatLng, Target, TargetId, WorldSnapshot};

/// Progress toward the current destination.
#[derive(Clone, Debug, Default)]
pub struct PathState {
    visited: HashSet<TargetId>,
    waypoints: VecDeque<Target>,
    target: Option<Target>,
    arrived: Option<Target>,
}

impl PathState {
    /// Destination currently pursued.
    #[must_use]
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Destination most recently completed, until a new path is installed.
    #[must_use]
    pub fn arrived(&self) -> Option<&Target> {
        self.arrived.as_ref()
    }

    /// Ordered waypoints still to be reached, front first.
    #[must_use]
    pub fn waypoints(&self) -> &VecDeque<Target> {
        &self.waypoints
    }

    /// Reports whether the destination with the provided identifier was reached before.
    #[must_use]
    pub fn is_visited(&self, id: &TargetId) -> bool {
        self.visited.contains(id)
    }

    /// Number of distinct destinations reached so far.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Navigation state owned by the tick driver.
#[derive(Clone, Debug)]
pub struct World {
    position: LatLng,
    path: PathState,
    snapshot: Option<WorldSnapshot>,
}

impl World {
    /// Creates a world with the avatar standing at `position` and no snapshot yet.
    #[must_use]
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            path: PathState::default(),
            snapshot: None,
        }
    }
}

/// Applies the provided command to the world, recording resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RefreshWorld { snapshot } => {
            if let Err(error) = snapshot.validate() {
                log::warn!("keeping previous world snapshot: {error}");
                out_events.push(Event::WorldRejected {
                    reason: error.to_string(),
                });
                return;
            }

            out_events.push(Event::WorldRefreshed {
                buildings: snapshot.buildings.len(),
                creatures: snapshot.creatures.wilds.len() + snapshot.creatures.in_radar.len(),
                chests: snapshot.chests.len(),
            });
            world.snapshot = Some(snapshot);
        }
        Command::MoveAvatar { position } => {
            let from = world.position;
            world.position = position;
            out_events.push(Event::AvatarMoved { from, to: position });
        }
        Command::TeleportAvatar { position } => {
            world.position = position;
            out_events.push(Event::AvatarTeleported { position });
        }
        Command::ReplacePath { target, waypoints } => {
            out_events.push(Event::PathReplaced {
                target: target.as_ref().and_then(Target::id).cloned(),
                waypoints: waypoints.len(),
            });
            world.path.target = target;
            world.path.arrived = None;
            world.path.waypoints = waypoints.into();
        }
        Command::PopWaypoint => {
            if let Some(waypoint) = world.path.waypoints.pop_front() {
                out_events.push(Event::WaypointReached {
                    waypoint,
                    remaining: world.path.waypoints.len(),
                });
            }
        }
        Command::CompleteTarget => {
            let Some(target) = world.path.target.take() else {
                return;
            };
            if let Some(id) = target.id() {
                if world.path.visited.insert(id.clone()) {
                    out_events.push(Event::TargetVisited { id: id.clone() });
                }
            }
            world.path.arrived = Some(target);
        }
    }
}

/// Query functions that expose read-only world state.
pub mod query {
    use geowalk_core::{distance, Building, LatLng, Locate, Sighting, Target, WorldSnapshot};

    use super::{PathState, World};

    /// Whether already visited destinations may be selected again.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Visits {
        /// Skip destinations recorded in the visited set.
        Exclude,
        /// Consider every destination regardless of past visits.
        Include,
    }

    /// Current avatar position.
    #[must_use]
    pub fn position(world: &World) -> LatLng {
        world.position
    }

    /// Path state shared between the router and the walker.
    #[must_use]
    pub fn path(world: &World) -> &PathState {
        &world.path
    }

    /// Destination currently pursued.
    #[must_use]
    pub fn target(world: &World) -> Option<&Target> {
        world.path.target()
    }

    /// Destination the avatar completed last and is still standing on.
    #[must_use]
    pub fn arrived(world: &World) -> Option<&Target> {
        world.path.arrived()
    }

    /// Waypoint the walker is heading toward.
    #[must_use]
    pub fn next_waypoint(world: &World) -> Option<&Target> {
        world.path.waypoints.front()
    }

    /// Reports whether the waypoint queue is drained.
    #[must_use]
    pub fn is_idle(world: &World) -> bool {
        world.path.waypoints.is_empty()
    }

    /// Latest snapshot reported by the game, if one arrived yet.
    #[must_use]
    pub fn snapshot(world: &World) -> Option<&WorldSnapshot> {
        world.snapshot.as_ref()
    }

    /// Number of balls held according to the latest snapshot.
    #[must_use]
    pub fn ball_count(world: &World) -> u32 {
        snapshot(world).map_or(0, WorldSnapshot::ball_count)
    }

    /// Closest usable stop building.
    #[must_use]
    pub fn nearest_stop(world: &World, visits: Visits) -> Option<Target> {
        let snapshot = snapshot(world)?;
        let candidates = snapshot.buildings.iter().filter(|building| {
            building.is_usable_stop()
                && (visits == Visits::Include || !world.path.is_visited(&building.id))
        });
        nearest(world.position, candidates).map(|(building, meters)| building_target(building, meters))
    }

    /// Closest wild creature visible on the map.
    #[must_use]
    pub fn nearest_wild(world: &World) -> Option<Target> {
        let snapshot = snapshot(world)?;
        nearest(world.position, snapshot.creatures.wilds.iter())
            .map(|(sighting, meters)| sighting_target(sighting, meters))
    }

    /// Closest creature known only through the radar.
    #[must_use]
    pub fn nearest_radar(world: &World) -> Option<Target> {
        let snapshot = snapshot(world)?;
        nearest(world.position, snapshot.creatures.in_radar.iter())
            .map(|(sighting, meters)| sighting_target(sighting, meters))
    }

    /// Closest creature among wild and radar sightings.
    ///
    /// A creature reported by both sources is considered once, at the
    /// position of its first report.
    #[must_use]
    pub fn nearest_creature(world: &World) -> Option<Target> {
        let snapshot = snapshot(world)?;
        let creatures = &snapshot.creatures;
        let mut seen = std::collections::HashSet::new();
        let unique = creatures
            .wilds
            .iter()
            .chain(&creatures.in_radar)
            .filter(|sighting| seen.insert(&sighting.id));
        nearest(world.position, unique).map(|(sighting, meters)| sighting_target(sighting, meters))
    }

    /// Closest unopened chest.
    #[must_use]
    pub fn nearest_chest(world: &World) -> Option<Target> {
        let snapshot = snapshot(world)?;
        nearest(world.position, snapshot.chests.iter())
            .map(|(chest, meters)| Target::new(chest.id.clone(), chest.coords).with_distance(meters))
    }

    /// Selects the closest candidate, keeping the earliest one on ties.
    pub fn nearest<'a, T, I>(origin: LatLng, candidates: I) -> Option<(&'a T, f64)>
    where
        T: Locate + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut best: Option<(&'a T, f64)> = None;
        for candidate in candidates {
            let meters = distance(&origin, candidate);
            match best {
                Some((_, closest)) if closest <= meters => {}
                _ => best = Some((candidate, meters)),
            }
        }
        best
    }

    fn building_target(building: &Building, meters: f64) -> Target {
        Target::new(building.id.clone(), building.coords).with_distance(meters)
    }

    fn sighting_target(sighting: &Sighting, meters: f64) -> Target {
        Target::new(sighting.id.clone(), sighting.coords).with_distance(meters)
    }
}
