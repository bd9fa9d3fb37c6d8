#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the geowalk navigation engine.
//!
//! This crate defines the message surface that connects the tick driver, the
//! authoritative navigation world, and the routing and movement systems.
//! Systems submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then reports
//! [`Event`] values so the driver can observe what changed during a tick.
//! Everything the core needs from the outside (directions, elevation,
//! in-game actions, track files) is expressed as a collaborator trait in
//! [`collab`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod collab;
pub mod geo;

pub use geo::{distance, Locate};

/// Geographic coordinate expressed in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Creates a new coordinate from latitude and longitude degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Reports whether both components are finite and inside WGS-84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lng)
    }
}

/// Identifier of a destination the avatar can visit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a new identifier from the provided value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate destination or intermediate waypoint.
///
/// Targets are immutable: selecting a new destination replaces the previous
/// target rather than editing it. Intermediate road-following waypoints carry
/// no identifier because they are never recorded as visited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    id: Option<TargetId>,
    coords: LatLng,
    distance: Option<f64>,
}

impl Target {
    /// Creates a target for an identified destination.
    #[must_use]
    pub fn new(id: TargetId, coords: LatLng) -> Self {
        Self {
            id: Some(id),
            coords,
            distance: None,
        }
    }

    /// Creates an anonymous waypoint at the provided coordinate.
    #[must_use]
    pub const fn waypoint(coords: LatLng) -> Self {
        Self {
            id: None,
            coords,
            distance: None,
        }
    }

    /// Returns a copy of the target annotated with its distance from the avatar.
    #[must_use]
    pub fn with_distance(self, meters: f64) -> Self {
        Self {
            distance: Some(meters),
            ..self
        }
    }

    /// Identifier of the destination, if any.
    #[must_use]
    pub fn id(&self) -> Option<&TargetId> {
        self.id.as_ref()
    }

    /// Coordinate of the target.
    #[must_use]
    pub const fn coords(&self) -> LatLng {
        self.coords
    }

    /// Distance in meters computed when the target was selected.
    #[must_use]
    pub const fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Reports whether both targets point at exactly the same coordinate.
    #[must_use]
    pub fn same_location(&self, other: &Target) -> bool {
        self.coords == other.coords
    }
}

/// Category of an in-world building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Supply stop that can be spun for items.
    Stop,
    /// Special building hosting a temporary side activity.
    Dungeon,
    /// Any other building the navigation core ignores.
    Other,
}

/// Fixed interactable location reported by the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Identifier assigned by the game.
    pub id: TargetId,
    /// Location of the building.
    pub coords: LatLng,
    /// Category of the building.
    pub kind: BuildingKind,
    /// Whether the building currently accepts interactions.
    #[serde(default = "available_by_default")]
    pub available: bool,
    /// Whether the building is cooling down after a recent interaction.
    #[serde(default)]
    pub cooldown: bool,
}

fn available_by_default() -> bool {
    true
}

impl Building {
    /// Reports whether the building is a stop that can be used right now.
    #[must_use]
    pub fn is_usable_stop(&self) -> bool {
        self.kind == BuildingKind::Stop && self.available && !self.cooldown
    }
}

/// Creature observed near the avatar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Identifier of the creature encounter.
    pub id: TargetId,
    /// Location of the sighting.
    pub coords: LatLng,
}

/// Creature sightings split by how they were observed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatureSightings {
    /// Creatures visible on the map around the avatar.
    #[serde(default)]
    pub wilds: Vec<Sighting>,
    /// Creatures only known through the radar.
    #[serde(default)]
    pub in_radar: Vec<Sighting>,
}

/// Collectable chest lying on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chest {
    /// Identifier of the chest.
    pub id: TargetId,
    /// Location of the chest.
    pub coords: LatLng,
}

/// Category of a held inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Basic throwing ball.
    BallSimple,
    /// Intermediate throwing ball.
    BallNormal,
    /// Best throwing ball.
    BallGood,
    /// Any item the navigation core does not care about.
    Other,
}

impl ItemKind {
    /// Reports whether the item can be thrown at creatures.
    #[must_use]
    pub const fn is_ball(self) -> bool {
        matches!(self, Self::BallSimple | Self::BallNormal | Self::BallGood)
    }
}

/// Held quantity of a single item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Category of the item.
    pub kind: ItemKind,
    /// Number of items held.
    pub count: u32,
}

/// Read-only view of the game world supplied after each map refresh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    /// Buildings around the avatar.
    pub buildings: Vec<Building>,
    /// Creature sightings around the avatar.
    pub creatures: CreatureSightings,
    /// Chests around the avatar.
    pub chests: Vec<Chest>,
    /// Items held by the player.
    pub inventory: Vec<ItemStack>,
}

impl WorldSnapshot {
    /// Total number of throwable balls held by the player.
    #[must_use]
    pub fn ball_count(&self) -> u32 {
        self.inventory
            .iter()
            .filter(|stack| stack.kind.is_ball())
            .map(|stack| stack.count)
            .fold(0, u32::saturating_add)
    }

    /// Verifies that every reported location is a usable coordinate.
    pub fn validate(&self) -> Result<(), NavError> {
        let buildings = self
            .buildings
            .iter()
            .map(|building| (&building.id, building.coords));
        let creatures = self
            .creatures
            .wilds
            .iter()
            .chain(&self.creatures.in_radar)
            .map(|sighting| (&sighting.id, sighting.coords));
        let chests = self.chests.iter().map(|chest| (&chest.id, chest.coords));

        for (id, coords) in buildings.chain(creatures).chain(chests) {
            if !coords.is_valid() {
                return Err(NavError::MalformedSnapshot(format!(
                    "'{id}' reports invalid coordinates {coords}"
                )));
            }
        }
        Ok(())
    }
}

/// Commands that express all permissible navigation state mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world snapshot after a map refresh.
    RefreshWorld {
        /// Snapshot reported by the game.
        snapshot: WorldSnapshot,
    },
    /// Moves the avatar by one integration step.
    MoveAvatar {
        /// Position reached at the end of the step.
        position: LatLng,
    },
    /// Places the avatar at a position without walking there.
    TeleportAvatar {
        /// Position the avatar should occupy.
        position: LatLng,
    },
    /// Atomically replaces the pursued target and the waypoint queue.
    ReplacePath {
        /// Destination being pursued, or `None` to go idle.
        target: Option<Target>,
        /// Ordered waypoints leading to the destination.
        waypoints: Vec<Target>,
    },
    /// Removes the first waypoint from the queue after arrival.
    PopWaypoint,
    /// Records the current target as visited and clears it.
    CompleteTarget,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new snapshot was stored.
    WorldRefreshed {
        /// Number of buildings in the snapshot.
        buildings: usize,
        /// Number of creature sightings in the snapshot.
        creatures: usize,
        /// Number of chests in the snapshot.
        chests: usize,
    },
    /// Reports that a snapshot was rejected and the previous one kept.
    WorldRejected {
        /// Human readable reason for the rejection.
        reason: String,
    },
    /// Confirms that the avatar advanced by one step.
    AvatarMoved {
        /// Position before the step.
        from: LatLng,
        /// Position after the step.
        to: LatLng,
    },
    /// Confirms that the avatar was placed without walking.
    AvatarTeleported {
        /// Position the avatar now occupies.
        position: LatLng,
    },
    /// Announces a freshly planned path.
    PathReplaced {
        /// Identifier of the new destination, if it has one.
        target: Option<TargetId>,
        /// Number of waypoints in the new queue.
        waypoints: usize,
    },
    /// Confirms that the avatar reached the head of the waypoint queue.
    WaypointReached {
        /// Waypoint that was consumed.
        waypoint: Target,
        /// Number of waypoints still queued.
        remaining: usize,
    },
    /// Confirms that a destination was recorded as visited.
    TargetVisited {
        /// Identifier added to the visited set.
        id: TargetId,
    },
}

/// Failures surfaced by the navigation core and its collaborators.
#[derive(Debug, Error)]
pub enum NavError {
    /// The directions collaborator failed or answered with an error message.
    #[error("directions lookup failed: {0}")]
    Directions(String),
    /// The elevation collaborator failed.
    #[error("elevation lookup failed: {0}")]
    Elevation(String),
    /// The track could not be loaded or contained no points.
    #[error("track unavailable: {0}")]
    Track(String),
    /// An in-game action performed on arrival failed.
    #[error("action '{name}' failed: {reason}")]
    Action {
        /// Name of the failed action.
        name: String,
        /// Reason reported by the collaborator.
        reason: String,
    },
    /// The world snapshot contains unusable data.
    #[error("malformed world snapshot: {0}")]
    MalformedSnapshot(String),
}
