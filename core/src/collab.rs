//! Contracts for the external services the navigation core depends on.
//!
//! None of these are implemented against a live service inside the engine.
//! The driver wires concrete implementations in; tests use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{LatLng, NavError};

/// Walking directions between two coordinates.
#[async_trait]
pub trait Directions: Send + Sync {
    /// Requests a walking route from `origin` to `destination`.
    ///
    /// Transport failures, quota errors and missing routes are reported as
    /// [`NavError::Directions`]. A response carrying an `error_message` is
    /// treated as a failure by the waypoint generator.
    async fn route(&self, origin: LatLng, destination: LatLng)
        -> Result<DirectionsResponse, NavError>;
}

/// Directions answer in the common `routes → legs → steps` JSON layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Error reported by the service inside an otherwise successful reply.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One candidate route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Legs between the requested waypoints.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Leg of a route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Individual walking instructions.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Single walking instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Coordinate where the instruction ends.
    pub end_location: LatLng,
}

/// Ground elevation lookup.
#[async_trait]
pub trait Elevation: Send + Sync {
    /// Elevation of `point` in meters above sea level.
    async fn elevation(&self, point: LatLng) -> Result<f64, NavError>;
}

/// In-game action performed when a detour reaches its destination.
#[async_trait]
pub trait ArrivalAction: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Performs the action.
    async fn perform(&self) -> Result<(), NavError>;
}

/// Source of an ordered list of coordinates for the fixed-track router.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Loads every point of the track in order.
    async fn load(&self) -> Result<Vec<LatLng>, NavError>;
}
