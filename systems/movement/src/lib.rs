#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement integrator that walks the avatar along the waypoint queue.

use std::sync::Arc;

use geowalk_core::{collab::Elevation, distance, Command, Event, LatLng, Target};
use geowalk_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A waypoint closer than this after a step counts as reached.
pub const ARRIVAL_RADIUS_M: f64 = 5.0;

/// Maximum absolute GPS noise added to each coordinate component, in degrees.
pub const FUZZ_DEGREES: f64 = 0.000_000_9;

/// Total width of the speed jitter band, as a fraction of the configured speed.
const SPEED_JITTER: f64 = 0.1;

/// Fuzzed coordinates keep fourteen decimals.
const COORDINATE_SCALE: f64 = 1e14;

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

const KMH_PER_MS: f64 = 3.6;

/// Configuration parameters required to construct the walker.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    speed_kmh: f64,
}

impl Config {
    /// Creates a new configuration walking at `speed_kmh` kilometers per hour.
    #[must_use]
    pub const fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

/// Advances the avatar one second at a time toward the head of the waypoint queue.
pub struct Walker {
    speed_kmh: f64,
    rng: ChaCha8Rng,
    elevation: Option<Arc<dyn Elevation>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("speed_kmh", &self.speed_kmh)
            .field("elevation", &self.elevation.is_some())
            .finish_non_exhaustive()
    }
}

impl Walker {
    /// Creates a walker whose noise sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(config: Config, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a walker seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy(config: Config) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    fn with_rng(config: Config, rng: ChaCha8Rng) -> Self {
        Self {
            speed_kmh: config.speed_kmh,
            rng,
            elevation: None,
        }
    }

    /// Attaches the elevation service used by [`Walker::altitude`].
    #[must_use]
    pub fn with_elevation(mut self, elevation: Arc<dyn Elevation>) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Configured walking speed in kilometers per hour.
    #[must_use]
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Moves the avatar one step toward the first waypoint.
    ///
    /// Does nothing when the speed is not a positive finite number or the
    /// queue is empty. The first
    /// waypoint is dequeued once the fuzzed position lands within
    /// [`ARRIVAL_RADIUS_M`] of it.
    pub fn walk(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return;
        }
        let Some(destination) = query::next_waypoint(world).map(Target::coords) else {
            return;
        };

        let jitter = (self.rng.gen::<f64>() - 0.5) * self.speed_kmh * SPEED_JITTER;
        let speed_ms = (self.speed_kmh + jitter) / KMH_PER_MS;

        let position = query::position(world);
        let steps = distance(&position, &destination) / speed_ms;
        let stepped = if steps <= 1.0 {
            destination
        } else {
            LatLng::new(
                position.lat() + (destination.lat() - position.lat()) / steps,
                position.lng() + (destination.lng() - position.lng()) / steps,
            )
        };

        let moved = self.fuzzed_location(stepped);
        world::apply(world, Command::MoveAvatar { position: moved }, out_events);

        if distance(&moved, &destination) < ARRIVAL_RADIUS_M {
            world::apply(world, Command::PopWaypoint, out_events);
        }
    }

    /// Returns `point` perturbed by up to [`FUZZ_DEGREES`] on each axis.
    ///
    /// The avatar position is not affected, which makes this suitable for
    /// reporting a noisy location to the game.
    pub fn fuzzed_location(&mut self, point: LatLng) -> LatLng {
        let lat = point.lat() + self.noise();
        let lng = point.lng() + self.noise();
        LatLng::new(round_coordinate(lat), round_coordinate(lng))
    }

    fn noise(&mut self) -> f64 {
        round_coordinate(self.rng.gen_range(-FUZZ_DEGREES..=FUZZ_DEGREES))
    }

    /// Ground elevation at `point`, or zero when it cannot be looked up.
    pub async fn altitude(&self, point: LatLng) -> f64 {
        let Some(elevation) = &self.elevation else {
            return 0.0;
        };
        match elevation.elevation(point).await {
            Ok(meters) => meters,
            Err(error) => {
                log::warn!("unable to get altitude: {error}");
                0.0
            }
        }
    }
}

fn round_coordinate(value: f64) -> f64 {
    let scaled = value * COORDINATE_SCALE;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INTEGER {
        return value;
    }
    scaled.round() / COORDINATE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_keeps_fourteen_decimals() {
        assert_eq!(round_coordinate(0.123_456_789_012_345_67), 0.123_456_789_012_35);
        assert_eq!(round_coordinate(-0.000_000_000_000_004), 0.0);
    }

    #[test]
    fn rounding_leaves_wide_values_alone() {
        let value = 179.123_456_789_012_345;
        assert_eq!(round_coordinate(value), value);
    }

    #[test]
    fn zero_speed_never_moves() {
        let mut walker = Walker::new(Config::new(0.0), 3);
        let origin = LatLng::new(10.0, 10.0);
        let mut world = World::new(origin);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ReplacePath {
                target: None,
                waypoints: vec![Target::waypoint(LatLng::new(10.001, 10.0))],
            },
            &mut events,
        );
        events.clear();

        walker.walk(&mut world, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::position(&world), origin);
    }

    #[test]
    fn non_finite_speed_never_moves() {
        let origin = LatLng::new(10.0, 10.0);
        for speed in [f64::NAN, f64::INFINITY, -2.0] {
            let mut walker = Walker::new(Config::new(speed), 3);
            let mut world = World::new(origin);
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::ReplacePath {
                    target: None,
                    waypoints: vec![Target::waypoint(LatLng::new(10.001, 10.0))],
                },
                &mut events,
            );
            events.clear();

            walker.walk(&mut world, &mut events);

            assert!(events.is_empty(), "speed {speed} moved the avatar");
            assert_eq!(query::position(&world), origin);
            assert_eq!(query::path(&world).waypoints().len(), 1);
        }
    }
}
