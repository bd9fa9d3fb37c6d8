//! Greedy strategies that pick the nearest interesting thing on the map.

use async_trait::async_trait;
use geowalk_core::{NavError, Target};
use geowalk_world::{
    query::{self, Visits},
    World,
};

use crate::{Context, Decision, Router};

/// Ball count below which the human router heads for a stop to restock.
pub const DEFAULT_BALL_THRESHOLD: u32 = 5;

/// Router that never leaves the current position.
#[derive(Clone, Copy, Debug, Default)]
pub struct StationaryRouter;

#[async_trait]
impl Router for StationaryRouter {
    fn name(&self) -> &'static str {
        "stand"
    }

    async fn check_path(&mut self, _ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        Ok(Decision::Hold)
    }
}

/// Router that tours the nearest unvisited stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct StopRouter;

#[async_trait]
impl Router for StopRouter {
    fn name(&self) -> &'static str {
        "stops"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        if !query::is_idle(ctx.world) {
            return Ok(Decision::Hold);
        }
        ctx.complete_arrival();

        let Some(stop) = query::nearest_stop(ctx.world, Visits::Exclude) else {
            return Ok(Decision::Hold);
        };
        log::debug!("heading to stop {}", describe(&stop));
        Ok(Decision::Rerouted(ctx.plan(stop).await?))
    }
}

/// Router that balances stops, creatures and chests like a person would.
///
/// Stops win outright while the ball supply is short. Otherwise the closest
/// of the nearest unvisited stop, the nearest creature and the nearest chest
/// is chosen by raw distance.
#[derive(Clone, Copy, Debug)]
pub struct HumanRouter {
    ball_threshold: u32,
}

impl HumanRouter {
    /// Creates a router that restocks when fewer than `ball_threshold` balls remain.
    #[must_use]
    pub const fn new(ball_threshold: u32) -> Self {
        Self { ball_threshold }
    }

    fn select(&self, world: &World) -> Option<Target> {
        let balls = query::ball_count(world);
        if balls < self.ball_threshold {
            if let Some(stop) = query::nearest_stop(world, Visits::Include) {
                log::debug!("{balls} balls left, restocking");
                return Some(stop);
            }
        }

        [
            query::nearest_stop(world, Visits::Exclude),
            query::nearest_creature(world),
            query::nearest_chest(world),
        ]
        .into_iter()
        .flatten()
        .fold(None, |best: Option<Target>, candidate| match best {
            Some(best) if meters(&best) <= meters(&candidate) => Some(best),
            _ => Some(candidate),
        })
    }
}

impl Default for HumanRouter {
    fn default() -> Self {
        Self::new(DEFAULT_BALL_THRESHOLD)
    }
}

#[async_trait]
impl Router for HumanRouter {
    fn name(&self) -> &'static str {
        "human"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        ctx.complete_arrival();
        let candidate = self.select(ctx.world);
        pursue(ctx, candidate).await
    }
}

/// Router that chases creatures first and falls back to stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct CreatureRouter;

#[async_trait]
impl Router for CreatureRouter {
    fn name(&self) -> &'static str {
        "creatures"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        ctx.complete_arrival();
        let world = &*ctx.world;
        let candidate = query::nearest_wild(world)
            .or_else(|| query::nearest_radar(world))
            .or_else(|| query::nearest_stop(world, Visits::Exclude));
        pursue(ctx, candidate).await
    }
}

/// Installs a path to `candidate` unless it is already the current target.
///
/// A candidate on the spot the avatar just arrived at is also held, so a
/// target that stays in the snapshot after arrival is not planned again.
async fn pursue(ctx: &mut Context<'_>, candidate: Option<Target>) -> Result<Decision, NavError> {
    let Some(candidate) = candidate else {
        return Ok(Decision::Hold);
    };
    let settled = query::target(ctx.world).or_else(|| query::arrived(ctx.world));
    if settled.is_some_and(|current| current.same_location(&candidate)) {
        return Ok(Decision::Hold);
    }

    log::debug!("new target {}", describe(&candidate));
    Ok(Decision::Rerouted(ctx.plan(candidate).await?))
}

fn meters(target: &Target) -> f64 {
    target.distance().unwrap_or(f64::INFINITY)
}

fn describe(target: &Target) -> String {
    match (target.id(), target.distance()) {
        (Some(id), Some(meters)) => format!("{id} ({meters:.0} m)"),
        (Some(id), None) => id.to_string(),
        (None, _) => target.coords().to_string(),
    }
}
