use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use geowalk_core::{Event, LatLng, NavError, Target};
use geowalk_system_movement::Walker;
use geowalk_system_routing::Navigator;
use geowalk_world::{query, World};
use tokio::time::MissedTickBehavior;

/// Consecutive failing ticks after which the driver gives up.
pub(crate) const MAX_CONSECUTIVE_FAILURES: u32 = 10;

pub(crate) const POSITION_FILE: &str = "position.json";

/// Runs routing and movement once per tick.
#[derive(Debug)]
pub(crate) struct Driver {
    world: World,
    navigator: Navigator,
    walker: Walker,
    failures: u32,
}

impl Driver {
    pub(crate) fn new(world: World, navigator: Navigator, walker: Walker) -> Self {
        Self {
            world,
            navigator,
            walker,
            failures: 0,
        }
    }

    pub(crate) fn position(&self) -> LatLng {
        query::position(&self.world)
    }

    /// Ticks every `period` until `ticks` have run, or forever without a limit.
    ///
    /// Ticks never overlap: a slow tick delays the following ones.
    pub(crate) async fn run(&mut self, period: Duration, ticks: Option<u64>) -> Result<()> {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut completed = 0;
        while ticks.map_or(true, |limit| completed < limit) {
            let _ = interval.tick().await;
            self.step().await?;
            completed += 1;
        }
        log::info!("stopped at {} after {completed} ticks", self.position());
        Ok(())
    }

    async fn step(&mut self) -> Result<()> {
        match self.tick().await {
            Ok(()) => self.failures = 0,
            Err(error) => {
                self.failures += 1;
                log::error!(
                    "tick failed ({}/{MAX_CONSECUTIVE_FAILURES}): {error}",
                    self.failures
                );
                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    bail!("too many consecutive failures, last one: {error}");
                }
            }
        }
        Ok(())
    }

    async fn tick(&mut self) -> Result<(), NavError> {
        let mut events = Vec::new();
        let routed = self.navigator.check_path(&mut self.world, &mut events).await;
        if let Ok(Some(path)) = &routed {
            log_route(self.position(), path);
        }
        if routed.is_ok() {
            self.walker.walk(&mut self.world, &mut events);
        }
        events.iter().for_each(report);
        routed.map(drop)
    }
}

fn log_route(position: LatLng, path: &[Target]) {
    let waypoints: Vec<String> = path.iter().map(|waypoint| waypoint.coords().to_string()).collect();
    log::info!("new route from {position}: {}", waypoints.join(" -> "));
}

fn report(event: &Event) {
    match event {
        Event::WorldRefreshed {
            buildings,
            creatures,
            chests,
        } => log::debug!("world has {buildings} buildings, {creatures} creatures and {chests} chests"),
        Event::WorldRejected { reason } => log::warn!("world snapshot rejected: {reason}"),
        Event::AvatarMoved { to, .. } => log::trace!("moved to {to}"),
        Event::AvatarTeleported { position } => log::info!("teleported to {position}"),
        Event::PathReplaced { target, waypoints } => match target {
            Some(id) => log::debug!("heading to {id} through {waypoints} waypoints"),
            None => log::debug!("path replaced with {waypoints} waypoints"),
        },
        Event::WaypointReached {
            waypoint,
            remaining,
        } => log::debug!("reached {}, {remaining} left", waypoint.coords()),
        Event::TargetVisited { id } => log::info!("visited {id}"),
    }
}

/// Writes `position` as JSON into `data_dir`.
pub(crate) fn save_position(data_dir: &Path, position: LatLng) -> Result<()> {
    let path = data_dir.join(POSITION_FILE);
    let json = serde_json::to_string(&position).context("failed to encode position")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
}
