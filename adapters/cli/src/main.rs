#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line driver that walks a simulated avatar tick by tick.

mod config;
mod driver;
mod logging;
mod scenario;
mod track;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use geowalk_core::{Command, Target};
use geowalk_system_movement::{Config as WalkerConfig, Walker};
use geowalk_system_routing::{
    CreatureRouter, DetourRouter, HumanRouter, Navigator, Router, RouterKind, StationaryRouter,
    StopRouter, TrackRouter,
};
use geowalk_system_waypoints::{Config as WaypointConfig, WaypointGenerator};
use geowalk_world::{self as world, World};

use crate::{
    config::{Args, Settings},
    driver::Driver,
    track::TomlTrackSource,
};

/// Entry point for the geowalk command-line interface.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    settings.apply(&args)?;
    logging::init(settings.level(), &settings.data_dir)?;
    log::info!("starting at {} with the {} router", settings.pos, settings.router);

    let mut world = World::new(settings.pos);
    if let Some(path) = &args.world {
        let snapshot = scenario::load_snapshot(path)?;
        let mut events = Vec::new();
        world::apply(&mut world, Command::RefreshWorld { snapshot }, &mut events);
    }

    let waypoints = WaypointGenerator::new(WaypointConfig::new(settings.follow_roads));
    if settings.follow_roads && !waypoints.follows_roads() {
        log::warn!("no directions service available, walking in straight lines");
    }
    let mut navigator = Navigator::new(build_router(&settings)?, waypoints);
    if let Some(point) = args.goto {
        navigator.detour(Box::new(DetourRouter::new(Target::waypoint(point))));
    }

    let walker_config = WalkerConfig::new(settings.speed);
    let walker = match args.seed {
        Some(seed) => Walker::new(walker_config, seed),
        None => Walker::from_entropy(walker_config),
    };

    let mut driver = Driver::new(world, navigator, walker);
    let outcome = driver.run(settings.tick(), args.ticks).await;
    if settings.save_position {
        driver::save_position(&settings.data_dir, driver.position())?;
    }
    outcome
}

fn build_router(settings: &Settings) -> Result<Box<dyn Router>> {
    Ok(match settings.router_kind() {
        RouterKind::Stationary => Box::new(StationaryRouter),
        RouterKind::Stops => Box::new(StopRouter),
        RouterKind::Human => Box::new(HumanRouter::new(settings.ball_threshold)),
        RouterKind::Creatures => Box::new(CreatureRouter),
        RouterKind::Track => {
            let Some(track) = &settings.track else {
                bail!("the track router needs a `track` file in the configuration");
            };
            let source = TomlTrackSource::new(settings.data_dir.join(track));
            Box::new(TrackRouter::new(Arc::new(source)))
        }
    })
}
