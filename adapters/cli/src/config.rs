use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use geowalk_core::LatLng;
use geowalk_system_routing::{RouterKind, DEFAULT_BALL_THRESHOLD};
use serde::Deserialize;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

/// Walks a simulated avatar around real-world coordinates.
#[derive(Debug, Parser)]
#[command(name = "geowalk", version)]
pub(crate) struct Args {
    /// Configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub(crate) config: PathBuf,
    /// Router to use instead of the configured one.
    #[arg(long)]
    pub(crate) router: Option<String>,
    /// Walking speed in km/h.
    #[arg(long)]
    pub(crate) speed: Option<f64>,
    /// Stop after this many ticks.
    #[arg(long)]
    pub(crate) ticks: Option<u64>,
    /// Walk to LAT,LNG before handing over to the router.
    #[arg(long, value_parser = parse_lat_lng)]
    pub(crate) goto: Option<LatLng>,
    /// JSON world snapshot the routers select targets from.
    #[arg(long)]
    pub(crate) world: Option<PathBuf>,
    /// Seed for the walker noise, for reproducible runs.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

/// Settings read from the configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) pos: LatLng,
    pub(crate) router: String,
    pub(crate) speed: f64,
    pub(crate) follow_roads: bool,
    pub(crate) ball_threshold: u32,
    pub(crate) loglevel: String,
    pub(crate) data_dir: PathBuf,
    pub(crate) track: Option<String>,
    pub(crate) save_position: bool,
    pub(crate) tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pos: LatLng::new(48.845_622_2, 2.336_452_6),
            router: "stops".to_owned(),
            speed: 5.0,
            follow_roads: true,
            ball_threshold: DEFAULT_BALL_THRESHOLD,
            loglevel: "info".to_owned(),
            data_dir: PathBuf::from("data"),
            track: None,
            save_position: false,
            tick_ms: 1000,
        }
    }
}

impl Settings {
    /// Loads `path`, falling back to defaults when the default file is absent.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).context("failed to parse configuration toml")?;
        if !settings.pos.is_valid() {
            bail!("configured position {} is not a valid coordinate", settings.pos);
        }
        check_speed(settings.speed)?;
        Ok(settings)
    }

    /// Applies command-line overrides.
    pub(crate) fn apply(&mut self, args: &Args) -> Result<()> {
        if let Some(router) = &args.router {
            self.router.clone_from(router);
        }
        if let Some(speed) = args.speed {
            check_speed(speed)?;
            self.speed = speed;
        }
        Ok(())
    }

    /// Router selected by name, or stops when the name is unknown.
    pub(crate) fn router_kind(&self) -> RouterKind {
        self.router.parse().unwrap_or_else(|error| {
            log::warn!("{error}, using stops");
            RouterKind::Stops
        })
    }

    pub(crate) fn level(&self) -> log::LevelFilter {
        self.loglevel.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

fn check_speed(speed: f64) -> Result<()> {
    if !speed.is_finite() || speed < 0.0 {
        bail!("configured speed {speed} must be a non-negative number");
    }
    Ok(())
}

fn parse_lat_lng(value: &str) -> Result<LatLng, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|error| format!("invalid coordinate '{part}': {error}"))
    };
    let point = LatLng::new(parse(lat)?, parse(lng)?);
    if !point.is_valid() {
        return Err(format!("{point} is out of range"));
    }
    Ok(point)
}
