use std::path::PathBuf;

use async_trait::async_trait;
use geowalk_core::{collab::TrackSource, LatLng, NavError};
use serde::Deserialize;

/// Track file made of `[[wpt]]` tables carrying `lat` and `lon`.
#[derive(Debug)]
pub(crate) struct TomlTrackSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TrackFile {
    #[serde(default)]
    wpt: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct Waypoint {
    lat: f64,
    lon: f64,
}

impl TomlTrackSource {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TrackSource for TomlTrackSource {
    async fn load(&self) -> Result<Vec<LatLng>, NavError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| NavError::Track(format!("{}: {error}", self.path.display())))?;
        parse(&contents).map_err(|reason| NavError::Track(format!("{}: {reason}", self.path.display())))
    }
}

fn parse(contents: &str) -> Result<Vec<LatLng>, String> {
    let file: TrackFile = toml::from_str(contents).map_err(|error| error.to_string())?;
    file.wpt
        .into_iter()
        .enumerate()
        .map(|(index, waypoint)| {
            let point = LatLng::new(waypoint.lat, waypoint.lon);
            if point.is_valid() {
                Ok(point)
            } else {
                Err(format!("waypoint {index} at {point} is out of range"))
            }
        })
        .collect()
}
