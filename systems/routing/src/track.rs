use std::sync::Arc;

use async_trait::async_trait;
use geowalk_core::{collab::TrackSource, Command, LatLng, NavError, Target};
use geowalk_world::query;

use crate::{Context, Decision, Router};

/// Router that loops over a fixed list of coordinates.
///
/// The track is loaded on the first tick, which also teleports the avatar to
/// its first point. Points are then visited in order, wrapping around after
/// the last one.
pub struct TrackRouter {
    source: Arc<dyn TrackSource>,
    points: Vec<LatLng>,
    next: usize,
}

impl std::fmt::Debug for TrackRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackRouter")
            .field("points", &self.points.len())
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl TrackRouter {
    /// Creates a router that reads its track from `source` on first use.
    #[must_use]
    pub fn new(source: Arc<dyn TrackSource>) -> Self {
        Self {
            source,
            points: Vec::new(),
            next: 0,
        }
    }

    async fn load(&mut self, ctx: &mut Context<'_>) -> Result<(), NavError> {
        let points = self.source.load().await?;
        let Some(&start) = points.first() else {
            return Err(NavError::Track("track has no waypoints".to_owned()));
        };

        log::info!("loaded track of {} points starting at {start}", points.len());
        ctx.apply(Command::TeleportAvatar { position: start });
        self.points = points;
        self.next = 1 % self.points.len();
        Ok(())
    }
}

#[async_trait]
impl Router for TrackRouter {
    fn name(&self) -> &'static str {
        "track"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        if self.points.is_empty() {
            self.load(ctx).await?;
        }
        if !query::is_idle(ctx.world) {
            return Ok(Decision::Hold);
        }

        let point = self.points[self.next];
        let path = ctx.plan(Target::waypoint(point)).await?;
        self.next = (self.next + 1) % self.points.len();
        Ok(Decision::Rerouted(path))
    }
}
