//! Temporary routers that walk to one place and then hand control back.

use std::sync::Arc;

use async_trait::async_trait;
use geowalk_core::{collab::ArrivalAction, Building, Command, NavError, Target};
use geowalk_world::query;

use crate::{Context, Decision, Router};

#[derive(Debug)]
enum Leg {
    Dispatched(Vec<Target>),
    EnRoute,
    Arrived,
}

/// Walk to a single destination, planned on the first tick.
#[derive(Debug)]
struct Excursion {
    destination: Target,
    dispatched: bool,
}

impl Excursion {
    fn new(destination: Target) -> Self {
        Self {
            destination,
            dispatched: false,
        }
    }

    async fn advance(&mut self, ctx: &mut Context<'_>) -> Result<Leg, NavError> {
        if !self.dispatched {
            let path = ctx.plan(self.destination.clone()).await?;
            self.dispatched = true;
            log::info!("detouring to {}", self.destination.coords());
            return Ok(Leg::Dispatched(path));
        }
        if !query::is_idle(ctx.world) {
            return Ok(Leg::EnRoute);
        }

        ctx.apply(Command::ReplacePath {
            target: None,
            waypoints: Vec::new(),
        });
        Ok(Leg::Arrived)
    }
}

/// Router for a manual "go to" request.
#[derive(Debug)]
pub struct DetourRouter {
    excursion: Excursion,
}

impl DetourRouter {
    /// Creates a detour to `destination`.
    #[must_use]
    pub fn new(destination: Target) -> Self {
        Self {
            excursion: Excursion::new(destination),
        }
    }
}

#[async_trait]
impl Router for DetourRouter {
    fn name(&self) -> &'static str {
        "detour"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        Ok(match self.excursion.advance(ctx).await? {
            Leg::Dispatched(path) => Decision::Rerouted(path),
            Leg::EnRoute => Decision::Hold,
            Leg::Arrived => {
                log::info!("reached {}", self.excursion.destination.coords());
                Decision::Finished
            }
        })
    }
}

/// Router for a side trip to a special building.
///
/// Every arrival action runs once the building is reached, in order. A failing
/// action is logged and does not prevent the others from running.
pub struct VisitRouter {
    excursion: Excursion,
    actions: Vec<Arc<dyn ArrivalAction>>,
}

impl std::fmt::Debug for VisitRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|action| action.name()).collect();
        f.debug_struct("VisitRouter")
            .field("excursion", &self.excursion)
            .field("actions", &actions)
            .finish()
    }
}

impl VisitRouter {
    /// Creates a visit to `building` that performs `actions` on arrival.
    #[must_use]
    pub fn new(building: &Building, actions: Vec<Arc<dyn ArrivalAction>>) -> Self {
        Self {
            excursion: Excursion::new(Target::new(building.id.clone(), building.coords)),
            actions,
        }
    }

    async fn perform_actions(&self) -> Vec<(&str, Result<(), NavError>)> {
        let mut outcomes = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            outcomes.push((action.name(), action.perform().await));
        }
        outcomes
    }
}

#[async_trait]
impl Router for VisitRouter {
    fn name(&self) -> &'static str {
        "visit"
    }

    async fn check_path(&mut self, ctx: &mut Context<'_>) -> Result<Decision, NavError> {
        match self.excursion.advance(ctx).await? {
            Leg::Dispatched(path) => Ok(Decision::Rerouted(path)),
            Leg::EnRoute => Ok(Decision::Hold),
            Leg::Arrived => {
                let outcomes = self.perform_actions().await;
                let mut failures = 0;
                for (name, outcome) in &outcomes {
                    if let Err(error) = outcome {
                        log::error!("{name} on arrival: {error}");
                        failures += 1;
                    }
                }
                log::info!(
                    "visit finished, {} of {} actions succeeded",
                    outcomes.len() - failures,
                    outcomes.len()
                );
                Ok(Decision::Finished)
            }
        }
    }
}
