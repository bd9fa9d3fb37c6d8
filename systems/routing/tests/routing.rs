use geowalk_core::{
    geo, Building, BuildingKind, Chest, Command, CreatureSightings, Event, ItemKind, ItemStack,
    LatLng, Sighting, Target, TargetId, WorldSnapshot,
};
use geowalk_system_routing::{
    CreatureRouter, Decision, HumanRouter, Navigator, Router, StationaryRouter, StopRouter,
};
use geowalk_system_waypoints::{Config, WaypointGenerator};
use geowalk_world::{self as world, query, World};

const ORIGIN: LatLng = LatLng::new(48.8566, 2.3522);

fn stop(id: &str, north_m: f64) -> Building {
    Building {
        id: TargetId::new(id),
        coords: geo::offset(ORIGIN, north_m, 0.0),
        kind: BuildingKind::Stop,
        available: true,
        cooldown: false,
    }
}

fn sighting(id: &str, east_m: f64) -> Sighting {
    Sighting {
        id: TargetId::new(id),
        coords: geo::offset(ORIGIN, 0.0, east_m),
    }
}

fn chest(id: &str, south_m: f64) -> Chest {
    Chest {
        id: TargetId::new(id),
        coords: geo::offset(ORIGIN, -south_m, 0.0),
    }
}

fn balls(count: u32) -> Vec<ItemStack> {
    vec![ItemStack {
        kind: ItemKind::BallSimple,
        count,
    }]
}

fn world_with(snapshot: WorldSnapshot) -> World {
    let mut world = World::new(ORIGIN);
    let mut events = Vec::new();
    world::apply(&mut world, Command::RefreshWorld { snapshot }, &mut events);
    world
}

/// Drains the waypoint queue as if the walker had reached the target.
fn arrive(world: &mut World) {
    let mut events = Vec::new();
    while !query::is_idle(world) {
        world::apply(world, Command::PopWaypoint, &mut events);
    }
}

async fn tick(router: &mut dyn Router, world: &mut World) -> Decision {
    let generator = WaypointGenerator::new(Config::new(false));
    let mut events = Vec::new();
    let mut ctx = geowalk_system_routing::Context {
        world,
        waypoints: &generator,
        events: &mut events,
    };
    router.check_path(&mut ctx).await.expect("routing succeeds")
}

fn chosen(decision: &Decision) -> Option<&str> {
    match decision {
        Decision::Rerouted(path) => path.last().and_then(Target::id).map(TargetId::as_str),
        _ => None,
    }
}

#[tokio::test]
async fn stationary_router_never_moves() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("near", 20.0)],
        ..WorldSnapshot::default()
    });

    for _ in 0..3 {
        assert_eq!(tick(&mut StationaryRouter, &mut world).await, Decision::Hold);
    }
    assert!(query::target(&world).is_none());
}

#[tokio::test]
async fn stop_router_visits_nearest_stops_in_order() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("far", 80.0), stop("near", 20.0)],
        ..WorldSnapshot::default()
    });
    let mut router = StopRouter;

    let first = tick(&mut router, &mut world).await;
    assert_eq!(chosen(&first), Some("near"));
    assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);

    arrive(&mut world);
    let second = tick(&mut router, &mut world).await;
    assert_eq!(chosen(&second), Some("far"));
    assert!(query::path(&world).is_visited(&TargetId::new("near")));
}

#[tokio::test]
async fn stop_router_never_selects_visited_stops() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("a", 10.0), stop("b", 30.0), stop("c", 60.0)],
        ..WorldSnapshot::default()
    });
    let mut router = StopRouter;
    let mut picked = Vec::new();

    loop {
        let decision = tick(&mut router, &mut world).await;
        let Some(id) = chosen(&decision) else {
            break;
        };
        assert!(!query::path(&world).is_visited(&TargetId::new(id)));
        picked.push(id.to_owned());
        arrive(&mut world);
    }

    assert_eq!(picked, vec!["a", "b", "c"]);
    assert_eq!(query::path(&world).visited_count(), 3);
}

#[tokio::test]
async fn stop_router_skips_unavailable_and_cooling_stops() {
    let mut closed = stop("closed", 5.0);
    closed.available = false;
    let mut cooling = stop("cooling", 10.0);
    cooling.cooldown = true;
    let mut dungeon = stop("dungeon", 12.0);
    dungeon.kind = BuildingKind::Dungeon;
    let mut world = world_with(WorldSnapshot {
        buildings: vec![closed, cooling, dungeon, stop("open", 40.0)],
        ..WorldSnapshot::default()
    });

    let decision = tick(&mut StopRouter, &mut world).await;

    assert_eq!(chosen(&decision), Some("open"));
}

#[tokio::test]
async fn stop_router_holds_without_snapshot() {
    let mut world = World::new(ORIGIN);
    assert_eq!(tick(&mut StopRouter, &mut world).await, Decision::Hold);
}

#[tokio::test]
async fn human_router_restocks_when_short_of_balls() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("stop", 90.0)],
        creatures: CreatureSightings {
            wilds: vec![sighting("wild", 10.0)],
            in_radar: Vec::new(),
        },
        chests: vec![chest("chest", 5.0)],
        inventory: balls(4),
    });
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ReplacePath {
            target: Some(Target::new(TargetId::new("stop"), geo::offset(ORIGIN, 90.0, 0.0))),
            waypoints: Vec::new(),
        },
        &mut events,
    );
    world::apply(&mut world, Command::CompleteTarget, &mut events);
    world::apply(
        &mut world,
        Command::ReplacePath {
            target: None,
            waypoints: Vec::new(),
        },
        &mut events,
    );
    assert!(query::path(&world).is_visited(&TargetId::new("stop")));

    let decision = tick(&mut HumanRouter::default(), &mut world).await;

    assert_eq!(chosen(&decision), Some("stop"));
}

#[tokio::test]
async fn human_router_picks_overall_nearest_with_enough_balls() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("stop", 60.0)],
        creatures: CreatureSightings {
            wilds: vec![sighting("wild", 40.0)],
            in_radar: vec![sighting("radar", 25.0)],
        },
        chests: vec![chest("chest", 30.0)],
        inventory: balls(20),
    });

    let decision = tick(&mut HumanRouter::default(), &mut world).await;

    assert_eq!(chosen(&decision), Some("radar"));
}

#[tokio::test]
async fn human_router_keeps_path_while_target_is_unchanged() {
    let mut world = world_with(WorldSnapshot {
        chests: vec![chest("chest", 30.0)],
        inventory: balls(20),
        ..WorldSnapshot::default()
    });
    let mut router = HumanRouter::default();

    assert_eq!(chosen(&tick(&mut router, &mut world).await), Some("chest"));
    assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);

    world::apply(
        &mut world,
        Command::RefreshWorld {
            snapshot: WorldSnapshot {
                chests: vec![chest("chest", 30.0)],
                creatures: CreatureSightings {
                    wilds: vec![sighting("wild", 12.0)],
                    in_radar: Vec::new(),
                },
                inventory: balls(20),
                ..WorldSnapshot::default()
            },
        },
        &mut Vec::new(),
    );
    assert_eq!(chosen(&tick(&mut router, &mut world).await), Some("wild"));
}

/// Walks onto the planned target and drains the queue.
fn stand_on_target(world: &mut World, decision: &Decision) {
    let Decision::Rerouted(path) = decision else {
        panic!("expected a new path, got {decision:?}");
    };
    let destination = path.last().expect("path ends at the target").coords();
    world::apply(world, Command::MoveAvatar { position: destination }, &mut Vec::new());
    arrive(world);
}

#[tokio::test]
async fn human_router_holds_on_a_target_it_just_reached() {
    let mut world = world_with(WorldSnapshot {
        chests: vec![chest("chest", 30.0)],
        inventory: balls(20),
        ..WorldSnapshot::default()
    });
    let mut router = HumanRouter::default();

    let first = tick(&mut router, &mut world).await;
    assert_eq!(chosen(&first), Some("chest"));
    stand_on_target(&mut world, &first);

    for _ in 0..5 {
        assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);
    }
    assert!(query::path(&world).is_visited(&TargetId::new("chest")));
}

#[tokio::test]
async fn human_router_holds_on_a_restock_stop_it_just_reached() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("stop", 40.0)],
        inventory: balls(1),
        ..WorldSnapshot::default()
    });
    let mut router = HumanRouter::default();

    let first = tick(&mut router, &mut world).await;
    assert_eq!(chosen(&first), Some("stop"));
    stand_on_target(&mut world, &first);

    for _ in 0..5 {
        assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);
    }
}

#[tokio::test]
async fn creature_router_holds_on_a_creature_it_just_reached() {
    let mut world = world_with(WorldSnapshot {
        creatures: CreatureSightings {
            wilds: vec![sighting("wild", 30.0)],
            in_radar: Vec::new(),
        },
        ..WorldSnapshot::default()
    });
    let mut router = CreatureRouter;

    let first = tick(&mut router, &mut world).await;
    assert_eq!(chosen(&first), Some("wild"));
    stand_on_target(&mut world, &first);

    for _ in 0..5 {
        assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);
    }

    world::apply(
        &mut world,
        Command::RefreshWorld {
            snapshot: WorldSnapshot {
                creatures: CreatureSightings {
                    wilds: vec![sighting("wild", 30.0), sighting("other", 60.0)],
                    in_radar: Vec::new(),
                },
                ..WorldSnapshot::default()
            },
        },
        &mut Vec::new(),
    );
    assert_eq!(tick(&mut router, &mut world).await, Decision::Hold);
}

#[tokio::test]
async fn human_router_ties_keep_category_order() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![Building {
            coords: geo::offset(ORIGIN, 0.0, 25.0),
            ..stop("stop", 0.0)
        }],
        creatures: CreatureSightings {
            wilds: vec![sighting("wild", 25.0)],
            in_radar: Vec::new(),
        },
        inventory: balls(10),
        ..WorldSnapshot::default()
    });

    let decision = tick(&mut HumanRouter::new(5), &mut world).await;

    assert_eq!(chosen(&decision), Some("stop"));
}

#[tokio::test]
async fn creature_router_prefers_wild_then_radar_then_stops() {
    let snapshot = WorldSnapshot {
        buildings: vec![stop("stop", 5.0)],
        creatures: CreatureSightings {
            wilds: vec![sighting("wild", 70.0)],
            in_radar: vec![sighting("radar", 20.0)],
        },
        ..WorldSnapshot::default()
    };
    let mut world = world_with(snapshot.clone());
    assert_eq!(chosen(&tick(&mut CreatureRouter, &mut world).await), Some("wild"));

    let mut world = world_with(WorldSnapshot {
        creatures: CreatureSightings {
            wilds: Vec::new(),
            in_radar: snapshot.creatures.in_radar.clone(),
        },
        ..snapshot.clone()
    });
    assert_eq!(chosen(&tick(&mut CreatureRouter, &mut world).await), Some("radar"));

    let mut world = world_with(WorldSnapshot {
        creatures: CreatureSightings::default(),
        ..snapshot
    });
    assert_eq!(chosen(&tick(&mut CreatureRouter, &mut world).await), Some("stop"));
}

#[tokio::test]
async fn navigator_reports_new_paths_only() {
    let mut world = world_with(WorldSnapshot {
        buildings: vec![stop("near", 20.0)],
        ..WorldSnapshot::default()
    });
    let mut navigator = Navigator::new(Box::new(StopRouter), WaypointGenerator::new(Config::new(false)));
    let mut events = Vec::new();

    let path = navigator
        .check_path(&mut world, &mut events)
        .await
        .expect("tick succeeds")
        .expect("a path is installed");
    assert_eq!(path.len(), 1);
    assert!(matches!(
        events.as_slice(),
        [Event::PathReplaced { waypoints: 1, .. }]
    ));

    let unchanged = navigator
        .check_path(&mut world, &mut events)
        .await
        .expect("tick succeeds");
    assert!(unchanged.is_none());
    assert_eq!(navigator.active_name(), "stops");
}

#[tokio::test]
async fn set_router_replaces_active_strategy() {
    let mut navigator = Navigator::new(Box::new(StopRouter), WaypointGenerator::new(Config::new(false)));

    navigator.set_router(Box::new(StationaryRouter));

    assert_eq!(navigator.active_name(), "stand");
    assert_eq!(navigator.detour_depth(), 0);
}
