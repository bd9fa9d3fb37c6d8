use std::{fs, path::Path};

use anyhow::{Context, Result};
use geowalk_core::WorldSnapshot;

/// Reads a world snapshot saved as JSON.
pub(crate) fn load_snapshot(path: &Path) -> Result<WorldSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read world snapshot at {}", path.display()))?;
    parse_snapshot(&contents).with_context(|| format!("invalid world snapshot {}", path.display()))
}

fn parse_snapshot(contents: &str) -> Result<WorldSnapshot> {
    let snapshot: WorldSnapshot = serde_json::from_str(contents)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geowalk_core::{BuildingKind, TargetId};

    #[test]
    fn parses_buildings_creatures_and_inventory() {
        let snapshot = parse_snapshot(
            r#"{
                "buildings": [
                    { "id": "b1", "coords": { "lat": 48.85, "lng": 2.35 }, "kind": "Stop" },
                    { "id": "b2", "coords": { "lat": 48.86, "lng": 2.35 }, "kind": "Dungeon", "available": false }
                ],
                "creatures": { "wilds": [ { "id": "c1", "coords": { "lat": 48.851, "lng": 2.351 } } ] },
                "inventory": [ { "kind": "BallNormal", "count": 7 } ]
            }"#,
        )
        .expect("snapshot parses");

        assert_eq!(snapshot.buildings.len(), 2);
        assert_eq!(snapshot.buildings[0].id, TargetId::new("b1"));
        assert!(snapshot.buildings[0].available);
        assert_eq!(snapshot.buildings[1].kind, BuildingKind::Dungeon);
        assert!(!snapshot.buildings[1].available);
        assert_eq!(snapshot.creatures.wilds.len(), 1);
        assert!(snapshot.chests.is_empty());
        assert_eq!(snapshot.ball_count(), 7);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let outcome = parse_snapshot(r#"{ "chests": [ { "id": "x", "coords": { "lat": 95.0, "lng": 0.0 } } ] }"#);
        assert!(outcome.is_err());
    }
}
