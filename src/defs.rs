//! Tile and map definition registries
//!
//! Definitions are attribute-bag records keyed by name, loaded once at
//! startup (JSON) or taken from the built-in set. Lookup by name is fatal on
//! a miss: definitions are validated at authoring time, so an unknown name
//! is a data error, not a runtime condition.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Visual/physical properties of one tile type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDef {
    pub name: String,
    #[serde(default)]
    pub is_solid: bool,
    #[serde(default)]
    pub is_water: bool,
    /// RGBA tint used by geometry emission
    #[serde(default = "default_tint")]
    pub tint: [f32; 4],
}

fn default_tint() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

/// One random-walk carving pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WormSpec {
    /// Tile type stamped by the worm
    pub tile: String,
    /// Number of independent worms
    pub count: u32,
    /// Steps per worm
    pub length: u32,
}

/// Composition of one generated map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub name: String,
    pub dims: IVec2,
    pub fill_tile: String,
    pub edge_tile: String,
    pub worm1: WormSpec,
    pub worm2: WormSpec,
    pub start_floor_tile: String,
    pub start_bunker_tile: String,
    pub end_floor_tile: String,
    pub end_bunker_tile: String,
    pub entry_tile: String,
    pub exit_tile: String,
    /// Enemy roster spawned after generation
    #[serde(default)]
    pub leo_count: u32,
    #[serde(default)]
    pub aries_count: u32,
    #[serde(default)]
    pub scorpio_count: u32,
    #[serde(default)]
    pub capricorn_count: u32,
}

/// Immutable registries shared by every map
#[derive(Debug, Clone)]
pub struct Definitions {
    tiles: Vec<TileDef>,
    maps: Vec<MapDef>,
}

impl Definitions {
    pub fn new(tiles: Vec<TileDef>, maps: Vec<MapDef>) -> Self {
        Self { tiles, maps }
    }

    /// Built-in definition set, used when no external data is supplied
    pub fn builtin() -> Self {
        let tiles = vec![
            TileDef {
                name: "Grass".into(),
                is_solid: false,
                is_water: false,
                tint: [0.25, 0.55, 0.2, 1.0],
            },
            TileDef {
                name: "DarkGrass".into(),
                is_solid: false,
                is_water: false,
                tint: [0.15, 0.4, 0.12, 1.0],
            },
            TileDef {
                name: "RockWall".into(),
                is_solid: true,
                is_water: false,
                tint: [0.45, 0.42, 0.4, 1.0],
            },
            TileDef {
                name: "StoneWall".into(),
                is_solid: true,
                is_water: false,
                tint: [0.55, 0.55, 0.58, 1.0],
            },
            TileDef {
                name: "Concrete".into(),
                is_solid: false,
                is_water: false,
                tint: [0.7, 0.7, 0.68, 1.0],
            },
            TileDef {
                name: "Water".into(),
                is_solid: false,
                is_water: true,
                tint: [0.15, 0.3, 0.7, 1.0],
            },
            TileDef {
                name: "MapEntry".into(),
                is_solid: false,
                is_water: false,
                tint: [0.9, 0.9, 0.3, 1.0],
            },
            TileDef {
                name: "MapExit".into(),
                is_solid: false,
                is_water: false,
                tint: [0.3, 0.9, 0.9, 1.0],
            },
        ];

        let maps = vec![
            MapDef {
                name: "Arena1".into(),
                dims: IVec2::new(48, 24),
                fill_tile: "Grass".into(),
                edge_tile: "RockWall".into(),
                worm1: WormSpec {
                    tile: "DarkGrass".into(),
                    count: 15,
                    length: 12,
                },
                worm2: WormSpec {
                    tile: "RockWall".into(),
                    count: 60,
                    length: 8,
                },
                start_floor_tile: "Concrete".into(),
                start_bunker_tile: "StoneWall".into(),
                end_floor_tile: "Concrete".into(),
                end_bunker_tile: "StoneWall".into(),
                entry_tile: "MapEntry".into(),
                exit_tile: "MapExit".into(),
                leo_count: 4,
                aries_count: 2,
                scorpio_count: 2,
                capricorn_count: 0,
            },
            MapDef {
                name: "Arena2".into(),
                dims: IVec2::new(48, 24),
                fill_tile: "Grass".into(),
                edge_tile: "RockWall".into(),
                worm1: WormSpec {
                    tile: "Water".into(),
                    count: 20,
                    length: 10,
                },
                worm2: WormSpec {
                    tile: "RockWall".into(),
                    count: 50,
                    length: 8,
                },
                start_floor_tile: "Concrete".into(),
                start_bunker_tile: "StoneWall".into(),
                end_floor_tile: "Concrete".into(),
                end_bunker_tile: "StoneWall".into(),
                entry_tile: "MapEntry".into(),
                exit_tile: "MapExit".into(),
                leo_count: 3,
                aries_count: 3,
                scorpio_count: 2,
                capricorn_count: 2,
            },
        ];

        Self { tiles, maps }
    }

    /// Load both registries from JSON documents (arrays of records)
    pub fn from_json(tiles_json: &str, maps_json: &str) -> Option<Self> {
        let tiles: Vec<TileDef> = match serde_json::from_str(tiles_json) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to parse tile definitions: {e}");
                return None;
            }
        };
        let maps: Vec<MapDef> = match serde_json::from_str(maps_json) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Failed to parse map definitions: {e}");
                return None;
            }
        };
        Some(Self { tiles, maps })
    }

    /// Registry index of a tile type. Fatal on unknown name.
    pub fn tile_index(&self, name: &str) -> usize {
        match self.tiles.iter().position(|t| t.name == name) {
            Some(i) => i,
            None => {
                log::error!("Unknown tile definition '{name}'");
                panic!("unknown tile definition '{name}'");
            }
        }
    }

    pub fn tile(&self, index: usize) -> &TileDef {
        &self.tiles[index]
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Map definition by name. Fatal on unknown name.
    pub fn map(&self, name: &str) -> &MapDef {
        match self.maps.iter().find(|m| m.name == name) {
            Some(m) => m,
            None => {
                log::error!("Unknown map definition '{name}'");
                panic!("unknown map definition '{name}'");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tiles_resolve() {
        let defs = Definitions::builtin();
        let rock = defs.tile(defs.tile_index("RockWall"));
        assert!(rock.is_solid);
        assert!(!rock.is_water);
        let water = defs.tile(defs.tile_index("Water"));
        assert!(water.is_water);
        assert!(!water.is_solid);
    }

    #[test]
    #[should_panic(expected = "unknown tile definition")]
    fn test_unknown_tile_is_fatal() {
        let defs = Definitions::builtin();
        defs.tile_index("Lava");
    }

    #[test]
    #[should_panic(expected = "unknown map definition")]
    fn test_unknown_map_is_fatal() {
        let defs = Definitions::builtin();
        defs.map("NoSuchArena");
    }

    #[test]
    fn test_json_round_trip() {
        let tiles = r#"[{"name": "Sand", "is_solid": false, "tint": [0.9, 0.8, 0.5, 1.0]}]"#;
        let maps = r#"[{
            "name": "Tiny", "dims": [10, 10],
            "fill_tile": "Sand", "edge_tile": "Sand",
            "worm1": {"tile": "Sand", "count": 0, "length": 0},
            "worm2": {"tile": "Sand", "count": 0, "length": 0},
            "start_floor_tile": "Sand", "start_bunker_tile": "Sand",
            "end_floor_tile": "Sand", "end_bunker_tile": "Sand",
            "entry_tile": "Sand", "exit_tile": "Sand"
        }]"#;
        let defs = Definitions::from_json(tiles, maps).unwrap();
        assert_eq!(defs.map("Tiny").dims, IVec2::new(10, 10));
        assert_eq!(defs.map("Tiny").leo_count, 0);
    }
}
