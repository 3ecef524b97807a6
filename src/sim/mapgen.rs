//! Procedural map generation
//!
//! Constrained random carving with validate/retry: worms carve terrain, the
//! start/end bunkers and border are stamped over them, and the whole attempt
//! is thrown away if the exit is unreachable from the entry. A final repair
//! pass walls off any isolated pocket so every non-solid tile ends reachable.

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{EntityKind, Faction};
use super::factory::create_entity;
use super::heatmap::{TileHeatMap, populate_distance_field};
use super::map::Map;
use crate::GameConfig;
use crate::consts::{MAP_GEN_MAX_ATTEMPTS, UNREACHABLE, WANDER_PICK_MAX_ATTEMPTS};
use crate::defs::{Definitions, MapDef, WormSpec};

const WORM_STEPS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Generate a map from its definition. Retries the whole carve+stamp
/// sequence until the exit validates; exhausting the attempt budget is a
/// data error and fatal.
pub fn generate_map(
    def_name: &str,
    defs: &Definitions,
    config: &GameConfig,
    rng: &mut Pcg32,
) -> Map {
    let def = defs.map(def_name).clone();
    for attempt in 1..=MAP_GEN_MAX_ATTEMPTS {
        let mut map = Map::new_blank(def_name, def.dims, &def.fill_tile, defs.clone());
        carve_and_stamp(&mut map, &def, config, rng);
        if validate(&map) {
            log::info!("Map '{def_name}' generated on attempt {attempt}");
            repair_unreachable_tiles(&mut map, &def);
            spawn_roster(&mut map, &def, config, rng);
            map.rebuild_solid_maps();
            return map;
        }
    }
    log::error!("Map '{def_name}' failed to validate in {MAP_GEN_MAX_ATTEMPTS} attempts");
    panic!("map generation retry budget exhausted for '{def_name}'");
}

fn carve_and_stamp(map: &mut Map, def: &MapDef, config: &GameConfig, rng: &mut Pcg32) {
    run_worms(map, &def.worm1, rng);
    run_worms(map, &def.worm2, rng);
    stamp_start_area(map, def, config);
    stamp_end_area(map, def, config);
    stamp_border(map, def);
}

/// Random-walk carving. Each worm stamps its tile type, then steps to a
/// uniformly random 4-neighbor; steps that would leave the interior are
/// rejected and the worm stays put for that step.
fn run_worms(map: &mut Map, worm: &WormSpec, rng: &mut Pcg32) {
    let dims = map.dims();
    let tile = map.defs.tile_index(&worm.tile);
    for _ in 0..worm.count {
        let mut current = IVec2::new(
            rng.random_range(1..dims.x - 1),
            rng.random_range(1..dims.y - 1),
        );
        for _ in 0..worm.length {
            map.set_tile(current, tile);
            let step = WORM_STEPS[rng.random_range(0..4)];
            let candidate = current + step;
            if candidate.x >= 1
                && candidate.y >= 1
                && candidate.x <= dims.x - 2
                && candidate.y <= dims.y - 2
            {
                current = candidate;
            }
        }
    }
}

/// Start floor/bunker rectangle at the origin corner; the entry tile sits
/// at (1,1) and the bunker leaves gaps at its two far corners.
fn stamp_start_area(map: &mut Map, def: &MapDef, config: &GameConfig) {
    let size = config.get_i32("start_area_size", 5);
    let floor = map.defs.tile_index(&def.start_floor_tile);
    let bunker = map.defs.tile_index(&def.start_bunker_tile);
    for y in 1..size {
        for x in 1..size {
            map.set_tile(IVec2::new(x, y), floor);
        }
    }
    // L-shaped bunker wall with gaps at (size, 1) and (1, size)
    for i in 2..=size {
        map.set_tile(IVec2::new(size, i), bunker);
        map.set_tile(IVec2::new(i, size), bunker);
    }
    map.set_tile_by_name(map.entry_tile, &def.entry_tile);
}

/// Mirrored end area at the far corner; the exit tile sits at dims-(2,2)
fn stamp_end_area(map: &mut Map, def: &MapDef, config: &GameConfig) {
    let size = config.get_i32("end_area_size", 6);
    let dims = map.dims();
    let far = dims - IVec2::ONE;
    let floor = map.defs.tile_index(&def.end_floor_tile);
    let bunker = map.defs.tile_index(&def.end_bunker_tile);
    for y in (far.y - size + 1)..far.y {
        for x in (far.x - size + 1)..far.x {
            map.set_tile(IVec2::new(x, y), floor);
        }
    }
    // Mirrored L-wall, gaps nearest the map interior
    for i in 2..=size {
        map.set_tile(IVec2::new(far.x - size, far.y - i), bunker);
        map.set_tile(IVec2::new(far.x - i, far.y - size), bunker);
    }
    map.set_tile_by_name(map.exit_tile, &def.exit_tile);
}

/// Solid perimeter, stamped last so borders always win over carving
fn stamp_border(map: &mut Map, def: &MapDef) {
    let dims = map.dims();
    let edge = map.defs.tile_index(&def.edge_tile);
    for x in 0..dims.x {
        map.set_tile(IVec2::new(x, 0), edge);
        map.set_tile(IVec2::new(x, dims.y - 1), edge);
    }
    for y in 0..dims.y {
        map.set_tile(IVec2::new(0, y), edge);
        map.set_tile(IVec2::new(dims.x - 1, y), edge);
    }
}

/// A map is valid iff the exit tile's distance from the entry tile is not
/// the unreachable sentinel (water counts as solid: the player must walk it)
fn validate(map: &Map) -> bool {
    let solid = map.static_solid_snapshot(true);
    let mut heat = TileHeatMap::new(map.dims(), UNREACHABLE);
    populate_distance_field(&mut heat, map.entry_tile, &solid);
    heat.value(map.exit_tile) < UNREACHABLE
}

/// Universal-reachability repair: validation only checks the exit tile, so
/// isolated pockets can survive it. Recompute the field over the solid-flag
/// classification only (water passable) and wall off every tile that is
/// neither solid nor reachable.
fn repair_unreachable_tiles(map: &mut Map, def: &MapDef) {
    let solid = map.static_solid_snapshot(false);
    let mut heat = TileHeatMap::new(map.dims(), UNREACHABLE);
    populate_distance_field(&mut heat, map.entry_tile, &solid);
    let edge = map.defs.tile_index(&def.edge_tile);
    let dims = map.dims();
    let mut repaired = 0u32;
    for y in 0..dims.y {
        for x in 0..dims.x {
            let coords = IVec2::new(x, y);
            if heat.value(coords) >= UNREACHABLE && !map.tile_def(coords).is_solid {
                map.set_tile(coords, edge);
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        log::info!("Repaired {repaired} unreachable tiles on '{}'", map.def_name);
    }
}

/// Place the definition's enemy roster at random non-solid tiles outside
/// the start area. Placement uses bounded rejection sampling; a roster slot
/// that cannot find a tile is skipped with a warning.
fn spawn_roster(map: &mut Map, def: &MapDef, config: &GameConfig, rng: &mut Pcg32) {
    let roster = [
        (EntityKind::Leo, def.leo_count),
        (EntityKind::Aries, def.aries_count),
        (EntityKind::Scorpio, def.scorpio_count),
        (EntityKind::Capricorn, def.capricorn_count),
    ];
    let start_size = config.get_i32("start_area_size", 5);
    for (kind, count) in roster {
        for _ in 0..count {
            match pick_spawn_tile(map, start_size, rng) {
                Some(tile) => {
                    let pos = map.tile_center(tile);
                    let orient = rng.random_range(0.0..360.0);
                    let entity =
                        create_entity(kind, Faction::Evil, pos, orient, map.dims(), config);
                    map.spawn_now(entity);
                }
                None => {
                    log::warn!("No free spawn tile for {kind:?} on '{}'", map.def_name);
                }
            }
        }
    }
}

fn pick_spawn_tile(map: &Map, start_size: i32, rng: &mut Pcg32) -> Option<IVec2> {
    let dims = map.dims();
    for _ in 0..(WANDER_PICK_MAX_ATTEMPTS * 2) {
        let tile = IVec2::new(
            rng.random_range(1..dims.x - 1),
            rng.random_range(1..dims.y - 1),
        );
        if map.is_tile_solid(tile, true) {
            continue;
        }
        // Keep spawns out of the player's start bunker
        if tile.x <= start_size && tile.y <= start_size {
            continue;
        }
        return Some(tile);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generated(seed: u64) -> Map {
        let defs = Definitions::builtin();
        let config = GameConfig::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        generate_map("Arena1", &defs, &config, &mut rng)
    }

    #[test]
    fn test_border_is_solid() {
        let map = generated(1);
        let dims = map.dims();
        for x in 0..dims.x {
            assert!(map.is_tile_solid(IVec2::new(x, 0), false));
            assert!(map.is_tile_solid(IVec2::new(x, dims.y - 1), false));
        }
        for y in 0..dims.y {
            assert!(map.is_tile_solid(IVec2::new(0, y), false));
            assert!(map.is_tile_solid(IVec2::new(dims.x - 1, y), false));
        }
    }

    #[test]
    fn test_entry_and_exit_open() {
        let map = generated(2);
        assert!(!map.is_tile_solid(map.entry_tile, true));
        assert!(!map.is_tile_solid(map.exit_tile, true));
    }

    #[test]
    fn test_every_nonsolid_tile_reachable() {
        // Post-repair invariant, checked by independent flood fill
        for seed in [3u64, 4, 5, 6, 7] {
            let map = generated(seed);
            let solid = map.static_solid_snapshot(false);
            let mut heat = TileHeatMap::new(map.dims(), UNREACHABLE);
            populate_distance_field(&mut heat, map.entry_tile, &solid);
            let dims = map.dims();
            for y in 0..dims.y {
                for x in 0..dims.x {
                    let coords = IVec2::new(x, y);
                    if !map.tile_def(coords).is_solid {
                        assert!(
                            heat.value(coords) < UNREACHABLE,
                            "seed {seed}: non-solid tile {coords:?} unreachable"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_roster_spawned() {
        let map = generated(8);
        let defs = Definitions::builtin();
        let def = defs.map("Arena1");
        let expected = (def.leo_count + def.aries_count + def.scorpio_count) as usize;
        assert_eq!(map.evil_agents.len(), expected);
    }

    #[test]
    fn test_corridor_map_validates_first_attempt() {
        // A 10x10 definition with no carving: a fully open interior must
        // validate immediately, and the greedy path from entry to exit has
        // Manhattan-distance length.
        let tiles_defs = Definitions::builtin();
        let open_def = MapDef {
            name: "Open".into(),
            dims: IVec2::new(10, 10),
            fill_tile: "Grass".into(),
            edge_tile: "RockWall".into(),
            worm1: WormSpec {
                tile: "Grass".into(),
                count: 0,
                length: 0,
            },
            worm2: WormSpec {
                tile: "Grass".into(),
                count: 0,
                length: 0,
            },
            start_floor_tile: "Concrete".into(),
            start_bunker_tile: "Concrete".into(),
            end_floor_tile: "Concrete".into(),
            end_bunker_tile: "Concrete".into(),
            entry_tile: "MapEntry".into(),
            exit_tile: "MapExit".into(),
            leo_count: 0,
            aries_count: 0,
            scorpio_count: 0,
            capricorn_count: 0,
        };
        let defs = Definitions::new(
            (0..tiles_defs.tile_count())
                .map(|i| tiles_defs.tile(i).clone())
                .collect(),
            vec![open_def],
        );
        let config = GameConfig::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let map = generate_map("Open", &defs, &config, &mut rng);

        let solid = map.static_solid_snapshot(true);
        let mut heat = TileHeatMap::new(map.dims(), UNREACHABLE);
        populate_distance_field(&mut heat, map.exit_tile, &solid);
        let path = super::super::heatmap::path_to_seed(map.entry_tile, &heat);
        let manhattan = (map.exit_tile - map.entry_tile).abs();
        assert_eq!(path.len() as i32, manhattan.x + manhattan.y);
        assert_eq!(path[0], map.exit_tile);
    }
}
