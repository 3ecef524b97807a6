//! Simulation core: grid, pathfinding, visibility, entities, physics

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod factory;
pub mod heatmap;
pub mod map;
pub mod mapgen;
pub mod projectile;
pub mod raycast;

pub use collision::Aabb2;
pub use entity::{Entity, EntityArena, EntityId, EntityKind, Faction};
pub use heatmap::{TileHeatMap, path_to_seed, populate_distance_field};
pub use map::Map;
pub use mapgen::generate_map;
pub use raycast::{RaycastResult, sample_raycast, voxel_raycast};

use rand_pcg::Pcg32;

use crate::GameConfig;
use crate::audio::AudioSink;
use crate::input::InputState;

/// Debug cheat toggles, read by the pipeline and behaviors
#[derive(Debug, Clone, Copy, Default)]
pub struct Cheats {
    pub debug_draw: bool,
    pub invincible: bool,
    pub no_clip: bool,
    pub whole_map_view: bool,
}

/// Services threaded through one simulation step; replaces process-wide
/// singletons with an explicitly scoped context.
pub struct SimContext<'a> {
    pub config: &'a GameConfig,
    pub audio: &'a mut dyn AudioSink,
    pub input: &'a InputState,
    pub rng: &'a mut Pcg32,
    pub cheats: Cheats,
}
