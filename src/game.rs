//! Top-level game state machine
//!
//! Owns the map roster, the mode machine, time distortion and the cheat
//! toggles. The simulation itself always advances in fixed steps; wall-clock
//! time feeds an accumulator after distortion scaling.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, Sound};
use crate::config::GameConfig;
use crate::consts::{
    FAST_MO_SCALE, MAX_FRAME_DT, SIM_DT, SLOW_AND_FAST_SCALE, SLOW_MO_SCALE,
};
use crate::defs::Definitions;
use crate::input::InputState;
use crate::sim::heatmap::TileHeatMap;
use crate::sim::map::Map;
use crate::sim::{Cheats, SimContext, entity::EntityKind, entity::Faction, factory, mapgen};

/// Seconds of game-over screen before respawn is accepted
const GAME_OVER_DELAY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Waiting for the start control
    Attract,
    Playing,
    GameOver,
    Victory,
}

pub struct Game {
    pub config: GameConfig,
    defs: Definitions,
    rng: Pcg32,
    seed: u64,

    pub mode: GameMode,
    mode_timer: f32,
    pub paused: bool,
    accumulator: f32,

    roster: Vec<String>,
    map_index: usize,
    pub map: Map,

    pub cheats: Cheats,
    /// Index into the evil agent list whose distance field is overlaid
    heat_debug: Option<usize>,
}

impl Game {
    pub fn new(defs: Definitions, config: GameConfig, seed: u64) -> Self {
        let roster = config.get_string_list("maps", &["Arena1", "Arena2"]);
        assert!(!roster.is_empty(), "map roster must not be empty");
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut map = mapgen::generate_map(&roster[0], &defs, &config, &mut rng);
        Self::spawn_player(&mut map, &config);
        log::info!("New game, seed {seed}, roster {roster:?}");
        Self {
            config,
            defs,
            rng,
            seed,
            mode: GameMode::Attract,
            mode_timer: 0.0,
            paused: false,
            accumulator: 0.0,
            roster,
            map_index: 0,
            map,
            cheats: Cheats::default(),
            heat_debug: None,
        }
    }

    fn spawn_player(map: &mut Map, config: &GameConfig) {
        let spawn = Vec2::new(
            config.get_f32("player_spawn_x", 1.5),
            config.get_f32("player_spawn_y", 1.5),
        );
        let orient = config.get_f32("player_spawn_orient", 30.0);
        let player =
            factory::create_entity(EntityKind::PlayerTank, Faction::Good, spawn, orient, map.dims(), config);
        map.spawn_now(player);
    }

    /// Advance by one wall-clock frame
    pub fn update(&mut self, input: &InputState, audio: &mut dyn AudioSink, real_dt: f32) {
        let dt = real_dt.clamp(0.0, MAX_FRAME_DT);

        if input.hard_reset_pressed {
            let defs = self.defs.clone();
            let config = self.config.clone();
            *self = Game::new(defs, config, self.seed.wrapping_add(1));
            return;
        }
        self.apply_cheat_toggles(input);

        match self.mode {
            GameMode::Attract => {
                if input.start_pressed {
                    self.mode = GameMode::Playing;
                    audio.play(Sound::Click);
                }
            }
            GameMode::Playing => self.update_playing(input, audio, dt),
            GameMode::GameOver => {
                self.mode_timer += dt;
                if input.respawn_pressed && self.mode_timer >= GAME_OVER_DELAY {
                    self.respawn_player();
                    audio.play(Sound::Click);
                } else if input.start_pressed && self.mode_timer >= GAME_OVER_DELAY {
                    let defs = self.defs.clone();
                    let config = self.config.clone();
                    *self = Game::new(defs, config, self.seed.wrapping_add(1));
                }
            }
            GameMode::Victory => {
                self.mode_timer += dt;
                if input.start_pressed {
                    let defs = self.defs.clone();
                    let config = self.config.clone();
                    *self = Game::new(defs, config, self.seed.wrapping_add(1));
                }
            }
        }
    }

    fn update_playing(&mut self, input: &InputState, audio: &mut dyn AudioSink, dt: f32) {
        if input.pause_pressed {
            self.paused = !self.paused;
            audio.play(Sound::Pause);
        }
        if input.next_map_pressed {
            self.advance_map(audio);
            return;
        }

        if self.paused {
            self.accumulator = 0.0;
            if input.step_once_pressed {
                self.step_map(input, audio, SIM_DT);
            }
        } else {
            self.accumulator += dt * self.time_scale(input);
            while self.accumulator >= SIM_DT {
                self.accumulator -= SIM_DT;
                self.step_map(input, audio, SIM_DT);
                if self.mode != GameMode::Playing {
                    self.accumulator = 0.0;
                    break;
                }
            }
        }
    }

    fn time_scale(&self, input: &InputState) -> f32 {
        match (input.slow_mo_held, input.fast_mo_held) {
            (true, true) => SLOW_AND_FAST_SCALE,
            (true, false) => SLOW_MO_SCALE,
            (false, true) => FAST_MO_SCALE,
            (false, false) => 1.0,
        }
    }

    fn step_map(&mut self, input: &InputState, audio: &mut dyn AudioSink, dt: f32) {
        let mut ctx = SimContext {
            config: &self.config,
            audio,
            input,
            rng: &mut self.rng,
            cheats: self.cheats,
        };
        self.map.update(&mut ctx, dt);

        if self.map.player_reached_exit {
            self.advance_map(audio);
            return;
        }
        let player_dead = self
            .map
            .player
            .and_then(|id| self.map.entities.get(id))
            .map(|p| p.dead)
            .unwrap_or(true);
        if player_dead {
            self.mode = GameMode::GameOver;
            self.mode_timer = 0.0;
            audio.play(Sound::GameOver);
        }
    }

    /// Move to the next roster entry, carrying the player entity across, or
    /// declare victory after the last map.
    fn advance_map(&mut self, audio: &mut dyn AudioSink) {
        if self.map_index + 1 >= self.roster.len() {
            self.mode = GameMode::Victory;
            self.mode_timer = 0.0;
            audio.play(Sound::Victory);
            return;
        }
        self.map_index += 1;
        let name = self.roster[self.map_index].clone();
        let mut next = mapgen::generate_map(&name, &self.defs, &self.config, &mut self.rng);
        let carried = self.map.player.and_then(|id| self.map.extract_entity(id));
        match carried {
            Some(mut player) => {
                player.pos = Vec2::new(
                    self.config.get_f32("player_spawn_x", 1.5),
                    self.config.get_f32("player_spawn_y", 1.5),
                );
                player.vel = Vec2::ZERO;
                next.spawn_now(player);
            }
            None => Self::spawn_player(&mut next, &self.config),
        }
        self.map = next;
        self.heat_debug = None;
        log::info!("Advanced to map '{name}' ({}/{})", self.map_index + 1, self.roster.len());
    }

    fn respawn_player(&mut self) {
        if let Some(player) = self.map.player.and_then(|id| self.map.entities.get_mut(id)) {
            player.revive();
            player.pos = Vec2::new(
                self.config.get_f32("player_spawn_x", 1.5),
                self.config.get_f32("player_spawn_y", 1.5),
            );
            player.vel = Vec2::ZERO;
        }
        self.mode = GameMode::Playing;
        self.mode_timer = 0.0;
    }

    fn apply_cheat_toggles(&mut self, input: &InputState) {
        if input.toggle_debug_draw {
            self.cheats.debug_draw = !self.cheats.debug_draw;
        }
        if input.toggle_invincible {
            self.cheats.invincible = !self.cheats.invincible;
            log::info!("Invincibility {}", if self.cheats.invincible { "on" } else { "off" });
        }
        if input.toggle_no_clip {
            self.cheats.no_clip = !self.cheats.no_clip;
            log::info!("No-clip {}", if self.cheats.no_clip { "on" } else { "off" });
        }
        if input.toggle_map_view {
            self.cheats.whole_map_view = !self.cheats.whole_map_view;
        }
        if input.cycle_heat_debug {
            self.cycle_heat_debug();
        }
    }

    /// Off -> agent 0 -> agent 1 -> ... -> off
    fn cycle_heat_debug(&mut self) {
        let count = self.map.evil_agents.len();
        self.heat_debug = match self.heat_debug {
            None if count > 0 => Some(0),
            Some(i) if i + 1 < count => Some(i + 1),
            _ => None,
        };
    }

    /// Distance field of the currently selected debug agent, if any
    pub fn debug_heat(&self) -> Option<&TileHeatMap> {
        let index = self.heat_debug?;
        let id = *self.map.evil_agents.get(index)?;
        match &self.map.entities.get(id)?.payload {
            crate::sim::entity::Payload::Chase(c) => Some(&c.heat),
            _ => None,
        }
    }
}
