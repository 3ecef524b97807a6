//! Headless demo driver
//!
//! Generates the map roster, runs a scripted player for a few seconds of
//! simulated time and prints ASCII snapshots. Mostly useful for eyeballing
//! map generation and enemy behavior; the real front end lives in a
//! platform crate that feeds `Game::update` from a window loop.

use glam::{IVec2, Vec2};

use tank_arena::audio::NullAudio;
use tank_arena::config::GameConfig;
use tank_arena::consts::SIM_DT;
use tank_arena::defs::Definitions;
use tank_arena::game::{Game, GameMode};
use tank_arena::input::InputState;
use tank_arena::sim::entity::EntityKind;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1);
    log::info!("Tank arena headless demo, seed {seed}");

    let config = match std::fs::read_to_string("config.json") {
        Ok(text) => GameConfig::from_json_str(&text).unwrap_or_default(),
        Err(_) => GameConfig::new(),
    };
    let mut game = Game::new(Definitions::builtin(), config, seed);
    let mut audio = NullAudio;

    let mut input = InputState::default();
    input.start_pressed = true;
    game.update(&input, &mut audio, SIM_DT);
    input.clear_one_shots();

    // Drive up-right toward the map interior, firing the whole time
    input.move_axis = Vec2::new(1.0, 1.0);
    input.aim_axis = Vec2::new(1.0, 0.0);
    input.shoot_held = true;

    let seconds = 10;
    for s in 0..seconds {
        for _ in 0..60 {
            game.update(&input, &mut audio, SIM_DT);
            if game.mode != GameMode::Playing {
                break;
            }
        }
        log::info!(
            "t={}s mode={:?} entities={} evil_agents={}",
            s + 1,
            game.mode,
            game.map.entities.len(),
            game.map.evil_agent_count()
        );
        if game.mode != GameMode::Playing {
            break;
        }
    }

    print_ascii(&game);
}

fn print_ascii(game: &Game) {
    let map = &game.map;
    let dims = map.dims();
    let mut rows = Vec::with_capacity(dims.y as usize);
    for y in 0..dims.y {
        let mut row = String::with_capacity(dims.x as usize);
        for x in 0..dims.x {
            let coords = IVec2::new(x, y);
            let def = map.tile_def(coords);
            let ch = if coords == map.exit_tile {
                'X'
            } else if def.is_solid {
                '#'
            } else if def.is_water {
                '~'
            } else {
                '.'
            };
            row.push(ch);
        }
        rows.push(row.into_bytes());
    }
    for id in map.iter_entity_ids() {
        let Some(e) = map.entities.get(id) else {
            continue;
        };
        if e.dead {
            continue;
        }
        let tile = map.tile_of_pos(e.pos);
        if !map.in_bounds(tile) {
            continue;
        }
        let ch = match e.kind {
            EntityKind::PlayerTank => b'P',
            EntityKind::Leo => b'L',
            EntityKind::Aries => b'A',
            EntityKind::Scorpio => b'S',
            EntityKind::Capricorn => b'C',
            EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile => b'*',
            EntityKind::Flame => b'+',
            EntityKind::Explosion => b'o',
        };
        rows[tile.y as usize][tile.x as usize] = ch;
    }
    println!("\n{} ({:?}):", map.def_name, game.mode);
    // World +Y is up; print top row last index first
    for row in rows.iter().rev() {
        println!("{}", String::from_utf8_lossy(row));
    }
}
