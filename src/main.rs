//! Alchemy Raid entry point
//!
//! The browser build is driven through `alchemy_raid::web`. Natively this
//! runs a headless autopilot so balance changes can be eyeballed from the
//! log: `alchemy-raid [character] [seed] [tuning.json]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let character = args.first().map(String::as_str).unwrap_or("knight");
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.get(2) {
        Some(path) => match load_tuning(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => alchemy_raid::Tuning::default(),
    };

    log::info!("Alchemy Raid (native) starting...");
    autopilot::run(character, seed, tuning);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<alchemy_raid::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(alchemy_raid::Tuning::from_json(&json)?)
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use std::cell::RefCell;
    use std::rc::Rc;

    use alchemy_raid::Game;
    use alchemy_raid::Tuning;
    use alchemy_raid::consts::*;
    use alchemy_raid::sim::GameEvent;

    /// Simulated time limit for one demo run (seconds)
    const TIME_LIMIT: f32 = 900.0;
    /// Pretend host frame rate
    const FRAME_DT: f32 = 1.0 / 60.0;

    pub fn run(character: &str, seed: u64, tuning: Tuning) {
        let mut game = Game::new(seed, tuning);
        let rewards = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&rewards);
        game.on_run_complete(move |r| *sink.borrow_mut() = Some(r.to_vec()));

        if !game.select_character(character) {
            log::error!("Unknown character `{}` (try alchemist, knight or ranger)", character);
            return;
        }
        game.set_firing(true);

        let mut kills = 0u32;
        while !game.phase().is_terminal() && game.state().clock < TIME_LIMIT {
            steer(&mut game);
            game.advance(FRAME_DT);
            for event in game.drain_events() {
                match event {
                    GameEvent::EnemyDefeated { .. } => kills += 1,
                    GameEvent::WaveStarted { round, wave } => {
                        log::info!("Round {} wave {} ({} kills so far)", round, wave, kills)
                    }
                    _ => log::debug!("{}", event.name()),
                }
            }
        }

        let state = game.state();
        println!(
            "{:?} after {:.1}s: score {}, {} kills, round {} wave {}",
            game.phase(),
            state.clock,
            state.score,
            kills,
            state.round(),
            state.wave()
        );
        match rewards.borrow().as_ref() {
            Some(r) => println!("Rewards ({}): {}", r.len(), r.join(", ")),
            None => println!("Run did not finish"),
        }
    }

    /// Chase the lowest living enemy and aim at it
    fn steer(game: &mut Game) {
        let player_x = game.state().player.x;
        let target = game
            .state()
            .enemies
            .enemies
            .iter()
            .filter(|e| e.is_alive() && e.pos.y > 0.0 && e.pos.y < PLAYER_COLLISION_Y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos);

        match target {
            Some(pos) => {
                game.move_left(pos.x < player_x - 8.0);
                game.move_right(pos.x > player_x + 8.0);
                game.set_aim_point(pos.x, pos.y);
            }
            None => {
                game.move_left(false);
                game.move_right(false);
                game.clear_aim_point();
            }
        }
        if game.state().player.special_ready() {
            game.trigger_special();
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the exported WebGame, this is just to satisfy the compiler
}
