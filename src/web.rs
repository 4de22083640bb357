//! Browser bindings
//!
//! The host page owns rendering, input and the animation frame loop. It
//! pushes commands in, calls `advance` once per frame and reads the snapshot
//! and event queue back as JSON.

use wasm_bindgen::prelude::*;

use crate::game::Game;
use crate::tuning::Tuning;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Install the panic hook and console logger. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
}

#[wasm_bindgen]
impl WebGame {
    /// New run with default tuning. Without a seed the wall clock is used.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> WebGame {
        init_logging();
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        log::info!("Alchemy Raid (web) starting with seed {}", seed);
        WebGame {
            game: Game::new(seed, Tuning::default()),
        }
    }

    /// New run with balance data supplied as a JSON string
    #[wasm_bindgen(js_name = withTuning)]
    pub fn with_tuning(seed: f64, tuning_json: &str) -> Result<WebGame, JsValue> {
        init_logging();
        let tuning = Tuning::from_json(tuning_json).map_err(to_js_error)?;
        Ok(WebGame {
            game: Game::new(seed as u64, tuning),
        })
    }

    /// Register `callback(rewards: string[])`, called once when the run ends
    #[wasm_bindgen(js_name = onRunComplete)]
    pub fn on_run_complete(&mut self, callback: js_sys::Function) {
        self.game.on_run_complete(move |rewards| {
            let list: js_sys::Array = rewards.iter().map(|r| JsValue::from_str(r)).collect();
            if let Err(e) = callback.call1(&JsValue::NULL, &list) {
                log::error!("Run completion callback failed: {:?}", e);
            }
        });
    }

    /// Advance by one host frame (seconds)
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.game.advance(frame_dt)
    }

    #[wasm_bindgen(js_name = selectCharacter)]
    pub fn select_character(&mut self, name: &str) -> bool {
        self.game.select_character(name)
    }

    #[wasm_bindgen(js_name = moveLeft)]
    pub fn move_left(&mut self, held: bool) {
        self.game.move_left(held);
    }

    #[wasm_bindgen(js_name = moveRight)]
    pub fn move_right(&mut self, held: bool) {
        self.game.move_right(held);
    }

    #[wasm_bindgen(js_name = setAimPoint)]
    pub fn set_aim_point(&mut self, x: f32, y: f32) {
        self.game.set_aim_point(x, y);
    }

    #[wasm_bindgen(js_name = clearAimPoint)]
    pub fn clear_aim_point(&mut self) {
        self.game.clear_aim_point();
    }

    #[wasm_bindgen(js_name = setFiring)]
    pub fn set_firing(&mut self, firing: bool) {
        self.game.set_firing(firing);
    }

    #[wasm_bindgen(js_name = triggerSpecial)]
    pub fn trigger_special(&mut self) {
        self.game.trigger_special();
    }

    pub fn pause(&mut self) -> bool {
        self.game.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.game.resume()
    }

    /// Render view as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.game.snapshot().to_json().map_err(to_js_error)
    }

    /// Events since the last call as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.drain_events()).map_err(to_js_error)
    }
}
