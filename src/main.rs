//! Orb Escape entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{KeyboardEvent, Request, RequestInit, RequestMode, Response};

    use orb_escape::feed::{FeedRequest, FeedResponse, Narrator, OfflineNarrator, parse_response};
    use orb_escape::platform::{Action, FixedStep, InputState, now_ms};
    use orb_escape::sim::{EventLog, Game};
    use orb_escape::{DifficultyTable, GameConfig, Settings, TransportError};

    // Drawing, audio and the narrative panel live in the page
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            const hooks = window.orbEscape;
            if (hooks && hooks.present) hooks.present(JSON.parse(json));
        }

        export function play_effect(json, volume) {
            const hooks = window.orbEscape;
            if (hooks && hooks.play) hooks.play(JSON.parse(json), volume);
        }

        export function show_narrative(text) {
            const hooks = window.orbEscape;
            if (hooks && hooks.narrate) hooks.narrate(text);
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
        fn play_effect(json: &str, volume: f32);
        fn show_narrative(text: &str);
    }

    /// Game instance holding all browser-side state
    struct WebGame {
        game: Game<EventLog>,
        input: InputState,
        step: FixedStep,
        settings: Settings,
        offline: OfflineNarrator,
        /// Cleared on window blur, set again on focus
        focused: bool,
    }

    impl WebGame {
        /// Run the simulation steps due for this frame
        fn update(&mut self, time: f64) {
            let steps = self.step.frame(time);
            for _ in 0..steps {
                let input = self.input.tick_input(now_ms());
                self.game.tick(&input, self.step.step_ms());
                // Clear one-shot inputs after processing
                self.input.clear_edges();
            }
        }

        /// Hand recorded events and narrative lines to the page
        fn flush_effects(&mut self) {
            let (events, narratives) = self.game.sink_mut().drain();
            let volume = self.settings.effective_volume(self.focused);
            for event in events {
                if let Ok(json) = serde_json::to_string(&event) {
                    play_effect(&json, volume);
                }
            }
            for text in narratives {
                log::info!("[OVERSEER] {}", text);
                show_narrative(&text);
            }
        }

        fn render(&self) {
            match self.game.snapshot().to_json() {
                Ok(json) => present_frame(&json),
                Err(e) => log::warn!("Snapshot error: {}", e),
            }
        }

        fn auto_pause(&mut self, reason: &str) {
            self.input.release_all();
            // Effects go silent until focus returns when `mute_on_blur` is set
            self.focused = false;
            if !self.game.is_paused() && !self.game.phase().is_terminal() {
                self.input.press(Action::Pause);
                log::info!("Auto-paused ({})", reason);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Orb Escape starting...");

        let settings = Settings::load();
        // Write back so the page sees every field, defaults included
        settings.save();
        let table = DifficultyTable::builtin();
        let seed = js_sys::Date::now() as u64;
        let config = match GameConfig::from_settings(&table, &settings, seed) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };

        let mut game = Game::new(config, EventLog::new());
        game.start();

        let game = Rc::new(RefCell::new(WebGame {
            game,
            input: InputState::new(),
            step: FixedStep::default(),
            offline: OfflineNarrator::new(seed),
            settings,
            focused: true,
        }));

        log::info!("Game initialized with seed: {}", seed);

        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            if let Some(loading) = document.get_element_by_id("loading") {
                let _ = loading.set_attribute("class", "hidden");
            }
        }

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Orb Escape running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_up(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus returns: effects audible again, the game stays paused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().focused = true;
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<WebGame>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            // A stopped game schedules no further frames
            if !g.game.is_running() {
                return;
            }
            g.update(time);
            g.flush_effects();
            g.render();
        }

        pump_feed(&game);
        request_animation_frame(game);
    }

    /// Send pending narrative requests; results come back through `deliver`
    fn pump_feed(game: &Rc<RefCell<WebGame>>) {
        let (requests, enabled, offline, endpoint) = {
            let mut g = game.borrow_mut();
            let requests = g.game.feed_mut().take_requests();
            (
                requests,
                g.settings.narrative_feed,
                g.settings.offline_feed(),
                g.settings.feed_endpoint.clone(),
            )
        };
        if !enabled {
            return;
        }

        for request in requests {
            if offline {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                let result = g.offline.respond(&request);
                g.game.feed_mut().deliver(request.ticket, result);
                continue;
            }

            let game = game.clone();
            let endpoint = endpoint.clone();
            spawn_local(async move {
                let result = fetch_narrative(&endpoint, &request).await;
                game.borrow_mut()
                    .game
                    .feed_mut()
                    .deliver(request.ticket, result);
            });
        }
    }

    async fn fetch_narrative(
        endpoint: &str,
        request: &FeedRequest,
    ) -> Result<FeedResponse, TransportError> {
        let window = web_sys::window().ok_or_else(|| TransportError::Network("no window".into()))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::SameOrigin);
        init.set_body(&JsValue::from_str(&request.body_json()));

        let req = Request::new_with_str_and_init(endpoint, &init).map_err(network_error)?;
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(network_error)?;

        let value = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(network_error)?;
        let response: Response = value.dyn_into().map_err(network_error)?;
        if !response.ok() {
            return Err(TransportError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(network_error)?)
            .await
            .map_err(network_error)?;
        let body = text
            .as_string()
            .ok_or_else(|| TransportError::Malformed("body is not text".into()))?;
        parse_response(&body)
    }

    fn network_error(e: JsValue) -> TransportError {
        TransportError::Network(format!("{:?}", e))
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Orb Escape (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let difficulty = args
        .next()
        .unwrap_or_else(|| orb_escape::Settings::load().difficulty);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x0DE1_7A);

    let table = orb_escape::DifficultyTable::builtin();
    match orb_escape::GameConfig::new(&table, &difficulty, seed) {
        Ok(config) => headless::run(config),
        Err(e) => {
            log::error!("{}", e);
            let names: Vec<&str> = table.all().iter().map(|p| p.name.as_str()).collect();
            log::error!("Available difficulties: {}", names.join(", "));
            std::process::exit(2);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run against the offline narrator
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use orb_escape::consts::*;
    use orb_escape::feed::OfflineNarrator;
    use orb_escape::sim::{EventLog, Game, TickInput};
    use orb_escape::snapshot::RenderSnapshot;
    use orb_escape::GameConfig;

    /// Three minutes of simulated play
    const DEMO_STEPS: u32 = 60 * 180;

    pub fn run(config: GameConfig) {
        let mut narrator = OfflineNarrator::new(config.seed);
        let mut game = Game::new(config, EventLog::new());
        game.start();

        for step in 0..DEMO_STEPS {
            let now = step as f64 * SIM_DT_MS as f64;
            game.feed_mut().pump(&mut narrator);

            let input = autopilot(&game.snapshot(), now);
            game.tick(&input, SIM_DT_MS);

            let (events, narratives) = game.sink_mut().drain();
            for event in events {
                log::debug!("{:?}", event);
            }
            for text in narratives {
                log::info!("[OVERSEER] {}", text);
            }

            if game.phase().is_terminal() {
                break;
            }
        }
        game.stop();

        let snapshot = game.snapshot();
        log::info!(
            "Demo finished: {:?} on level {}/{} - score {}, lives {}, {}s left",
            snapshot.hud.phase,
            snapshot.hud.level,
            snapshot.hud.max_level,
            snapshot.hud.score,
            snapshot.hud.lives,
            snapshot.seconds_remaining()
        );
    }

    /// Head for the nearest orb, jump when it is above
    fn autopilot(snapshot: &RenderSnapshot, now_ms: f64) -> TickInput {
        let player = &snapshot.player;
        let px = player.x + player.width / 2.0;
        let py = player.y + player.height / 2.0;

        let mut input = TickInput {
            now_ms,
            ..Default::default()
        };
        let nearest = snapshot.orbs.iter().filter(|o| !o.collected).min_by(|a, b| {
            let da = (a.x - px).hypot(a.y - py);
            let db = (b.x - px).hypot(b.y - py);
            da.total_cmp(&db)
        });
        if let Some(orb) = nearest {
            input.move_left = orb.x < px - 4.0;
            input.move_right = orb.x > px + 4.0;
            let above = player.on_ground && orb.y < player.y;
            input.high_jump = above && player.high_jump_charges > 0 && orb.y < player.y - 120.0;
            input.jump = above && !input.high_jump;
        }
        input
    }
}
