//! Zone Runner entry point
//!
//! Native builds run a headless session driven by a simple autopilot, which
//! is handy for soak-testing the engine and listening to the zone tracks.
//! The web build is driven from JavaScript through `platform::web::WebGame`.
//!
//! Usage: zone-runner [--seconds N] [--seed N] [--audio DIR] [--zones FILE]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use zone_runner::audio::{AudioManager, WavFileLoader};
    use zone_runner::consts::CHARACTER_SIZE;
    use zone_runner::renderer::Frame;
    use zone_runner::sim::{GamePhase, ZoneCatalog};
    use zone_runner::{Engine, platform};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Jump when a hazard's left edge is this close ahead
    const JUMP_LOOKAHEAD: f32 = 70.0;

    struct Options {
        seconds: f32,
        seed: u64,
        audio_dir: Option<String>,
        zones_file: Option<String>,
    }

    fn parse_args() -> Options {
        use platform::SystemClock;
        use zone_runner::persistence::Clock;

        let mut options = Options {
            seconds: 180.0,
            seed: SystemClock.now_ms(),
            audio_dir: None,
            zones_file: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seconds" => {
                    if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                        options.seconds = v;
                    }
                }
                "--seed" => {
                    if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                        options.seed = v;
                    }
                }
                "--audio" => options.audio_dir = args.next(),
                "--zones" => options.zones_file = args.next(),
                other => log::warn!("Ignoring unknown argument '{}'", other),
            }
        }
        options
    }

    fn load_catalog(path: Option<&str>) -> ZoneCatalog {
        let Some(path) = path else {
            return ZoneCatalog::builtin();
        };
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| ZoneCatalog::from_json(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(catalog) => {
                log::info!("Loaded {} zones from {}", catalog.len(), path);
                catalog
            }
            Err(e) => {
                log::warn!("Failed to load zones from {}: {} - using built-in zones", path, e);
                ZoneCatalog::builtin()
            }
        }
    }

    fn should_jump(engine: &Engine) -> bool {
        let state = engine.state();
        let front = state.character.pos.x + CHARACTER_SIZE;
        state.obstacles.iter().any(|o| {
            !o.is_collectible && o.pos.x > front - 20.0 && o.pos.x - front < JUMP_LOOKAHEAD
        })
    }

    pub fn run() {
        platform::init_logging();
        let options = parse_args();
        log::info!("Zone Runner (headless) starting, seed {}", options.seed);

        let catalog = load_catalog(options.zones_file.as_deref());
        let audio = if options.audio_dir.is_some() {
            AudioManager::with_default_output()
        } else {
            AudioManager::silent()
        };
        let mut engine = Engine::new(catalog, audio, platform::default_storage(), options.seed);

        match &options.audio_dir {
            Some(dir) => {
                let loader = WavFileLoader::new(dir);
                engine.preload_audio(&loader, |done, total| {
                    log::debug!("Loading tracks {}/{}", done, total);
                });
            }
            None => engine.finish_loading(),
        }

        // Falls back to a fresh run when there is no save
        engine.resume_saved();

        let mut frame = Frame::new();
        let frames = (options.seconds / FRAME_DT) as u64;
        let mut game_overs = 0u32;

        for _ in 0..frames {
            if should_jump(&engine) {
                engine.handle_jump();
            }
            engine.frame(FRAME_DT);

            for pattern in engine.drain_haptics() {
                platform::vibrate(pattern.pattern());
            }

            match engine.phase() {
                GamePhase::GameOver => {
                    game_overs += 1;
                    engine.retry();
                }
                GamePhase::Finale => break,
                _ => {}
            }
        }

        frame.clear();
        engine.render(&mut frame);
        let hud = engine.hud();
        log::info!(
            "Finished in {:?}: zone {}/{} ({}), score {}, lives {}, game overs {}, {} triangles in last frame",
            hud.phase,
            hud.zone_index + 1,
            hud.zone_count,
            hud.zone_name,
            hud.score,
            hud.lives,
            game_overs,
            frame.triangle_count()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::WebGame, this is just to satisfy the compiler
}
