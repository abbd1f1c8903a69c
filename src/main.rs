//! Garden Rush entry point
//!
//! Headless runner: plays a scripted input sequence at 60 Hz and logs mode
//! changes and audio intents. Pass a tuning JSON file as the first argument
//! to override the defaults.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use garden_rush::consts::FRAME_DT;
    use garden_rush::{Direction, GameManager, Settings, Tuning};

    env_logger::init();
    log::info!("Garden Rush (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let mut game = match GameManager::new(tuning, Settings::default(), 0x6172_6465_6e) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to create game: {}", e);
            std::process::exit(1);
        }
    };

    // Press through the title, then wander clockwise around the garden
    let route = [
        Direction::Right,
        Direction::Right,
        Direction::Down,
        Direction::Down,
        Direction::Left,
        Direction::Left,
        Direction::Up,
        Direction::Up,
    ];
    let mut last_mode = game.mode();
    for frame in 0..60 * 60 {
        let input = match frame {
            0 => Some(Direction::Down),
            f if f % 12 == 0 => Some(route[(f / 12) % route.len()]),
            _ => None,
        };
        let output = game.update(FRAME_DT, input);

        for intent in game.drain_audio() {
            log::debug!("frame {}: audio {:?}", frame, intent);
        }
        if game.mode() != last_mode {
            last_mode = game.mode();
            log::info!(
                "frame {}: {:?} (score {}, shake {:.2})",
                frame,
                last_mode,
                game.score(),
                output.camera_offset.length()
            );
        }
    }

    let snapshot = game.snapshot();
    println!(
        "Finished in {:?}: score {} x{}, {}/{} tiles visited, {} enemies",
        snapshot.mode,
        snapshot.score,
        snapshot.multiplier,
        snapshot.tilemap.visited_count(),
        snapshot.tilemap.floor_count(),
        snapshot.enemies.len()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> garden_rush::GameResult<garden_rush::Tuning> {
    let json = std::fs::read_to_string(path)?;
    garden_rush::Tuning::from_json(&json)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}
