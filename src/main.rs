use macroquad::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod animation;
mod config;
mod entity;
mod physics;
mod random;
mod renderer;
mod reporting;
mod simulation;
mod turns;
mod viewport;
mod world;

use animation::SpriteField;
use config::{LaunchOptions, SimulationConfig};
use renderer::{ScreenSurface, SpriteArt};

const ASSET_DIR: &str = "assets/illust";

fn window_conf() -> Conf {
    Conf {
        window_title: "Wanderfield: route loading".to_string(),
        window_width: config::WINDOW_WIDTH,
        window_height: config::WINDOW_HEIGHT,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Bad flags or config files degrade to defaults; the animation is decorative.
fn resolve_config(opts: &LaunchOptions) -> SimulationConfig {
    let mut config = match &opts.config_path {
        Some(path) => SimulationConfig::load(path).unwrap_or_else(|e| {
            warn!("{e}; falling back to default motion settings");
            SimulationConfig::default()
        }),
        None => SimulationConfig::default(),
    };
    if let Some(count) = opts.sprite_count {
        let mut candidate = config.clone();
        candidate.sprite_count = count;
        match candidate.validate() {
            Ok(()) => config = candidate,
            Err(e) => warn!("ignoring --sprites: {e}"),
        }
    }
    config
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging();

    let opts = LaunchOptions::parse_cli(std::env::args().skip(1)).unwrap_or_else(|e| {
        warn!("{e}; continuing with defaults");
        LaunchOptions::default()
    });
    let config = resolve_config(&opts);
    let rng = match opts.seed {
        Some(seed) => {
            info!(seed, "deterministic seeding");
            random::seeded(seed)
        }
        None => random::from_entropy(),
    };

    let art = SpriteArt::load(ASSET_DIR).await;
    let mut field = SpriteField::new(config, ScreenSurface, rng);
    let started_at = get_time();
    let handle = field.start(started_at);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            handle.cancel();
        }
        if let Some(limit) = opts.duration {
            if get_time() - started_at >= limit {
                handle.cancel();
            }
        }

        if !field.tick(get_time(), get_frame_time()) {
            break;
        }

        renderer::draw(&field.positions(), field.sprite_size(), &art);
        next_frame().await;
    }

    field.stop();
}
