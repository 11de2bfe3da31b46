//! Headless spaceship demo -- flies the ship around the barriers with a
//! scripted set of key presses and logs where everything ends up.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example spaceships -p comet-engine [config.json]
//!
//! Script:
//!   thrust, turn right, thrust into the barriers, reverse, pan the camera

use comet_engine::prelude::*;
use comet_engine::scene;
use tracing::info;

const FRAMES: u64 = 360;

fn script(input: &mut ScriptedInput) {
    input.hold(&[Key::Up], 60);
    input.hold(&[Key::Right], 30);
    input.hold(&[Key::Up], 120);
    input.hold(&[Key::Down, Key::Left], 60);
    input.hold(&[Key::D, Key::W], 60);
    input.hold(&[], 30);
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)?,
        None => EngineConfig::default(),
    };

    let mut assets = AssetCatalog::new();
    scene::load_resources(&mut assets);

    let mut world = World::new();
    let demo = scene::build_demo_scene(&mut world, &assets, &config)?;

    let mut input = ScriptedInput::new();
    script(&mut input);

    let clock = FixedClock::new(config.fixed_dt.unwrap_or(1.0 / 60.0));
    let mut frames = FrameLoop::new(
        world,
        input,
        clock,
        RecordingSurface::with_frame_budget(FRAMES),
        config,
    )?;

    let mut collisions = 0usize;
    while frames.surface().is_open() {
        frames.frame()?;
        collisions += frames.last_collisions().len();
        if frames.frame_count() % 60 != 0 {
            continue;
        }

        let ship = frames.world().get_component::<Transform>(demo.ship)?;
        let exhaust = frames.world().get_component::<Particler>(demo.ship)?.len();
        info!(
            frame = frames.frame_count(),
            x = ship.position.x,
            y = ship.position.y,
            rotation = ship.rotation,
            exhaust,
            "ship"
        );
    }

    for (i, &barrier) in demo.barriers.iter().enumerate() {
        let t = frames.world().get_component::<Transform>(barrier)?;
        info!(barrier = i, x = t.position.x, y = t.position.y, "barrier final position");
    }

    let diagnostics = frames.last_diagnostics();
    info!(
        frames = frames.frame_count(),
        simulated_seconds = frames.clock().elapsed(),
        camera_x = frames.camera().center.x,
        camera_y = frames.camera().center.y,
        collisions,
        last_frame_us = diagnostics.total_time.as_micros() as u64,
        "done"
    );
    Ok(())
}
