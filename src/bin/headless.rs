//! Headless Drop Box run
//!
//! Run with: `cargo run --bin headless [scene.json] [--ticks N]`
//!
//! Steps the scene at the fixed tick rate without a window, feeding a
//! scripted key sequence, and logs every body's transform once per second
//! of simulated time. Set `RUST_LOG=debug` for body lifecycle and sleep events.

use drop_box_engine::input::{InputState, KeyCode};
use drop_box_engine::scene::{SceneConfig, Simulation};

const DEFAULT_TICKS: u64 = 600;

/// (first tick, key name, pressed)
const SCRIPT: &[(u64, &str, bool)] = &[
    (60, "d", true),
    (180, "ArrowUp", true),
    (240, "d", false),
    (300, "ArrowUp", false),
    (360, "a", true),
    (420, "a", false),
];

struct Args {
    scene: Option<String>,
    ticks: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        scene: None,
        ticks: DEFAULT_TICKS,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = iter.next().ok_or("--ticks needs a value")?;
                args.ticks = value
                    .parse()
                    .map_err(|err| format!("invalid tick count '{value}': {err}"))?;
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => args.scene = Some(other.to_string()),
        }
    }
    Ok(args)
}

fn log_transforms(sim: &Simulation) {
    for body in sim.bodies() {
        let Some(state) = sim.world().get(body.handle) else {
            continue;
        };
        log::info!(
            "  {:<8} pos ({:>7.3}, {:>7.3}, {:>7.3}) vel ({:>6.2}, {:>6.2}, {:>6.2}){}",
            body.name,
            state.position.x,
            state.position.y,
            state.position.z,
            state.linear_velocity.x,
            state.linear_velocity.y,
            state.linear_velocity.z,
            if state.sleeping { " asleep" } else { "" }
        );
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.scene {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let mut sim = Simulation::from_config(&config)?;
    let dt = config.fixed_timestep;
    let ticks_per_second = (1.0 / dt).round().max(1.0) as u64;

    let mut input = InputState::new();
    let mut warnings = 0;

    for tick in 0..args.ticks {
        for &(at, key, pressed) in SCRIPT {
            if at == tick {
                log::info!("tick {tick}: {} {key}", if pressed { "press" } else { "release" });
                input.handle_key(KeyCode::from_name(key), pressed);
            }
        }

        let report = sim.tick(&input, dt);
        warnings += report.step.warnings.len();
        if let Some(err) = report.controller_error {
            log::warn!("tick {tick}: {err}");
        }

        if (tick + 1) % ticks_per_second == 0 {
            log::info!(
                "t = {:.2}s, {} contacts",
                sim.world().time(),
                report.step.contacts
            );
            log_transforms(&sim);
        }
    }

    log::info!("done: {} ticks, {warnings} recovered warnings", sim.ticks());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            log::error!("{err}");
            eprintln!("usage: headless [scene.json] [--ticks N]");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
