//! Drop Box Sandbox
//!
//! Run with: `cargo run --bin sandbox [scene.json]`
//!
//! Opens a window and runs the scene on a simulation thread. The window
//! thread only captures keys; the player position is shown in the title.
//!
//! Controls:
//! - WASD / Arrow keys: Push the player box
//! - ESC: Exit

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use drop_box_engine::input::{KeyCode, SharedInputState};
use drop_box_engine::physics::BodyState;
use drop_box_engine::scene::{SceneConfig, Simulation};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Title refresh interval
const TITLE_INTERVAL: Duration = Duration::from_millis(100);

/// Simulation thread idle time between frames
const SIM_SLEEP: Duration = Duration::from_millis(2);

fn map_key(key: WinitKey) -> KeyCode {
    match key {
        WinitKey::KeyW => KeyCode::W,
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::ArrowUp => KeyCode::ArrowUp,
        WinitKey::ArrowDown => KeyCode::ArrowDown,
        WinitKey::ArrowLeft => KeyCode::ArrowLeft,
        WinitKey::ArrowRight => KeyCode::ArrowRight,
        WinitKey::Escape => KeyCode::Escape,
        _ => KeyCode::Unknown,
    }
}

/// Lock the shared player state. A panic on the other side leaves the last
/// written value, which is still usable, so poisoning is logged and cleared.
fn lock_player(slot: &Mutex<Option<BodyState>>) -> MutexGuard<'_, Option<BodyState>> {
    slot.lock().unwrap_or_else(|poisoned| {
        log::warn!("player state lock poisoned, recovering: {poisoned}");
        slot.clear_poison();
        poisoned.into_inner()
    })
}

/// Simulation thread plus the state it shares with the window.
struct SimThread {
    running: Arc<AtomicBool>,
    player: Arc<Mutex<Option<BodyState>>>,
    handle: Option<JoinHandle<()>>,
}

impl SimThread {
    fn spawn(mut sim: Simulation, input: SharedInputState) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let player = Arc::new(Mutex::new(sim.player_state()));

        let handle = {
            let running = Arc::clone(&running);
            let player = Arc::clone(&player);
            std::thread::spawn(move || {
                let mut last = Instant::now();
                while running.load(Ordering::Acquire) {
                    let now = Instant::now();
                    let frame_dt = (now - last).as_secs_f32();
                    last = now;

                    if sim.advance(&input.snapshot(), frame_dt) > 0 {
                        *lock_player(&player) = sim.player_state();
                    }
                    std::thread::sleep(SIM_SLEEP);
                }
                log::info!("simulation stopped after {} ticks", sim.ticks());
            })
        };

        Self {
            running,
            player,
            handle: Some(handle),
        }
    }

    fn player(&self) -> Option<BodyState> {
        *lock_player(&self.player)
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("simulation thread panicked");
            }
        }
    }
}

struct SandboxApp {
    window: Option<Arc<Window>>,
    input: SharedInputState,
    sim: SimThread,
    last_title: Instant,
}

impl SandboxApp {
    fn new(sim: Simulation) -> Self {
        let input = SharedInputState::new();
        Self {
            window: None,
            sim: SimThread::spawn(sim, input.clone()),
            input,
            last_title: Instant::now(),
        }
    }

    fn update_title(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.last_title.elapsed() < TITLE_INTERVAL {
            return;
        }
        self.last_title = Instant::now();

        let title = match self.sim.player() {
            Some(player) => format!(
                "Drop Box | player ({:.2}, {:.2}, {:.2}){}",
                player.position.x,
                player.position.y,
                player.position.z,
                if player.sleeping { " zZ" } else { "" }
            ),
            None => "Drop Box | player removed".to_string(),
        };
        window.set_title(&title);
    }
}

impl ApplicationHandler for SandboxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = WindowAttributes::default()
                .with_title("Drop Box")
                .with_inner_size(PhysicalSize::new(960, 540));
            match event_loop.create_window(attrs) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(err) => {
                    log::error!("failed to create window: {err}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    let key = map_key(key);
                    if key == KeyCode::Escape && pressed {
                        event_loop.exit();
                        return;
                    }
                    self.input.handle_key(key, pressed);
                }
            }

            // Key-up events are lost while unfocused
            WindowEvent::Focused(false) => self.input.reset(),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.update_title();
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + TITLE_INTERVAL));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.sim.stop();
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    let sim = match Simulation::from_config(&config) {
        Ok(sim) => sim,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    log::info!("Controls: WASD / Arrow keys push the player box, ESC exits");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("failed to create event loop: {err}");
            std::process::exit(1);
        }
    };

    let mut app = SandboxApp::new(sim);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {err}");
    }
    app.sim.stop();
}
