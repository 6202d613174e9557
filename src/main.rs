use std::collections::HashSet;
use std::f64::consts::PI;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use wolfcast::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use wolfcast::{EngineConfig, FrameTimings, RaycastEngine, WorldMap};

mod demo_textures;

const PIXEL_WIDTH: usize = 320;
const PIXEL_HEIGHT: usize = 200;
const PIXEL_SCALE: u32 = 4;

const DUNGEON: [&str; 10] = [
    "11111111111111111111",
    "1..................1",
    "1..111111222222.2221",
    "1.....1.....2.....t1",
    "1.g...1.gh..2..h...1",
    "1...111t....2222...1",
    "1....t1222..2......1",
    "1....g.222..2.1.2.11",
    "1.h.......s........1",
    "11111111111111111111",
];

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    engine: RaycastEngine,
    scale_lut: ScaleLut,

    // HUD
    started: Instant,
    frame_counter: u32,
    last_fps_print: Instant,
    pass_totals: FrameTimings,

    // Input and movement
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    move_speed: f64,
    turn_speed: f64,
}

impl App {
    fn new(engine: RaycastEngine) -> Self {
        let now = Instant::now();
        Self {
            window: None,
            surface: None,
            engine,
            scale_lut: ScaleLut::empty(),
            started: now,
            frame_counter: 0,
            last_fps_print: now,
            pass_totals: FrameTimings::default(),
            keys_down: HashSet::new(),
            last_tick: now,
            move_speed: 2.0, // cells/s
            turn_speed: PI,  // rad/s
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("wolfcast")
            .with_inner_size(LogicalSize::new(
                PIXEL_WIDTH as u32 * PIXEL_SCALE,
                PIXEL_HEIGHT as u32 * PIXEL_SCALE,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(err) => {
                tracing::error!(%err, "could not create window");
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(%err, "could not create softbuffer surface");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.last_tick = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    ..
                },
                ..
            } => match state {
                ElementState::Pressed => {
                    if code == KeyCode::Escape {
                        event_loop.exit();
                    }
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.apply_input();
                let timings = self.engine.tick(self.started.elapsed());

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // minimized
                };
                if let Err(err) = surface.resize(dw, dh) {
                    tracing::error!(%err, "surface resize failed");
                    return;
                }

                match surface.buffer_mut() {
                    Ok(mut buf) => {
                        blit_nearest(
                            &mut buf,
                            dw.get() as usize,
                            self.engine.pixels(),
                            self.engine.width(),
                            &self.scale_lut,
                        );
                        if let Err(err) = buf.present() {
                            tracing::error!(%err, "present failed");
                        }
                    }
                    Err(err) => tracing::error!(%err, "buffer_mut failed"),
                }

                window.request_redraw();
                self.report(timings);
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    fn apply_input(&mut self) {
        // Cap dt to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;
        let dt_s = dt.as_secs_f64();

        let axis = |keys: &HashSet<KeyCode>, plus: KeyCode, minus: KeyCode| {
            keys.contains(&plus) as i32 as f64 - keys.contains(&minus) as i32 as f64
        };
        let fwd = axis(&self.keys_down, KeyCode::KeyW, KeyCode::KeyS);
        let strafe = axis(&self.keys_down, KeyCode::KeyD, KeyCode::KeyA);
        let turn = axis(&self.keys_down, KeyCode::KeyQ, KeyCode::KeyE);
        let zoom = axis(&self.keys_down, KeyCode::KeyX, KeyCode::KeyZ);

        if turn != 0.0 {
            self.engine.rotate(turn * self.turn_speed * dt_s);
        }
        if fwd != 0.0 {
            self.engine.move_forward_or_back(fwd * self.move_speed * dt_s);
        }
        if strafe != 0.0 {
            self.engine.move_left_or_right(strafe * self.move_speed * dt_s);
        }
        if zoom != 0.0 {
            let fov = (self.engine.camera().field_of_view() + zoom * dt_s)
                .clamp(20f64.to_radians(), 150f64.to_radians());
            if let Err(err) = self.engine.set_field_of_view(fov) {
                tracing::warn!(%err, "field of view rejected");
            }
        }
    }

    fn report(&mut self, timings: FrameTimings) {
        self.frame_counter += 1;
        self.pass_totals.walls += timings.walls;
        self.pass_totals.floor_ceiling += timings.floor_ceiling;
        self.pass_totals.sprites += timings.sprites;

        let now = Instant::now();
        let secs = now.duration_since(self.last_fps_print).as_secs_f64();
        if secs >= 1.0 {
            let n = self.frame_counter.max(1);
            tracing::info!(
                fps = self.frame_counter as f64 / secs,
                walls = ?(self.pass_totals.walls / n),
                floor_ceiling = ?(self.pass_totals.floor_ceiling / n),
                sprites = ?(self.pass_totals.sprites / n),
                "frame stats"
            );
            self.frame_counter = 0;
            self.pass_totals = FrameTimings::default();
            self.last_fps_print = now;
        }
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        self.scale_lut = build_scale_lut(dst_w, dst_h, self.engine.width(), self.engine.height());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let map = WorldMap::from_rows(&DUNGEON)?;
    let engine = RaycastEngine::new(
        PIXEL_WIDTH,
        PIXEL_HEIGHT,
        map,
        demo_textures::build(),
        EngineConfig::from_env(),
    )?;

    let event_loop = EventLoop::new()?;
    // Poll: redraw continuously like a game loop
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(engine);
    event_loop.run_app(&mut app)?;
    Ok(())
}
