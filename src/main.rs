mod app;
mod config;
mod constants;
mod error;
mod frame;
mod gesture;
mod input;
mod renderer;
mod session;
mod ui;
mod viewport;

use config::ViewerConfig;
use constants::*;
use error::AppError;
use glam::DVec2;
use renderer::Renderer;
use session::ViewSession;
use std::path::PathBuf;

use glutin::prelude::*;
use glutin::surface::WindowSurface;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use egui_glow::EguiGlow;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load(config_path.as_deref())?;

    let _profiler = if config.profiling {
        start_profiler()
    } else {
        None
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn start_profiler() -> Option<puffin_http::Server> {
    let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
    match puffin_http::Server::new(&addr) {
        Ok(server) => {
            puffin::set_scopes_on(true);
            tracing::info!(%addr, "puffin profiler listening");
            Some(server)
        }
        Err(err) => {
            tracing::warn!(error = %err, "profiler disabled");
            None
        }
    }
}

struct App {
    config: ViewerConfig,
    state: Option<AppState>,
    /// Fatal error that stopped the event loop
    error: Option<AppError>,
}

struct AppState {
    // Rendering, dropped before the context it draws with
    renderer: Renderer,
    egui_glow: EguiGlow,

    // Window and GL
    window: Window,
    gl_surface: glutin::surface::Surface<WindowSurface>,
    gl_context: glutin::context::PossiblyCurrentContext,

    // View
    session: ViewSession,
    input: input::InputState,
    show_hud: bool,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            state: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        tracing::error!(error = %err, "fatal error, shutting down");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match AppState::new(event_loop, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        // Let egui handle the event first
        let egui_consumed = state.show_hud && state.egui_glow.on_window_event(&state.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app::resize_surface(&state.gl_surface, &state.gl_context, size.width, size.height);
                state.renderer.resize(size.width as i32, size.height as i32);
                state.session.resize(size.width as f64, size.height as f64, &self.config);
                tracing::debug!(width = size.width, height = size.height, "surface resized");
            }
            WindowEvent::Focused(false) => {
                if let Some(sample) = state.input.cancel_all() {
                    state.session.pan(sample);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !egui_consumed {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        match event.state {
                            ElementState::Pressed => {
                                if key == KeyCode::Escape {
                                    event_loop.exit();
                                }
                                state.input.keys_pressed.insert(key);
                            }
                            ElementState::Released => {
                                state.input.keys_pressed.remove(&key);
                            }
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(sample) = state.input.mouse_moved(DVec2::new(position.x, position.y)) {
                    state.session.pan(sample);
                }
            }
            WindowEvent::MouseInput { state: btn_state, button: MouseButton::Left, .. } => {
                let sample = match btn_state {
                    ElementState::Pressed if !egui_consumed => state.input.mouse_pressed(),
                    ElementState::Pressed => None,
                    ElementState::Released => state.input.mouse_released(),
                };
                if let Some(sample) = sample {
                    state.session.pan(sample);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !egui_consumed {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y as f64,
                        MouseScrollDelta::PixelDelta(pos) => pos.y / WHEEL_PIXELS_PER_LINE,
                    };
                    state.input.wheel(lines, self.config.wheel_zoom_step);
                    state.session.pinch(&mut state.input.pinch);
                }
            }
            WindowEvent::PinchGesture { delta, .. } => {
                state.input.trackpad_pinch(delta);
                state.session.pinch(&mut state.input.pinch);
            }
            WindowEvent::PanGesture { delta, phase, .. } => {
                let delta = DVec2::new(delta.x as f64, delta.y as f64);
                let sample = state.input.trackpad_pan(delta, phase);
                state.session.pan(sample);
            }
            WindowEvent::DoubleTapGesture { .. } => {
                state.reset_view();
            }
            WindowEvent::Touch(touch) => {
                // A tap that starts on the HUD belongs to egui
                if egui_consumed && touch.phase == TouchPhase::Started {
                    return;
                }
                let location = DVec2::new(touch.location.x, touch.location.y);
                if let Some(sample) = state.input.touch(touch.id, touch.phase, location) {
                    state.session.pan(sample);
                }
                state.session.pinch(&mut state.input.pinch);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.update_and_render(&self.config) {
                    self.fail(event_loop, err);
                    return;
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, AppError> {
        let app::WindowContext {
            window,
            gl_surface,
            gl_context,
            gl,
            egui_glow,
        } = app::create_window(event_loop, config)?;

        // Fullscreen may not be applied yet; Resized refits the view when it is
        let size = window.inner_size();
        let session = ViewSession::new(size.width as f64, size.height as f64, config);
        let renderer = Renderer::new(gl, config.max_iterations)?;
        renderer.resize(size.width as i32, size.height as i32);

        Ok(Self {
            renderer,
            egui_glow,
            window,
            gl_surface,
            gl_context,
            session,
            input: input::InputState::new(),
            show_hud: config.show_hud,
        })
    }

    fn update_and_render(&mut self, config: &ViewerConfig) -> Result<(), AppError> {
        puffin::GlobalProfiler::lock().new_frame();
        puffin::profile_function!();

        self.handle_input(config);

        // Snapshot the view and draw the fractal
        self.session.publish(&mut self.renderer)?;

        if self.show_hud {
            let actions = self.run_ui();
            self.egui_glow.paint(&self.window);
            if actions.reset_view {
                self.reset_view();
            }
        }

        self.gl_surface.swap_buffers(&self.gl_context)?;
        Ok(())
    }

    fn run_ui(&mut self) -> ui::HudActions {
        let mut actions = ui::HudActions::default();
        let data = ui::HudData {
            params: self.session.last_frame().copied(),
            frames: self.session.frames(),
            max_iterations: self.renderer.max_iterations(),
        };

        self.egui_glow.run(&self.window, |ctx| {
            ui::draw_hud(ctx, &data, &mut actions);
        });

        actions
    }

    fn handle_input(&mut self, config: &ViewerConfig) {
        let result = input::process_keyboard(&mut self.input);

        if result.toggle_fullscreen {
            use winit::window::Fullscreen;
            let fullscreen = if self.window.fullscreen().is_some() {
                None
            } else {
                Some(Fullscreen::Borderless(None))
            };
            self.window.set_fullscreen(fullscreen);
        }

        if result.toggle_hud {
            self.show_hud = !self.show_hud;
        }

        if result.reset_view {
            self.reset_view();
        }

        if result.zoom_steps != 0 {
            self.session.zoom_by(config.key_zoom_step.powi(result.zoom_steps));
        }
    }

    fn reset_view(&mut self) {
        // Any half-finished gesture would otherwise continue from the old view
        let _ = self.input.cancel_all();
        self.session.reset();
    }
}
