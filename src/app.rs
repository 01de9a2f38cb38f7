//! Application window and OpenGL context management.
//!
//! This module handles window creation, OpenGL context setup, and the winit
//! event loop integration. It keeps platform/graphics setup away from the
//! viewport model.

use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::{Display, DisplayApiPreference, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowAttributes};

use egui_glow::EguiGlow;

use crate::config::ViewerConfig;
use crate::constants::*;
use crate::error::AppError;

/// Result of window and GL context creation.
pub struct WindowContext {
    pub window: Window,
    pub gl_surface: glutin::surface::Surface<WindowSurface>,
    pub gl_context: glutin::context::PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
    pub egui_glow: EguiGlow,
}

/// Create a window with OpenGL context and egui integration.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &ViewerConfig,
) -> Result<WindowContext, AppError> {
    let mut window_attrs = WindowAttributes::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size(PhysicalSize::new(config.window_width, config.window_height))
        .with_resizable(true);
    if config.fullscreen {
        window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    let (window, gl_config) = open_display(event_loop, window_attrs)?;
    let window_handle = window
        .window_handle()
        .map_err(|e| AppError::Window(e.to_string()))?;
    let gl_display = gl_config.display();

    let context_attrs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(window_handle.as_raw()));

    let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attrs)? };

    let size = window.inner_size();
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window_handle.as_raw(),
        NonZeroU32::new(size.width).ok_or(AppError::ZeroSize)?,
        NonZeroU32::new(size.height).ok_or(AppError::ZeroSize)?,
    );

    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs)? };

    let gl_context = gl_context.make_current(&gl_surface)?;

    let gl = Arc::new(unsafe {
        glow::Context::from_loader_function(|s| match CString::new(s) {
            Ok(s) => gl_display.get_proc_address(&s) as *const _,
            Err(_) => std::ptr::null(),
        })
    });

    tracing::info!(
        width = size.width,
        height = size.height,
        samples = gl_config.num_samples(),
        "created window and GL 3.3 context"
    );

    let egui_glow = EguiGlow::new(event_loop, gl.clone(), None, None, false);

    Ok(WindowContext {
        window,
        gl_surface,
        gl_context,
        gl,
        egui_glow,
    })
}

/// Open the GL display, pick the config with the most samples and create the
/// window for it. WGL needs the window before the display, the others after.
fn open_display(
    event_loop: &ActiveEventLoop,
    window_attrs: WindowAttributes,
) -> Result<(Window, Config), AppError> {
    let display_handle = event_loop
        .display_handle()
        .map_err(|e| AppError::Window(e.to_string()))?
        .as_raw();
    let template = ConfigTemplateBuilder::new().with_alpha_size(8);

    #[cfg(target_os = "windows")]
    let window = Some(
        event_loop
            .create_window(window_attrs.clone())
            .map_err(|e| AppError::Window(e.to_string()))?,
    );
    #[cfg(not(target_os = "windows"))]
    let window: Option<Window> = None;

    let template = match window.as_ref().and_then(|w| w.window_handle().ok()) {
        Some(handle) => template.compatible_with_native_window(handle.as_raw()),
        None => template,
    };

    let preference = display_preference(window.as_ref());
    let gl_display = unsafe { Display::new(display_handle, preference)? };
    let configs = unsafe { gl_display.find_configs(template.build())? };
    let gl_config = pick_config(configs).ok_or_else(|| AppError::Window("no GL config matches".into()))?;

    let window = match window {
        Some(window) => window,
        None => glutin_winit::finalize_window(event_loop, window_attrs, &gl_config)
            .map_err(|e| AppError::Window(e.to_string()))?,
    };
    Ok((window, gl_config))
}

/// Prefer the config with the most multisample samples.
fn pick_config(configs: impl Iterator<Item = Config>) -> Option<Config> {
    configs.reduce(|accum, config| {
        if config.num_samples() > accum.num_samples() {
            config
        } else {
            accum
        }
    })
}

#[cfg(target_os = "windows")]
fn display_preference(window: Option<&Window>) -> DisplayApiPreference {
    let raw = window
        .and_then(|window| window.window_handle().ok())
        .map(|handle| handle.as_raw());
    DisplayApiPreference::WglThenEgl(raw)
}

#[cfg(target_os = "macos")]
fn display_preference(_window: Option<&Window>) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference(_window: Option<&Window>) -> DisplayApiPreference {
    DisplayApiPreference::GlxThenEgl(Box::new(winit::platform::x11::register_xlib_error_hook))
}

/// Resize the GL surface to match the window size.
pub fn resize_surface(
    gl_surface: &glutin::surface::Surface<WindowSurface>,
    gl_context: &glutin::context::PossiblyCurrentContext,
    width: u32,
    height: u32,
) {
    if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
        gl_surface.resize(gl_context, width, height);
    }
}
