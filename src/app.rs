//! Window and OpenGL context management.
//!
//! Creates the winit window, the glutin GL context and surface, and the egui
//! integration, keeping platform setup out of the solver.

use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use egui_glow::EguiGlow;

/// Result of window and GL context creation.
pub struct WindowContext {
    pub window: Window,
    pub gl_surface: glutin::surface::Surface<WindowSurface>,
    pub gl_context: glutin::context::PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
    pub egui_glow: EguiGlow,
}

/// Create a `width` x `height` window with an OpenGL 3.3 context and egui.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    title: &str,
    width: u32,
    height: u32,
) -> anyhow::Result<WindowContext> {
    let window_attrs = WindowAttributes::default()
        .with_title(title)
        .with_inner_size(PhysicalSize::new(width, height))
        .with_resizable(true);

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            // glutin-winit's picker must return a Config, so an empty list
            // cannot be reported as an error from here.
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("display offered no GL configs")
        })
        .map_err(|e| anyhow!("failed to create window: {e}"))?;

    let window = window.context("failed to create window")?;
    let window_handle = window
        .window_handle()
        .map_err(|e| anyhow!("window has no native handle: {e}"))?;
    let gl_display = gl_config.display();

    let context_attrs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(window_handle.as_raw()));

    let gl_context = unsafe {
        gl_display
            .create_context(&gl_config, &context_attrs)
            .context("failed to create OpenGL context")?
    };

    let size = window.inner_size();
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window_handle.as_raw(),
        NonZeroU32::new(size.width).context("window has zero width")?,
        NonZeroU32::new(size.height).context("window has zero height")?,
    );

    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &surface_attrs)
            .context("failed to create surface")?
    };

    let gl_context = gl_context
        .make_current(&gl_surface)
        .context("failed to make context current")?;

    let gl = Arc::new(unsafe {
        glow::Context::from_loader_function(|s| match CString::new(s) {
            Ok(s) => gl_display.get_proc_address(&s) as *const _,
            Err(_) => std::ptr::null(),
        })
    });

    let egui_glow = EguiGlow::new(event_loop, gl.clone(), None, None, false);
    egui_glow.egui_ctx.set_style(crate::ui::overlay_style());

    Ok(WindowContext {
        window,
        gl_surface,
        gl_context,
        gl,
        egui_glow,
    })
}

/// Resize the GL surface to match the window size.
pub fn resize_surface(
    gl_surface: &glutin::surface::Surface<WindowSurface>,
    gl_context: &glutin::context::PossiblyCurrentContext,
    width: u32,
    height: u32,
) {
    if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
        gl_surface.resize(gl_context, w, h);
    }
}
