#![allow(dead_code)]

mod app;
mod camera;
mod config;
mod constants;
mod delaunay;
mod dungeon;
mod error;
mod input;
mod map;
mod neighbors;
mod nudge;
mod physics;
mod renderer;
mod room;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use glutin::prelude::*;
use glutin::surface::WindowSurface;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use egui_glow::EguiGlow;

use camera::Camera;
use config::LayoutConfig;
use dungeon::Dungeon;
use input::DungeonAction;
use renderer::{Renderer, SceneBatch};

/// Procedural dungeon layouts settled by rigid-body physics
#[derive(Parser, Debug)]
#[command(name = "rigid-dungeons")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a window and solve a layout
    Start(StartArgs),
}

// -h is taken by --height, so help is long-only
#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
struct StartArgs {
    /// Window/map width in pixels [default: 1024]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Window/map height in pixels [default: 1024]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Number of rooms to generate [default: 50]
    #[arg(short, long)]
    rooms: Option<u32>,

    /// Seed for room sizes; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with solver settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve puffin profiling data on the default puffin_http port
    #[arg(long)]
    profile: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl StartArgs {
    fn layout_config(&self) -> anyhow::Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LayoutConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(rooms) = self.rooms {
            config.rooms = rooms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Start(args) => start(args),
    }
}

fn start(args: StartArgs) -> anyhow::Result<()> {
    // Everything is checked before a window exists
    let config = args.layout_config()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        width = config.width,
        height = config.height,
        rooms = config.rooms,
        seed,
        "starting rigid-dungeons v{}",
        env!("CARGO_PKG_VERSION")
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let dungeon = Dungeon::new(&config, &mut rng)?;

    let _profiler = if args.profile {
        puffin::set_scopes_on(true);
        let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        let server = puffin_http::Server::new(&addr)?;
        info!("serving profile data on {addr}");
        Some(server)
    } else {
        None
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(dungeon);
    event_loop.run_app(&mut app)?;

    match app.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    dungeon: Dungeon,
    state: Option<AppState>,
    startup_error: Option<anyhow::Error>,
}

struct AppState {
    window: Window,
    gl_surface: glutin::surface::Surface<WindowSurface>,
    gl_context: glutin::context::PossiblyCurrentContext,
    gl: Arc<glow::Context>,
    egui_glow: EguiGlow,
    camera: Camera,
    renderer: Renderer,
    batch: SceneBatch,
}

impl App {
    fn new(dungeon: Dungeon) -> Self {
        Self {
            dungeon,
            state: None,
            startup_error: None,
        }
    }

    fn create_state(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let map = self.dungeon.map();
        let app::WindowContext {
            window,
            gl_surface,
            gl_context,
            gl,
            egui_glow,
        } = app::create_window(event_loop, "Rigid Dungeons", map.width(), map.height())?;

        let size = window.inner_size();
        let camera = Camera::new(map.width(), map.height(), size.width as f32, size.height as f32);
        let renderer = Renderer::new(gl.clone())
            .map_err(|e| anyhow::anyhow!("failed to create renderer: {e}"))?;
        renderer.resize(size.width as i32, size.height as i32);

        Ok(AppState {
            window,
            gl_surface,
            gl_context,
            gl,
            egui_glow,
            camera,
            renderer,
            batch: SceneBatch::default(),
        })
    }

    fn apply(&mut self, action: DungeonAction, event_loop: &ActiveEventLoop) {
        match action {
            DungeonAction::Quit => event_loop.exit(),
            DungeonAction::TogglePause => self.dungeon.toggle_pause(),
            DungeonAction::Begin => {
                if let Err(e) = self.dungeon.begin() {
                    warn!("begin failed: {e}");
                }
            }
            DungeonAction::Reset => {
                if let Err(e) = self.dungeon.reset() {
                    error!("reset failed: {e}");
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.create_state(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                error!("{e:#}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        let egui_consumed = state.egui_glow.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app::resize_surface(&state.gl_surface, &state.gl_context, size.width, size.height);
                state.renderer.resize(size.width as i32, size.height as i32);
                state.camera.resize(size.width as f32, size.height as f32);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_consumed.consumed {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = input::process_key(key, event.state) {
                        self.apply(action, event_loop);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                state.update_and_render(&mut self.dungeon);
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
    fn update_and_render(&mut self, dungeon: &mut Dungeon) {
        puffin::GlobalProfiler::lock().new_frame();
        puffin::profile_function!();

        dungeon.tick();

        self.batch.clear();
        dungeon.present(&mut self.batch);
        self.renderer.render(&self.camera, &self.batch);

        let status = ui::StatusData::from_dungeon(dungeon);
        self.egui_glow.run(&self.window, |ctx| {
            ui::draw_status(ctx, &status);
        });
        self.egui_glow.paint(&self.window);

        if let Err(e) = self.gl_surface.swap_buffers(&self.gl_context) {
            error!("failed to swap buffers: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["rigid-dungeons", "start", "-w", "640", "-h", "480", "-r", "12"])
            .unwrap();
        let Commands::Start(args) = cli.command;
        let config = args.layout_config().unwrap();
        assert_eq!((config.width, config.height, config.rooms), (640, 480, 12));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rigid-dungeons", "start"]).unwrap();
        let Commands::Start(args) = cli.command;
        let config = args.layout_config().unwrap();
        assert_eq!((config.width, config.height, config.rooms), (1024, 1024, 50));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_bad_sizes_fail_fast() {
        assert!(Cli::try_parse_from(["rigid-dungeons", "start", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["rigid-dungeons", "start", "--height", "-5"]).is_err());
        assert!(Cli::try_parse_from(["rigid-dungeons", "start", "--rooms", "many"]).is_err());
    }

    #[test]
    fn test_too_many_rooms_rejected_before_window() {
        let cli = Cli::try_parse_from(["rigid-dungeons", "start", "-r", "1000000"]).unwrap();
        let Commands::Start(args) = cli.command;
        assert!(args.layout_config().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from([
            "rigid-dungeons",
            "start",
            "--config",
            "/nonexistent/layout.json",
        ])
        .unwrap();
        let Commands::Start(args) = cli.command;
        assert!(args.layout_config().is_err());
    }
}
