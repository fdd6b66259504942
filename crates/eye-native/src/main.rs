use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use eye_core::render::Renderer;
use eye_core::{load_glb, AssetError, SceneState, Viewport};
use glam::Vec2;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::Key;
use winit::window::WindowBuilder;

#[derive(Parser, Debug)]
#[command(name = "eye-native")]
#[command(about = "Desktop viewer for the watchful-eye scene (GLB with Pupil/EyeRing/EyeCover)")]
struct Cli {
    /// Path to the .glb model
    path: PathBuf,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn read_model(path: &Path) -> Result<eye_core::LoadedAsset, AssetError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AssetError::Unavailable(format!("{}: {}", path.display(), e)))?;
    log::info!("[asset] {}: {} bytes, 100% loaded", path.display(), bytes.len());
    load_glb(&bytes)
}

/// What the event loop does once a frame has been attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterFrame {
    Redraw,
    /// Surface lost or outdated: reconfigure, then keep drawing.
    Reconfigure,
    Exit,
}

impl AfterFrame {
    fn keeps_drawing(self) -> bool {
        self != AfterFrame::Exit
    }
}

fn after_render(result: Result<(), wgpu::SurfaceError>) -> AfterFrame {
    match result {
        Ok(()) => AfterFrame::Redraw,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => AfterFrame::Reconfigure,
        Err(wgpu::SurfaceError::OutOfMemory) => AfterFrame::Exit,
        Err(e) => {
            log::error!("[gpu] render error: {:?}", e);
            AfterFrame::Redraw
        }
    }
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let cli = Cli::parse();

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("watchful-eye")
            .with_inner_size(LogicalSize::new(cli.width, cli.height))
            .build(&event_loop)?,
    );

    let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
    let mut state = SceneState::new(Viewport::new(logical.width, logical.height));
    state.on_asset_loaded(read_model(&cli.path));

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window.clone())?;
    let size = window.inner_size();
    let mut gpu = pollster::block_on(Renderer::new(&instance, surface, size.width, size.height))?;

    let mut cursor = Vec2::ZERO;
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
                let logical = size.to_logical::<f32>(window.scale_factor());
                state.on_resize(logical.width, logical.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(window.scale_factor());
                cursor = Vec2::new(p.x, p.y);
                state.on_pointer_move(cursor);
            }
            WindowEvent::CursorLeft { .. } => state.on_pointer_leave(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if state.on_pointer_down(cursor) {
                    log::debug!("[input] hotspot clicked");
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let Key::Character(c) = &event.logical_key {
                        if c.as_str().eq_ignore_ascii_case("h") {
                            state.toggle_hotspot_visible();
                        }
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            state.tick(now - last_frame);
            last_frame = now;
            let next = after_render(gpu.render(&state));
            if next == AfterFrame::Reconfigure {
                gpu.reconfigure();
            }
            if next.keeps_drawing() {
                window.request_redraw();
            } else {
                elwt.exit();
            }
        }
        _ => {}
    })?;
    Ok(())
}
