use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use grid_snake::config::{Settings, log_filter};
use grid_snake::render::Renderer;
use grid_snake::{Game, GameError, GameStatus, LevelRegistry, StopReason, Vector2D};

fn load_registry(settings: &Settings) -> Result<LevelRegistry> {
    let mut registry = LevelRegistry::builtin()?;
    if let Some(path) = &settings.levels {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading level table {}", path.display()))?;
        registry
            .register_json(&json)
            .with_context(|| format!("loading levels from {}", path.display()))?;
    }
    Ok(registry)
}

fn any_pressed(input: &WinitInputHelper, keys: &[VirtualKeyCode]) -> bool {
    keys.iter().any(|k| input.key_pressed(*k))
}

fn requested_direction(input: &WinitInputHelper) -> Option<Vector2D> {
    use winit::event::VirtualKeyCode::*;

    if any_pressed(input, &[W, Up, Numpad8]) {
        Some(Vector2D::UP)
    } else if any_pressed(input, &[S, Down, Numpad5]) {
        Some(Vector2D::DOWN)
    } else if any_pressed(input, &[A, Left, Numpad4]) {
        Some(Vector2D::LEFT)
    } else if any_pressed(input, &[D, Right, Numpad6]) {
        Some(Vector2D::RIGHT)
    } else {
        None
    }
}

fn report(err: &GameError) {
    tracing::error!(kind = %err.kind(), "game aborted: {err}");
}

fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::parse();
    settings.validate()?;
    let frame_interval = settings.frame_interval()?;
    let registry = load_registry(&settings)?;
    let renderer = Renderer::new(settings.cell_size, registry.max_board_size());

    let mut game = Game::new(settings.seed)
        .with_snake_period(settings.period)?
        .with_board_verification(settings.verify_board);
    game.init(&registry, Some(&settings.level))
        .with_context(|| format!("starting level {}", settings.level))?;

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title("Grid Snake")
        .with_inner_size(LogicalSize::new(renderer.width(), renderer.height()))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(renderer.width(), renderer.height(), surface_texture)?
    };

    tracing::info!(
        level = %settings.level,
        frame_ms = frame_interval.as_millis() as u64,
        period = settings.period,
        "window ready"
    );

    let mut direction = Vector2D::ZERO;
    let mut fatal = false;
    let mut last_frame = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let frame = pixels.frame_mut();
            match game.snapshot() {
                Ok(snap) if !fatal => renderer.draw(frame, &snap),
                _ => renderer.draw_error(frame),
            }
            if let Err(err) = pixels.render() {
                tracing::error!("render failed: {err}");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape)
                || input.close_requested()
                || input.destroyed()
            {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if let Some(dir) = requested_direction(&input) {
                direction = dir;
            }

            if input.key_pressed(VirtualKeyCode::Space) && !fatal {
                let result = match (game.status(), game.stop_reason()) {
                    (GameStatus::Running, _) => game.pause(),
                    (GameStatus::Stopped, StopReason::Paused) => game.resume(),
                    (GameStatus::Stopped, StopReason::Preparing) => game.start(),
                    _ => Ok(()),
                };
                if let Err(err) = result {
                    report(&err);
                    fatal = true;
                }
            }

            let stopped_for_good = game.status() == GameStatus::Stopped
                && game.stop_reason() != StopReason::Paused;
            let can_restart = fatal || stopped_for_good;
            let next_level = can_restart && input.key_pressed(VirtualKeyCode::N);
            if next_level || (can_restart && input.key_pressed(VirtualKeyCode::R)) {
                let level_id = if next_level {
                    game.level()
                        .ok()
                        .and_then(|l| registry.next_id(l.id()))
                        .map(str::to_owned)
                } else {
                    None
                };
                direction = Vector2D::ZERO;
                match game.restart(&registry, level_id.as_deref()) {
                    Ok(()) => fatal = false,
                    Err(err) => {
                        report(&err);
                        fatal = true;
                    }
                }
            }

            let elapsed = last_frame.elapsed();
            if !fatal && elapsed >= frame_interval {
                let behind = elapsed - frame_interval;
                if behind > frame_interval {
                    tracing::debug!(
                        behind_ms = behind.as_millis() as u64,
                        "frame loop running behind"
                    );
                }
                last_frame = Instant::now();
                if let Err(err) = game.update(direction) {
                    report(&err);
                    fatal = true;
                }
            }

            window.request_redraw();
        }
    });
}
