pub mod atlas;
pub mod preload;
pub mod rain;
pub mod smoke;

use anyhow::{Context, Result};
use glimmer_core::{Location, Rectangle};
use glimmer_graphics::{DrawCommand, RecordingGraphics};
use glimmer_particles::TileGrid;
use glimmer_runtime::{ClientConfig, ClientContext, FrameClock};
use glimmer_scene::HeadlessContainer;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Load the config file if one was given, otherwise use defaults
pub fn load_config(path: Option<&str>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config '{}'", path)),
        None => Ok(ClientConfig::default()),
    }
}

/// A flat map around the origin with its pools attached to the scene
pub fn flat_grid(context: &ClientContext) -> Arc<TileGrid> {
    let grid = Arc::new(TileGrid::flat(
        context.recycler().clone(),
        Location::new(0, 0, 0),
        Rectangle::from_edges(-10, -10, 11, 11),
    ));
    let attached = context.attach_pools(grid.pools());
    log::debug!("Attached {} tile pools", attached);
    grid
}

/// Draw calls and particle counts gathered over a headless run
#[derive(Debug, Default)]
pub struct RunStats {
    pub frames: u64,
    pub elapsed_ms: u64,
    pub peak_particles: usize,
    pub lines: usize,
    pub textures: usize,
    pub rects: usize,
}

impl RunStats {
    fn record(&mut self, g: &RecordingGraphics) {
        for command in g.commands() {
            match command {
                DrawCommand::Line { .. } => self.lines += 1,
                DrawCommand::Texture { .. } => self.textures += 1,
                DrawCommand::FillRect { .. } => self.rects += 1,
            }
        }
    }

    pub fn print(&self) {
        let calls = self.lines + self.textures + self.rects;
        println!();
        println!("Frames:          {} ({} ms)", self.frames, self.elapsed_ms);
        println!("Peak particles:  {}", self.peak_particles);
        println!(
            "Draw calls:      {} (lines {}, textures {}, rects {})",
            calls, self.lines, self.textures, self.rects
        );
        if self.frames > 0 {
            println!("Calls per frame: {:.1}", calls as f64 / self.frames as f64);
        }
    }
}

/// Update and render the context's scene for `frames` fixed-length frames.
/// `live` reports the particle count after each update.
pub fn run_frames(
    context: &ClientContext,
    frames: u32,
    delta: u32,
    mut live: impl FnMut() -> usize,
) -> RunStats {
    let viewport = context.config().viewport;
    let container = HeadlessContainer::new(viewport.width, viewport.height);
    let mut clock = FrameClock::new();
    let mut g = RecordingGraphics::new();
    let mut stats = RunStats::default();
    let report_every = (frames / 10).max(1);

    for frame in 1..=frames {
        let delta_ms = clock.advance(Duration::from_millis(delta as u64));
        context.scene().update(&container, delta_ms);
        context.scene().render(&mut g, 0, 0);

        let count = live();
        stats.peak_particles = stats.peak_particles.max(count);
        stats.record(&g);
        if frame % report_every == 0 || frame == frames {
            println!("  frame {:>5}: {:>5} particles, {:>5} draw calls", frame, count, g.len());
        }
        g.clear();
    }

    stats.frames = clock.frame;
    stats.elapsed_ms = clock.total_ms;
    stats
}
