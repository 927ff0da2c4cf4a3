use anyhow::{Context, Result};
use glimmer_core::Location;
use glimmer_particles::{ParticleEmitter, WeatherState};
use glimmer_runtime::ClientContext;
use std::sync::Arc;

pub struct SmokeArgs {
    pub frames: u32,
    pub delta: u32,
    pub wind: i32,
    pub config: Option<String>,
}

pub fn run(args: SmokeArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let context = ClientContext::new(config).context("Failed to set up client")?;
    while !context.is_loaded() {
        context.load_step();
    }

    let grid = super::flat_grid(&context);
    let weather = Arc::new(WeatherState::raining(0, args.wind));
    let smoke = context.add_smoke(Location::new(0, 0, 0), weather, grid.clone(), 1);

    println!(
        "Smoke: wind {}, {} frames of {} ms, {}",
        args.wind,
        args.frames,
        args.delta,
        if smoke.read().has_texture() { "textured" } else { "untextured" }
    );

    let stats = super::run_frames(&context, args.frames, args.delta, || grid.particle_count());
    stats.print();
    println!("Live puffs:      {}", smoke.read().particle_count());
    Ok(())
}
