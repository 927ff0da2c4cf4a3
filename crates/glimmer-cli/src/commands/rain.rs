use anyhow::{Context, Result};
use glimmer_particles::{ParticleEmitter, WeatherState};
use glimmer_runtime::ClientContext;
use std::sync::Arc;

pub struct RainArgs {
    pub strength: i32,
    pub wind: i32,
    pub frames: u32,
    pub delta: u32,
    pub overlay: bool,
    pub config: Option<String>,
}

pub fn run(args: RainArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let context = ClientContext::new(config).context("Failed to set up client")?;
    let weather = Arc::new(WeatherState::raining(args.strength, args.wind));

    println!(
        "{} rain: strength {}, wind {}, {} frames of {} ms",
        if args.overlay { "Overlay" } else { "Volumetric" },
        args.strength,
        args.wind,
        args.frames,
        args.delta
    );

    let stats = if args.overlay {
        let rain = context.add_overlay_rain(weather, 1);
        let stats = super::run_frames(&context, args.frames, args.delta, || {
            rain.read().particle_count()
        });
        println!("Rendering rain:  {}", rain.read().is_rendering_rain());
        stats
    } else {
        let grid = super::flat_grid(&context);
        let rain = context.add_weather_rain(weather, grid.clone(), 1);
        let stats = super::run_frames(&context, args.frames, args.delta, || grid.particle_count());
        println!("Rendering rain:  {}", rain.read().is_rendering_rain());
        stats
    };

    stats.print();
    println!("Free particles:  {}", context.recycler().free_count());
    Ok(())
}
