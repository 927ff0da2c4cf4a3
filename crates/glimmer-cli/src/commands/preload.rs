use anyhow::{Context, Result};
use glimmer_runtime::ClientContext;
use std::time::Instant;

pub fn run(config: &str) -> Result<()> {
    let config = super::load_config(Some(config))?;
    println!(
        "Preloading {} atlas directories from {}",
        config.texture_directories.len(),
        config.asset_root.display()
    );
    let context = ClientContext::new(config).context("Failed to set up client")?;

    let start = Instant::now();
    let mut steps = 0u32;
    while !context.is_loaded() {
        let progress = context.load_step();
        steps += 1;
        println!("  [{:>3.0}%] step {}", progress * 100.0, steps);
    }

    println!("Loaded in {} steps ({:.1?})", steps, start.elapsed());
    Ok(())
}
