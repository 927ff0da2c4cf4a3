//! Glimmer CLI - atlas inspection and headless effect runs

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{atlas, preload, rain, smoke};

#[derive(Parser)]
#[command(name = "glimmer")]
#[command(about = "Texture atlas and particle effect tooling for the Glimmer client")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pages and sprites of an atlas directory
    Atlas {
        /// Directory holding atlas-N.png / atlas-N.xml pages
        dir: String,

        /// Print sprite rectangles as well as names
        #[arg(long)]
        verbose: bool,
    },

    /// Load every configured atlas page, reporting progress
    Preload {
        /// Client config file
        #[arg(long, default_value = "glimmer.toml")]
        config: String,
    },

    /// Run rain in a headless scene and print statistics
    Rain {
        /// Precipitation strength (0-100)
        #[arg(long, default_value = "60", value_parser = parse_percent)]
        strength: i32,

        /// Wind (-100 to 100)
        #[arg(long, default_value = "0", allow_hyphen_values = true, value_parser = parse_wind)]
        wind: i32,

        /// Number of frames to simulate
        #[arg(long, default_value = "200")]
        frames: u32,

        /// Milliseconds per frame
        #[arg(long, default_value = "20")]
        delta: u32,

        /// Use screen-space overlay rain instead of volumetric rain
        #[arg(long)]
        overlay: bool,

        /// Client config file with tunable overrides
        #[arg(long)]
        config: Option<String>,
    },

    /// Run a smoke emitter in a headless scene and print statistics
    Smoke {
        /// Number of frames to simulate
        #[arg(long, default_value = "200")]
        frames: u32,

        /// Milliseconds per frame
        #[arg(long, default_value = "20")]
        delta: u32,

        /// Wind (-100 to 100)
        #[arg(long, default_value = "0", allow_hyphen_values = true, value_parser = parse_wind)]
        wind: i32,

        /// Client config file with tunable overrides
        #[arg(long)]
        config: Option<String>,
    },
}

fn parse_percent(s: &str) -> Result<i32, String> {
    let value: i32 = s.trim().parse().map_err(|e| format!("invalid number: {}", e))?;
    if !(0..=100).contains(&value) {
        return Err(format!("expected 0 to 100, got {}", value));
    }
    Ok(value)
}

fn parse_wind(s: &str) -> Result<i32, String> {
    let value: i32 = s.trim().parse().map_err(|e| format!("invalid number: {}", e))?;
    if !(-100..=100).contains(&value) {
        return Err(format!("expected -100 to 100, got {}", value));
    }
    Ok(value)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Atlas { dir, verbose } => atlas::run(&dir, verbose),
        Commands::Preload { config } => preload::run(&config),
        Commands::Rain {
            strength,
            wind,
            frames,
            delta,
            overlay,
            config,
        } => rain::run(rain::RainArgs {
            strength,
            wind,
            frames,
            delta,
            overlay,
            config,
        }),
        Commands::Smoke {
            frames,
            delta,
            wind,
            config,
        } => smoke::run(smoke::SmokeArgs {
            frames,
            delta,
            wind,
            config,
        }),
    }
}
