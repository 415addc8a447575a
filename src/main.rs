use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use sealgen::{render_seal_document, SealConfig};

/// Render an official seal to an SVG file
#[derive(Parser, Debug)]
#[command(name = "sealgen", version, about)]
struct Args {
    /// JSON seal configuration.  Any fields it leaves out take their default values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the SVG (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the default configuration as JSON, then exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", SealConfig::default().to_json()?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Couldn't read config file {}", path.display()))?;
            SealConfig::from_json(&json)
                .with_context(|| format!("Couldn't parse config file {}", path.display()))?
        }
        None => SealConfig::default(),
    };
    config.validate()?;

    let svg = render_seal_document(&config);
    match &args.output {
        Some(path) => {
            std::fs::write(path, svg)
                .with_context(|| format!("Couldn't write SVG to {}", path.display()))?;
            info!("Wrote seal to {}", path.display());
        }
        None => println!("{}", svg),
    }
    Ok(())
}
