// Licensed under the Apache-2.0 license

mod bloat;
mod build;
mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { release } => {
            println!("Building firmware...");
            build::build_firmware(release)?;
            println!("Build complete!");
        }
        Commands::Bloat {
            release,
            format,
            report,
        } => match report {
            Some(dir) => bloat::generate_report(release, &dir)?,
            None => bloat::analyze_bloat(release, format)?,
        },
    }

    Ok(())
}
