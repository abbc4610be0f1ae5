// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about = "Developer tasks for the atmega-ddk firmware", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-build the firmware for the ATmega328P
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Show where the firmware's flash goes
    Bloat {
        #[arg(long)]
        release: bool,

        #[arg(long, value_enum, default_value_t = BloatFormat::Table)]
        format: BloatFormat,

        /// Write function, crate and build-time reports into this directory
        #[arg(long)]
        report: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BloatFormat {
    Table,
    Json,
    Csv,
}
