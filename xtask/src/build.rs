// Licensed under the Apache-2.0 license

use anyhow::{Context, Result};
use std::process::Command;

pub const TARGET: &str = "avr-none";
pub const MCU: &str = "atmega328p";
pub const BIN: &str = "atmega-ddk";

/// `cargo +nightly <subcommand>` preset for the firmware binary.
///
/// The AVR target ships without a prebuilt `core`, so it is rebuilt with
/// `-Z build-std`.
pub fn firmware_cargo(subcommand: &str, release: bool) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["+nightly", subcommand])
        .args(["--target", TARGET])
        .args(["-Z", "build-std=core"])
        .args(["--bin", BIN])
        .args(["--features", MCU])
        .env("RUSTFLAGS", format!("-C target-cpu={MCU}"));

    if release {
        cmd.arg("--release");
    }
    cmd
}

pub fn build_firmware(release: bool) -> Result<()> {
    let status = firmware_cargo("build", release)
        .status()
        .context("Failed to run cargo build")?;

    if !status.success() {
        anyhow::bail!("Firmware build failed");
    }

    let profile = if release { "release" } else { "debug" };
    println!("Firmware: target/{TARGET}/{profile}/{BIN}.elf");
    Ok(())
}
