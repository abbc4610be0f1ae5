// Licensed under the Apache-2.0 license

use anyhow::{Context, Result};

use crate::build::firmware_cargo;
use crate::cli::BloatFormat;

const INSTALL_HINT: &str =
    "Failed to run cargo bloat - make sure it's installed with 'cargo install cargo-bloat'";

/// Run cargo bloat on the firmware and print the result.
pub fn analyze_bloat(release: bool, format: BloatFormat) -> Result<()> {
    println!("Running binary size analysis...");

    let mut cmd = firmware_cargo("bloat", release);
    match format {
        BloatFormat::Table => {}
        BloatFormat::Json => {
            cmd.arg("--message-format=json");
        }
        BloatFormat::Csv => {
            cmd.arg("--format=csv");
        }
    }

    let output = cmd.output().context(INSTALL_HINT)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("cargo bloat failed: {}", stderr);
    }

    print!("{}", String::from_utf8_lossy(&output.stdout));
    Ok(())
}

/// Write per-function, per-crate and build-time reports into `output_dir`.
pub fn generate_report(release: bool, output_dir: &str) -> Result<()> {
    println!("Generating binary size report...");

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;

    let reports: [(&str, &[&str]); 3] = [
        ("functions", &["-n", "50"]),
        ("crates", &["--crates"]),
        ("time", &["--time"]),
    ];

    for (name, flags) in reports {
        let output_file = format!("{}/bloat_{}.txt", output_dir, name);

        let output = firmware_cargo("bloat", release)
            .args(flags)
            .output()
            .context(INSTALL_HINT)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("cargo bloat ({}) failed: {}", name, stderr);
        }

        std::fs::write(&output_file, &output.stdout)
            .with_context(|| format!("Failed to write report to {}", output_file))?;
        println!("Generated {}", output_file);
    }

    println!("Binary size report generated in {}", output_dir);
    Ok(())
}
