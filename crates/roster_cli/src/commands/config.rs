use std::path::Path;

use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use roster_core::config::{self, RosterConfig};

use crate::output::Output;

/// Show current configuration
pub fn show(config: &RosterConfig) -> Result<()> {
    let output = Output::new();

    output.section("Current Configuration");
    println!();

    // Display the current config in TOML format
    let toml_str = toml::to_string_pretty(config).into_diagnostic()?;
    println!("{}", toml_str);

    Ok(())
}

/// Save the active configuration to a file
pub async fn save(config: &RosterConfig, path: &Path) -> Result<()> {
    let output = Output::new();

    output.info("Saving configuration to:", &path.display().to_string());
    config::save_config(config, path).await?;

    output.status("Configuration saved");
    println!();
    println!("To use this configuration, run:");
    println!("  {} --config {}", "roster-cli".bright_green(), path.display());

    Ok(())
}
