use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use sleepcal_core::config::SleepcalConfig;

pub fn run(config: &SleepcalConfig, config_override: Option<&Path>) -> Result<()> {
    let config_path = match config_override {
        Some(path) => path.to_path_buf(),
        None => SleepcalConfig::config_path().map_err(|e| anyhow::anyhow!(e))?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:    {}", config_path.display());
    println!("  Calendar:  {}", config.output_path().display());
    println!();
    println!("{}", "Effective configuration".bold());

    let rendered = config.to_toml().map_err(|e| anyhow::anyhow!(e))?;
    for line in rendered.lines() {
        println!("  {}", line);
    }

    if config.oura_token.is_none() {
        println!();
        println!(
            "{}",
            "No Oura token configured. Set oura_token in the config file or OURA_TOKEN.".yellow()
        );
    }

    Ok(())
}
