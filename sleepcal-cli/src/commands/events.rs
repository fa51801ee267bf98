use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use sleepcal_core::config::{SleepcalConfig, expand_path};
use sleepcal_core::store::CalendarStore;

pub fn run(config: &SleepcalConfig, output: Option<PathBuf>) -> Result<()> {
    let path = output
        .map(|p| expand_path(&p))
        .unwrap_or_else(|| config.output_path());

    if !path.exists() {
        println!("No calendar at {} yet. Run `sleepcal sync` first.", path.display());
        return Ok(());
    }

    let store = CalendarStore::new(&path, config.metadata());
    let (calendar, _) = store.load();

    println!("{}", path.display().to_string().bold());

    if calendar.is_empty() {
        println!("   {}", "No events".dimmed());
        return Ok(());
    }

    for event in &calendar.events {
        let start = event
            .start
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(no start)".to_string());
        println!(
            "   {}  {}  {}",
            start.dimmed(),
            event.title(),
            event.uid.dimmed()
        );
    }

    println!("\n{} events", calendar.len());

    Ok(())
}
