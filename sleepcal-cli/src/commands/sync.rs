use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Deserialize;
use serde_json::Value;
use sleepcal_core::build::EventBuilder;
use sleepcal_core::config::{SleepcalConfig, expand_path};
use sleepcal_core::date_range::DateRange;
use sleepcal_core::store::CalendarStore;
use sleepcal_core::sync::{SyncReport, sync_sessions};

use super::create_spinner;
use crate::oura::OuraClient;

/// Command-line overrides for a sync run
pub struct SyncArgs {
    pub from: Option<String>,
    pub to: Option<String>,
    pub days_back: Option<i64>,
    pub output: Option<PathBuf>,
    pub min_duration: Option<i64>,
    pub input: Option<PathBuf>,
}

/// A sessions dump: either the API response as-is or just its `data` list
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionsFile {
    Response { data: Vec<Value> },
    List(Vec<Value>),
}

pub async fn run(config: &SleepcalConfig, args: SyncArgs) -> Result<()> {
    let output = args
        .output
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(|| config.output_path());

    let min_duration = args
        .min_duration
        .unwrap_or(config.min_sleep_duration_minutes);
    if min_duration < 0 {
        anyhow::bail!("--min-duration must not be negative");
    }
    if args.days_back.is_some_and(|days| days < 0) {
        anyhow::bail!("--days-back must not be negative");
    }

    let records = match args.input {
        Some(ref path) => read_sessions_file(path)?,
        None => fetch_sessions(config, &args).await?,
    };

    if records.is_empty() {
        println!("No sleep data found.");
        return Ok(());
    }

    let store = CalendarStore::new(&output, config.metadata());
    let builder = EventBuilder::new(min_duration, Utc::now());

    let report = sync_sessions(&store, &builder, &records)
        .with_context(|| format!("Failed to write calendar at {}", output.display()))?;

    print_report(&report, &output);

    Ok(())
}

async fn fetch_sessions(config: &SleepcalConfig, args: &SyncArgs) -> Result<Vec<Value>> {
    let days_back = args.days_back.unwrap_or(config.days_back);
    let range = DateRange::from_args(
        args.from.as_deref(),
        args.to.as_deref(),
        Some(days_back),
        Utc::now().date_naive(),
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    let token = config.oura_token.as_deref().context(
        "No Oura access token configured.\n\n\
        Set it in your config file:\n  \
        oura_token = \"...\"\n\n\
        or in the environment:\n  \
        export OURA_TOKEN=...",
    )?;

    let client = OuraClient::new(&config.api_base_url, token)?;

    let spinner = create_spinner(format!(
        "Fetching sleep data {} to {}",
        range.start_param(),
        range.end_param()
    ));
    let result = client.fetch_sleep(&range).await;
    spinner.finish_and_clear();

    result
}

fn read_sessions_file(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sessions file at {}", path.display()))?;

    let file: SessionsFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse sessions file at {}", path.display()))?;

    Ok(match file {
        SessionsFile::Response { data } => data,
        SessionsFile::List(data) => data,
    })
}

fn print_report(report: &SyncReport, output: &Path) {
    println!("{}", output.display().to_string().bold());

    if report.added > 0 {
        println!(
            "   {}",
            format!("+ {} new sleep events", report.added).green()
        );
    } else {
        println!("   {}", "Up to date".dimmed());
    }

    let filtered = report.filtered_count();
    if filtered > 0 || report.duplicates > 0 {
        println!(
            "   {}",
            format!(
                "{} sessions already recorded or too short",
                filtered + report.duplicates
            )
            .dimmed()
        );
    }

    let failed = report.failed_count();
    if failed > 0 {
        println!(
            "   {}",
            format!("{} sessions could not be converted (see warnings above)", failed).yellow()
        );
    }

    println!(
        "\nFetched {} sessions, calendar now has {} events",
        report.fetched, report.total_events
    );
}
