//! Replays a recorded page snapshot through the timing pipeline and prints the
//! events that would be logged.
//!
//! Snapshot format:
//!
//! ```json
//! { "config": { "samplingFactor": 1, "isHttps": true },
//!   "environment": { "userAgent": "...", "timing": { "navigationStart": 100 } } }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nav_timing::{
    PageConfig, PageEnvironment, RecordingSink, ReporterConfig, TimingEvent, TimingReporter,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "timing_replay", about = "Replay a page snapshot through the timing pipeline")]
struct Args {
    /// Path to the snapshot JSON file
    snapshot: PathBuf,

    /// Also fire the post-edit signal
    #[arg(long)]
    post_edit: bool,

    /// Admit the page view regardless of the configured sampling factor
    #[arg(long)]
    force_sample: bool,

    /// Seed for the sampling RNG
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default)]
    environment: PageEnvironment,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.snapshot.display()))?;

    let mut config = PageConfig::from_source(&snapshot.config);
    if args.force_sample {
        config = config.with_sampling_factor(1.0);
    }

    let mut reporter_config = ReporterConfig::new();
    if let Some(seed) = args.seed {
        reporter_config = reporter_config.with_seed(seed);
    }

    let mut reporter = TimingReporter::new(reporter_config, RecordingSink::new())
        .context("Failed to build reporter")?;

    reporter.on_page_load(&config, &snapshot.environment);
    if args.post_edit {
        reporter.on_post_edit(&config, &snapshot.environment);
    }

    let stats = reporter.stats();
    tracing::info!(
        navigation = stats.navigation_events,
        save = stats.save_events,
        sampled_out = stats.sampled_out,
        "replay complete"
    );

    for event in reporter.into_sink().take() {
        println!("{}", render(&event)?);
    }

    Ok(())
}

fn render(event: &TimingEvent) -> Result<String> {
    let line = json!({
        "schema": event.schema().as_str(),
        "event": event.to_value()?,
    });
    Ok(serde_json::to_string_pretty(&line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_VIEW: &str = include_str!("../fixtures/first_view.json");

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["timing_replay", "snap.json", "--post-edit", "--seed", "9"]);
        assert_eq!(args.snapshot, PathBuf::from("snap.json"));
        assert!(args.post_edit);
        assert!(!args.force_sample);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn test_fixture_replays() {
        let snapshot: Snapshot = serde_json::from_str(FIRST_VIEW).unwrap();
        let config = PageConfig::from_source(&snapshot.config);

        let mut reporter =
            TimingReporter::new(ReporterConfig::new().with_seed(1), RecordingSink::new()).unwrap();
        assert!(reporter.on_page_load(&config, &snapshot.environment));
        assert!(reporter.on_post_edit(&config, &snapshot.environment));

        let events = reporter.into_sink().take();
        let rendered: Value = serde_json::from_str(&render(&events[1]).unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({ "schema": "SaveTiming", "event": { "saveTiming": 200, "runtime": "HHVM" } })
        );

        let navigation: Value = serde_json::from_str(&render(&events[0]).unwrap()).unwrap();
        assert_eq!(navigation["schema"], "NavigationTiming");
        assert_eq!(navigation["event"]["appLoadComplete"], 450);
    }
}
