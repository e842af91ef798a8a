use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "timeline_app",
    version,
    about = "Collect posts from a timeline page into a CSV file"
)]
pub struct Cli {
    /// Saved timeline page to collect from.
    #[arg(long, value_name = "FILE", required_unless_present = "url", conflicts_with = "url")]
    pub page: Option<PathBuf>,

    /// Saved detail page that opening a post may lead to: FILE, or URL=FILE
    /// to register it under an explicit address. Repeatable.
    #[arg(long = "detail", value_name = "[URL=]FILE", value_parser = parse_detail)]
    pub details: Vec<DetailPage>,

    /// Live timeline to open in Chromium (needs the `browser` feature).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub headed: bool,

    /// Wait for the expected element instead of sleeping a fixed time.
    #[arg(long)]
    pub poll: bool,

    #[arg(long, value_name = "FILE", default_value = "collector_settings.ron")]
    pub settings: PathBuf,

    /// Directory the CSV export is written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Mirror the log to the terminal.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub url: Option<String>,
    pub path: PathBuf,
}

fn parse_detail(value: &str) -> Result<DetailPage, String> {
    let (url, path) = match value.rsplit_once('=') {
        Some((url, path)) if url.contains("://") => (Some(url.to_string()), path),
        _ => (None, value),
    };
    if path.trim().is_empty() {
        return Err(format!("missing file in {value:?}"));
    }
    Ok(DetailPage {
        url,
        path: PathBuf::from(path),
    })
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level {value:?}"))
}
