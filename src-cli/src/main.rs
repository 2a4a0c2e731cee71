//! Persona - command line shell for the profile scraping pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use persona_core::{AppConfig, Platform};
use persona_scraper::{EvidenceBundle, ScrapeOrchestrator, ScrapeReport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Each platform's own account, used by `--harness`.
const HARNESS_ACCOUNTS: [(Platform, &str); 4] = [
    (Platform::Instagram, "instagram"),
    (Platform::Twitter, "twitter"),
    (Platform::Tiktok, "tiktok"),
    (Platform::Snapchat, "snapchat"),
];

#[derive(Debug, Parser)]
#[command(name = "persona-scrape")]
#[command(about = "Collect public social profile text as analysis evidence")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/persona/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the scrape report as JSON
    #[arg(long)]
    json: bool,

    /// Scrape each platform's own account instead of the given handles
    #[arg(long)]
    harness: bool,

    /// Print the normalized profile record for each handle
    #[arg(long, conflicts_with = "json")]
    profile: bool,

    /// Notes to include with the scraped evidence
    #[arg(long)]
    notes: Option<String>,

    /// Write the effective config to disk and exit
    #[arg(long)]
    write_config: bool,

    /// Handles to scrape, e.g. instagram=@jane_doe
    #[arg(value_name = "PLATFORM=HANDLE", value_parser = parse_handle)]
    handles: Vec<(Platform, String)>,
}

fn parse_handle(arg: &str) -> std::result::Result<(Platform, String), String> {
    let (platform, handle) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=HANDLE, got '{arg}'"))?;
    let platform = platform.parse::<Platform>().map_err(|e| e.to_string())?;
    Ok((platform, handle.to_string()))
}

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, allow_missing: bool) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) if allow_missing && !path.exists() => AppConfig::default(),
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

fn collect_inputs(handles: Vec<(Platform, String)>, harness: bool) -> BTreeMap<Platform, String> {
    if harness || handles.is_empty() {
        return HARNESS_ACCOUNTS
            .iter()
            .map(|(platform, handle)| (*platform, (*handle).to_string()))
            .collect();
    }
    // Later pairs for the same platform win
    handles.into_iter().collect()
}

fn print_report(report: &ScrapeReport) {
    for result in report.results.values() {
        println!(
            "{:<10} {:<11} {:>6} chars  {}",
            result.platform,
            result.status,
            result.chars,
            result.error.as_deref().unwrap_or("")
        );
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    if cli.write_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => AppConfig::config_path()?,
        };
        config.save_to(&path)?;
        println!("Config written to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    config.validate().context("invalid configuration")?;
    let orchestrator = ScrapeOrchestrator::from_config(&config.scraping)
        .context("set PERSONA_SCRAPE_API_KEY or scraping.api_key")?;
    let inputs = collect_inputs(cli.handles, cli.harness);

    if cli.profile {
        for (platform, handle) in &inputs {
            let profile = orchestrator
                .fetch_profile(*platform, handle)
                .await
                .with_context(|| format!("failed to fetch {platform} profile '{handle}'"))?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        return Ok(ExitCode::SUCCESS);
    }

    info!("Scraping {} platform(s)", inputs.len());
    let report = orchestrator.scrape_all(&inputs).await;
    info!(
        "Scrape finished: {} chars of evidence from {} platform(s)",
        report.total_chars(),
        report.results.len()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    print_report(&report);

    let bundle = EvidenceBundle::from_report(&report).with_notes(cli.notes.unwrap_or_default());
    if !bundle.has_evidence() {
        eprintln!("No evidence collected. Add handles that resolve or pass --notes.");
        return Ok(ExitCode::FAILURE);
    }

    println!();
    println!("{}", bundle.to_context());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.write_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging.filter);
    info!("Starting persona-scrape v{}", env!("CARGO_PKG_VERSION"));

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
