use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use seo_research::{MorphologyConfig, Paper};

#[derive(Parser)]
#[command(
    name = "seo-research",
    about = "Run keyphrase and readability researches over a document",
    version
)]
struct Cli {
    /// Paper JSON files to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// JSON file with extra locale rules; entries override the built-in ones
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Only run these researches (repeatable), e.g. --research keywordCountInUrl
    #[arg(long = "research")]
    researches: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(rules: Option<&PathBuf>) -> Result<MorphologyConfig> {
    let builtin = MorphologyConfig::builtin();
    let Some(path) = rules else {
        return Ok(builtin);
    };
    let extra = MorphologyConfig::from_path(path)
        .with_context(|| format!("loading locale rules from {}", path.display()))?;
    let config = builtin.merged_with(extra);
    debug!(
        locales = ?config.locales().collect::<Vec<_>>(),
        "loaded locale rules"
    );
    Ok(config)
}

fn run(input: &str, source: &str, config: &MorphologyConfig, researches: &[String]) -> Result<()> {
    let paper: Paper =
        serde_json::from_str(input).with_context(|| format!("parsing paper from {source}"))?;
    let report = if researches.is_empty() {
        seo_research::analyze(&paper, config)?
    } else {
        seo_research::analyze_selected(&paper, config, researches)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.rules.as_ref())?;

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        run(&input, "stdin", &config, &cli.researches)?;
    } else {
        for path in &cli.files {
            let input = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            run(&input, &path.display().to_string(), &config, &cli.researches)?;
        }
    }
    Ok(())
}
