//! ABR explorer CLI - enumerate, transcode and score candidate ladder rungs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use abr_explorer::{
    naming, AnalysisModel, CommandQualityAnalyzer, CommandTemplate, CommandTranscoder,
    Concurrency, Explorer, ExplorerConfig, FsArtifactStore, LadderDefaults, Resolution,
    RunReport, VariableGrid,
};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::style;
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the explorer.
#[derive(Parser, Debug)]
#[command(name = "abr-explorer")]
#[command(version)]
#[command(about = "Explore an ABR encoding ladder by transcoding and scoring every candidate")]
#[command(long_about = "Generates every (resolution, bitrate, option) candidate allowed by the\n\
    configured constraints, transcodes each one and scores it with the requested\n\
    VMAF models. Quality artifacts are grouped per model.\n\n\
    EXAMPLES:\n    \
    abr-explorer plan --resolution 1280x720 --bitrates 900000,1500000\n    \
    abr-explorer run -i reference.y4m --model hd --model phone\n    \
    abr-explorer run -i reference.y4m --var preset=fast,slow --sequential --json")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the candidates a run would process
    Plan(ExploreArgs),
    /// Transcode and score every candidate
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Reference video
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with `transcoder` and/or `analyzer` command templates
    #[arg(long)]
    pipeline: Option<PathBuf>,

    #[command(flatten)]
    explore: ExploreArgs,
}

#[derive(Args, Debug)]
struct ExploreArgs {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving variants and quality artifacts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Analysis model (hd, hd-neg, uhd4k, phone); repeatable
    #[arg(short, long = "model")]
    models: Vec<AnalysisModel>,

    /// Candidate bitrates in bps, comma separated
    #[arg(long, value_delimiter = ',')]
    bitrates: Vec<u64>,

    /// Resolution as WxH with optional :MIN-MAX window; repeatable
    #[arg(short, long = "resolution")]
    resolutions: Vec<Resolution>,

    /// Option grid as NAME=V1,V2; repeatable, expanded in order. Replaces a
    /// configured grid of the same name
    #[arg(long = "var", value_parser = parse_grid)]
    variables: Vec<VariableGrid>,

    /// Process one candidate and one model at a time
    #[arg(long)]
    sequential: bool,

    /// Score existing outputs without transcoding
    #[arg(long)]
    skip_transcode: bool,

    /// Reuse outputs that already exist
    #[arg(long)]
    skip_existing: bool,
}

impl ExploreArgs {
    fn resolve(&self) -> anyhow::Result<ExplorerConfig> {
        let mut config = match &self.config {
            Some(path) => ExplorerConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExplorerConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if !self.models.is_empty() {
            config.models = self.models.clone();
        }
        if !self.bitrates.is_empty() {
            config.bitrates = self.bitrates.clone();
        }
        if !self.resolutions.is_empty() {
            config.resolutions = self.resolutions.clone();
        }
        for grid in &self.variables {
            config.set_variable(grid.clone());
        }
        if self.sequential {
            config.concurrency = Concurrency::Sequential;
        }
        config.skip_transcode |= self.skip_transcode;
        config.skip_existing |= self.skip_existing;

        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}

fn parse_grid(s: &str) -> Result<VariableGrid, String> {
    let (name, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=V1,V2 but got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{s}`"));
    }
    let values: Vec<&str> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(format!("variable `{name}` has no values"));
    }
    Ok(VariableGrid::new(name, values))
}

/// Command templates overriding the ffmpeg defaults.
#[derive(Debug, Default, Deserialize)]
struct PipelineFile {
    transcoder: Option<CommandTemplate>,
    analyzer: Option<CommandTemplate>,
}

fn load_pipeline(path: Option<&Path>) -> anyhow::Result<PipelineFile> {
    let Some(path) = path else {
        return Ok(PipelineFile::default());
    };
    let data =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn build_explorer(config: ExplorerConfig, pipeline: PipelineFile) -> anyhow::Result<Explorer> {
    let transcoder = pipeline
        .transcoder
        .map(CommandTranscoder::new)
        .unwrap_or_default();
    let analyzer = pipeline
        .analyzer
        .map(CommandQualityAnalyzer::new)
        .unwrap_or_default();

    Ok(Explorer::new(
        config,
        LadderDefaults::default(),
        Arc::new(transcoder),
        Arc::new(analyzer),
        Arc::new(FsArtifactStore),
    )?)
}

fn print_header() {
    println!(
        "{} {}",
        style("abr-explorer").cyan().bold(),
        style(format!("v{}", abr_explorer::VERSION)).dim()
    );
}

fn plan(args: &ExploreArgs, json: bool) -> anyhow::Result<()> {
    let config = args.resolve()?;
    let explorer = build_explorer(config, PipelineFile::default())?;
    let candidates = explorer.plan();
    let output_dir = &explorer.config().output_dir;

    if json {
        let entries: Vec<_> = candidates
            .iter()
            .map(|c| {
                serde_json::json!({
                    "candidate": c,
                    "output": naming::output_path(output_dir, c),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    print_header();
    println!();
    for candidate in &candidates {
        println!(
            "  {:<28} {}",
            style(candidate.to_string()).white(),
            style(naming::output_path(output_dir, candidate).display()).dim()
        );
    }
    println!();
    println!("  {} candidate(s)", style(candidates.len()).green().bold());
    Ok(())
}

async fn run(args: &RunArgs, json: bool) -> anyhow::Result<RunReport> {
    if !args.input.exists() {
        bail!("reference {} does not exist", args.input.display());
    }
    let config = args.explore.resolve()?;
    let pipeline = load_pipeline(args.pipeline.as_deref())?;
    let explorer = build_explorer(config, pipeline)?;

    if !json {
        print_header();
        println!();
        println!("  Reference:    {}", style(args.input.display()).white());
        println!(
            "  Output dir:   {}",
            style(explorer.config().output_dir.display()).white()
        );
        println!(
            "  Mode:         {}",
            style(format!("{:?}", explorer.config().concurrency).to_lowercase()).white()
        );
        println!();
    }

    let report = explorer
        .run(&args.input)
        .await
        .with_context(|| format!("exploring {}", args.input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

fn print_report(report: &RunReport) {
    println!("{}", style("Exploration Complete:").cyan().bold());
    println!("  Candidates:   {}", report.candidates);
    println!("  Transcoded:   {}", report.transcoded);
    println!("  Reused:       {}", report.reused);
    println!("  Succeeded:    {}", style(report.succeeded()).green());
    if !report.failures.is_empty() {
        println!("  Failed:       {}", style(report.failures.len()).red());
    }

    for (model, files) in &report.results {
        println!();
        println!("  {} ({} artifact(s))", style(model).yellow().bold(), files.len());
        for file in files {
            println!("    {}", file.display());
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").red().bold());
        for failure in &report.failures {
            println!(
                "  [{}] {}: {}",
                failure.stage,
                failure.output.display(),
                failure.message
            );
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Plan(args) => plan(args, cli.json),
        Command::Run(args) => {
            let report = run(args, cli.json).await?;
            if !report.is_complete() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
