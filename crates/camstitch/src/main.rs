//! Dash-cam stitcher binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camstitch::{
    list_input_files, summary_table, Grouper, Planner, Renderer, ScanOutcome, StitchConfig,
};
use camstitch_media::{check_ffmpeg, check_ffprobe, Encoder, FfmpegRunner, Ffprobe};

#[derive(Parser)]
#[command(
    name = "camstitch",
    version,
    about = "Group dash-cam clips into sessions and render front/back picture-in-picture videos"
)]
struct Cli {
    /// Directory holding the clips (overrides CAMSTITCH_INPUT_DIR)
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Directory receiving batch and final videos (overrides CAMSTITCH_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group the input directory and print the summary table
    Scan {
        /// Print the groups as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print every FFmpeg command a render would run, without running it
    Plan,
    /// Render every group after confirmation
    Render,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = StitchConfig::from_env();
    if let Some(dir) = cli.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let result = match cli.cmd {
        Commands::Scan { json } => scan(&config, json).await,
        Commands::Plan => plan(&config).await,
        Commands::Render => render(&config).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("camstitch=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

/// List, probe and group the input directory.
async fn load_groups(config: &StitchConfig) -> Result<ScanOutcome> {
    check_ffprobe(&config.ffprobe_path)?;

    let files = list_input_files(&config.input_dir).await?;
    info!(
        input_dir = %config.input_dir.display(),
        files = files.len(),
        "Scanning clips"
    );

    let grouper = Grouper::from_config(Ffprobe::new(config.ffprobe_path.clone()), config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} {wide_bar:.cyan/blue} {pos}/{len}")
            .context("invalid progress template")?,
    );
    pb.set_message("Loading clips");

    let mut outcome = grouper
        .group(files, |path| {
            pb.set_message(format!(
                "Loading clips ({})",
                path.file_name().unwrap_or_default().to_string_lossy()
            ));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    let planner = Planner::from_config(config);
    for group in &mut outcome.groups {
        let output = planner.final_output(group);
        if tokio::fs::try_exists(&output).await? {
            group.final_output = Some(output);
        }
    }

    if !outcome.skipped.is_empty() {
        warn!(skipped = outcome.skipped.len(), "Some files were not grouped");
    }
    info!(groups = outcome.groups.len(), "Scan complete");

    Ok(outcome)
}

async fn scan(config: &StitchConfig, json: bool) -> Result<ExitCode> {
    let outcome = load_groups(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.groups)?);
    } else {
        println!("{}", summary_table(&outcome.groups));
    }
    for skipped in &outcome.skipped {
        println!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    Ok(ExitCode::SUCCESS)
}

async fn plan(config: &StitchConfig) -> Result<ExitCode> {
    let outcome = load_groups(config).await?;
    let planner = Planner::from_config(config);
    let runner = FfmpegRunner::new().with_program(config.ffmpeg_path.clone());

    for group in &outcome.groups {
        let plan = planner.plan(group);
        println!("# {}", plan.title);
        if let Some(output) = &group.final_output {
            println!("# already rendered: {}", output.display());
            continue;
        }
        if plan.dropped_front > 0 || plan.dropped_back > 0 {
            println!(
                "# missing pair: {} front and {} back clips dropped",
                plan.dropped_front, plan.dropped_back
            );
        }
        for cmd in plan.commands() {
            println!("{}", runner.describe(cmd));
        }
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

async fn render(config: &StitchConfig) -> Result<ExitCode> {
    check_ffmpeg(&config.ffmpeg_path)?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let mut outcome = load_groups(config).await?;
    println!("{}", summary_table(&outcome.groups));

    if outcome.groups.is_empty() {
        info!("Nothing to render");
        return Ok(ExitCode::SUCCESS);
    }

    let proceed = Confirm::new()
        .with_prompt(format!("Render {} groups?", outcome.groups.len()))
        .default(false)
        .interact()?;
    if !proceed {
        info!("Render cancelled");
        return Ok(ExitCode::SUCCESS);
    }

    let runner = FfmpegRunner::new()
        .with_program(config.ffmpeg_path.clone())
        .with_capture(config.capture_output);
    let renderer = Renderer::new(runner, Planner::from_config(config));

    let pb = ProgressBar::new(outcome.groups.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} groups",
        )
        .context("invalid progress template")?,
    );
    let summary = renderer
        .render_all(&mut outcome.groups, |_| pb.inc(1))
        .await;
    pb.finish_and_clear();

    println!("{}", summary_table(&outcome.groups));
    info!(
        rendered = summary.rendered,
        skipped = summary.skipped,
        empty = summary.empty,
        failed = summary.failed.len(),
        "Render finished"
    );

    if summary.has_failures() {
        for (_, e) in &summary.failed {
            eprintln!("{}\n", e.report());
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
