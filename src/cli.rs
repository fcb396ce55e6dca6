//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StudyError;
use crate::domain::ranking::RankedModel;
use crate::domain::study::{self, PreparedData, StudyConfig};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "fxstudy",
    about = "Walk-forward feature-bag study for exchange-rate regression"
)]
pub struct Cli {
    /// Log verbosity: error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full study and print the ranking
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Dataset CSV; overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of ranked bags to print (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top: Option<u64>,
        /// Ranking CSV; overrides [report] output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load, clean and engineer the dataset without fitting models
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Validate a study configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_logging(level: Level) {
    // A subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.log_level);
    let result = match cli.command {
        Command::Run {
            config,
            data,
            seed,
            top,
            output,
        } => run_study(&config, data, seed, top, output),
        Command::Inspect { config, data } => run_inspect(&config, data),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StudyError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Reads and validates the study settings, applying the data path override.
pub fn build_study_config(
    config_path: &Path,
    data_override: Option<PathBuf>,
) -> Result<StudyConfig, StudyError> {
    let adapter = load_config(config_path)?;
    let mut config = StudyConfig::from_config(&adapter)?;
    if data_override.is_some() {
        config.data_path = data_override;
    }
    Ok(config)
}

fn dataset_for(config: &StudyConfig) -> Result<CsvAdapter, StudyError> {
    let path = config.data_path.clone().ok_or_else(|| StudyError::ConfigMissing {
        section: "data".into(),
        key: "path".into(),
    })?;
    Ok(CsvAdapter::new(path)
        .with_date_column(config.date_column.clone())
        .with_date_format(config.date_format.clone()))
}

fn run_study(
    config_path: &Path,
    data: Option<PathBuf>,
    seed: Option<u64>,
    top: Option<u64>,
    output: Option<PathBuf>,
) -> Result<(), StudyError> {
    let mut config = build_study_config(config_path, data)?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(top) = top {
        config.top = top as usize;
    }
    if output.is_some() {
        config.output = output;
    }

    let dataset = dataset_for(&config)?;
    let outcome = study::run_study(&dataset, &config)?;

    println!(
        "{} bags x {} windows ({} rows, {} candidate features)",
        outcome.results.len(),
        outcome.prepared.windows.len(),
        outcome.prepared.table.row_count(),
        outcome.prepared.candidates.len()
    );
    print!("{}", format_ranking(outcome.top(config.top)));

    if let Some(path) = &config.output {
        CsvReportAdapter.write(&outcome.ranking, path)?;
        info!(path = %path.display(), rows = outcome.ranking.len(), "ranking written");
    }
    Ok(())
}

fn run_inspect(config_path: &Path, data: Option<PathBuf>) -> Result<(), StudyError> {
    let config = build_study_config(config_path, data)?;
    let dataset = dataset_for(&config)?;
    let prepared = study::prepare(&dataset, &config)?;
    print!("{}", format_inspection(&prepared));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StudyError> {
    let adapter = load_config(config_path)?;
    let config = StudyConfig::from_config(&adapter)?;
    println!("Configuration is valid: {}", config_path.display());
    println!(
        "  windows: train={} test={} offset={} max={}",
        config.windows.train,
        config.windows.test,
        config.windows.offset,
        config
            .windows
            .max_windows
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".into())
    );
    println!(
        "  bags: {} random of {} features (seed {}), {} baselines",
        config.random_count,
        config.bag_size,
        config.seed,
        config.baselines.len()
    );
    Ok(())
}

pub fn format_ranking(ranking: &[RankedModel]) -> String {
    let bag_width = ranking
        .iter()
        .map(|m| m.bag.len())
        .chain(std::iter::once(3))
        .max()
        .unwrap_or(3);
    let mut out = format!(
        "{:>4}  {:<bw$}  {:<14}  {:>10}  {:>8}  features\n",
        "rank",
        "bag",
        "family",
        "r2",
        "alpha",
        bw = bag_width
    );
    for m in ranking {
        let alpha = m.alpha.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:>4}  {:<bw$}  {:<14}  {:>10.6}  {:>8}  {}\n",
            m.rank,
            m.bag,
            m.family.to_string(),
            m.r2,
            alpha,
            m.features.join(", "),
            bw = bag_width
        ));
    }
    out
}

pub fn format_inspection(prepared: &PreparedData) -> String {
    let mut out = String::new();
    out.push_str(&format!("rows loaded:      {}\n", prepared.loaded_rows));
    out.push_str(&format!("rows removed:     {}\n", prepared.removed_rows));
    out.push_str(&format!("rows remaining:   {}\n", prepared.table.row_count()));
    out.push_str(&format!("windows:          {}\n", prepared.windows.len()));
    out.push_str(&format!("dropped columns:  {}\n", prepared.cleaning.dropped.len()));
    for d in &prepared.cleaning.dropped {
        out.push_str(&format!("  {} ({})\n", d.name, d.reason));
    }
    out.push_str(&format!("candidate features: {}\n", prepared.candidates.len()));
    for c in &prepared.candidates {
        out.push_str(&format!("  {}\n", c));
    }
    out
}
