mod config;
mod ollama;
mod report;
mod runner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ctxbench_core::{word_count, Dataset};

use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::runner::RunSettings;

#[derive(Parser)]
#[command(
    name = "ctxbench",
    version,
    about = "Context curation benchmark - full vs curated context for local LLMs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the config file for a single invocation.
#[derive(Args, Default)]
struct Overrides {
    /// Directory with conversation.json, questions.json, threads.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output path for the experiment record
    #[arg(long)]
    out: Option<PathBuf>,

    /// Model identifier to query
    #[arg(short, long)]
    model: Option<String>,

    /// Repetitions per (question, condition) pair
    #[arg(short, long)]
    runs: Option<usize>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Chat endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-condition experiment
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Load and validate the dataset without running any trials
    Check {
        /// Directory with conversation.json, questions.json, threads.json
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show dataset statistics (turn and word counts per thread)
    Stats {
        /// Directory with conversation.json, questions.json, threads.json
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { overrides } => cmd_run(overrides),
        Commands::Check { data_dir } => cmd_check(data_dir),
        Commands::Stats { data_dir } => cmd_stats(data_dir),
        Commands::Config => cmd_config(),
    }
}

/// Merge CLI overrides into the file/default config.
fn resolve_config(mut config: Config, overrides: Overrides) -> Result<Config> {
    if let Some(d) = overrides.data_dir {
        config.experiment.data_dir = d.to_string_lossy().into_owned();
    }
    if let Some(o) = overrides.out {
        config.experiment.results_path = o.to_string_lossy().into_owned();
    }
    if let Some(m) = overrides.model {
        config.model.name = m;
    }
    if let Some(r) = overrides.runs {
        config.experiment.runs = r;
    }
    if let Some(t) = overrides.temperature {
        config.model.temperature = t;
    }
    if let Some(e) = overrides.endpoint {
        config.model.endpoint = e;
    }
    config.validate()?;
    Ok(config)
}

fn load_dataset(config: &Config) -> Result<Dataset> {
    let dir = PathBuf::from(&config.experiment.data_dir);
    Dataset::load(&dir).with_context(|| format!("loading dataset from {}", dir.display()))
}

fn cmd_run(overrides: Overrides) -> Result<()> {
    let config = resolve_config(config::load_config()?, overrides)?;
    let dataset = load_dataset(&config)?;

    let client = OllamaClient::new(&config.model);
    let settings = RunSettings {
        model: config.model.name.clone(),
        runs: config.experiment.runs,
        temperature: config.model.temperature,
    };

    report::print_run_header(&settings.model, &dataset, settings.runs, settings.temperature);
    let record = runner::run_experiment(&dataset, &client, &settings);
    report::print_report(&dataset, &record);

    let out_path = PathBuf::from(&config.experiment.results_path);
    record
        .save(&out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;
    println!("\nRaw results saved to {}", out_path.display());

    Ok(())
}

fn cmd_check(data_dir: Option<PathBuf>) -> Result<()> {
    let overrides = Overrides {
        data_dir,
        ..Default::default()
    };
    let config = resolve_config(config::load_config()?, overrides)?;
    let dataset = load_dataset(&config)?;
    println!(
        "OK: {} turns, {} questions, {} threads",
        dataset.conversation.len(),
        dataset.questions.len(),
        dataset.threads.len()
    );
    Ok(())
}

fn cmd_stats(data_dir: Option<PathBuf>) -> Result<()> {
    let overrides = Overrides {
        data_dir,
        ..Default::default()
    };
    let config = resolve_config(config::load_config()?, overrides)?;
    let dataset = load_dataset(&config)?;

    println!(
        "Conversation: {} turns, ~{} words",
        dataset.conversation.len(),
        word_count(&dataset.conversation)
    );
    println!();
    println!("{:<20} {:>6} {:>8} {:>10}", "Thread", "Turns", "Words", "Questions");
    for (name, turns) in &dataset.threads {
        let question_count = dataset
            .questions
            .iter()
            .filter(|q| &q.thread == name)
            .count();
        println!(
            "{:<20} {:>6} {:>8} {:>10}",
            name,
            turns.len(),
            word_count(turns),
            question_count
        );
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = config::load_config()?;
    println!("Config file: {}", config::show_config_path());
    println!();
    println!("[model]");
    println!("name = {:?}", config.model.name);
    println!("endpoint = {:?}", config.model.endpoint);
    println!("temperature = {}", config.model.temperature);
    println!("num_predict = {}", config.model.num_predict);
    println!("timeout_secs = {}", config.model.timeout_secs);
    println!();
    println!("[experiment]");
    println!("runs = {}", config.experiment.runs);
    println!("data_dir = {:?}", config.experiment.data_dir);
    println!("results_path = {:?}", config.experiment.results_path);
    Ok(())
}
