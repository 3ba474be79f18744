//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$CTXBENCH_CONFIG` environment variable
//! 2. `~/.config/ctxbench/config.toml`
//! 3. Built-in defaults (everything is optional)
//!
//! CLI flags override whatever the file provides; the merged values are
//! what the runner sees. Defaults reproduce the original experiment
//! constants.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub experiment: ExperimentConfig,
}

/// Model endpoint settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub endpoint: String,
    pub temperature: f32,
    /// Maximum output length passed as Ollama's `num_predict`.
    pub num_predict: u32,
    /// Per-query timeout. One slow trial fails alone; the loop continues.
    pub timeout_secs: u64,
}

/// Experiment loop settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Repetitions per (question, condition) pair.
    pub runs: usize,
    /// Directory holding conversation.json, questions.json, threads.json.
    pub data_dir: String,
    /// Where the experiment record lands. Overwritten on every run.
    pub results_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "llama3.1:latest".into(),
            endpoint: "http://localhost:11434/api/chat".into(),
            temperature: 0.1,
            num_predict: 150,
            timeout_secs: 120,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            runs: 3,
            data_dir: ".".into(),
            results_path: "results.json".into(),
        }
    }
}

impl Config {
    /// Reject values the runner cannot work with. Startup-tier: callers
    /// exit with the diagnostic, no trials run.
    pub fn validate(&self) -> Result<()> {
        if self.experiment.runs == 0 {
            bail!("experiment.runs must be at least 1");
        }
        if self.model.name.is_empty() {
            bail!("model.name must not be empty");
        }
        Ok(())
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("CTXBENCH_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/ctxbench/config.toml
    if let Some(home) = dirs_home() {
        let p = home.join(".config").join("ctxbench").join("config.toml");
        return Some(p);
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `ctxbench config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
