use std::path::PathBuf;

use anyhow::Context;
use citywx_core::{RunSummary, Settings, config, pipeline};
use clap::{Parser, Subcommand};
use inquire::Password;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "citywx",
    version,
    about = "Daily weather snapshot (CSV + temperature chart) for major Japanese cities"
)]
pub struct Cli {
    /// Project root holding `.env`, `citywx.toml` and the `output` directory.
    #[arg(long, env = "CITYWX_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    /// OpenWeather API key; takes precedence over the one stored in `.env`.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch today's weather and write the CSV and chart.
    Run,

    /// Store the OpenWeather API key in the project's `.env` file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Run) {
            Command::Run => {
                tracing::info!(root = %self.root.display(), "Starting snapshot run");
                let settings = Settings::load(&self.root)?;
                let summary = pipeline::execute(&self.root, self.api_key, &settings).await?;
                print_summary(&summary);
            }
            Command::Configure => {
                let api_key = Password::new("OpenWeather API key:")
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                let path = config::save_api_key(&self.root, &api_key)?;
                println!("Saved {} to {}", config::API_KEY_VAR, path.display());
            }
        }

        Ok(())
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Fetched weather for {} cities", summary.rows);
    for bar in &summary.chart.bars {
        println!("  {:<12} {:>6.1} ℃", bar.label, bar.height);
    }
    println!("CSV:   {}", summary.csv_path.display());
    println!("Chart: {}", summary.chart_path.display());
}
