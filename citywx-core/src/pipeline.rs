use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{Builder, NamedTempFile};
use tracing::{info, warn};

use crate::{
    config::{RunContext, Settings},
    date::RunDate,
    error::{Result, SnapshotError},
    fetch::{TARGET_CITIES, fetch_records},
    model::WeatherTable,
    output::{BarChart, Typeface, write_csv},
    provider::{OpenWeatherProvider, WeatherProvider},
};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub csv_path: PathBuf,
    pub chart_path: PathBuf,
    pub chart: BarChart,
}

/// Fetch every city, then write the CSV and the chart.
///
/// Nothing is written until every fetch succeeded, the chart layout is valid
/// and a chart font is resolved. Both files are rendered to hidden staging
/// files in the output directory and only renamed into place once both
/// exist, so a failed run leaves no CSV without its chart.
pub async fn run(
    ctx: &RunContext,
    provider: &dyn WeatherProvider,
    cities: &[&str],
    settings: &Settings,
) -> Result<RunSummary> {
    let records = fetch_records(provider, cities, &ctx.date, settings.request_delay()).await?;
    let table = WeatherTable::from_records(records);
    let chart = BarChart::from_table(&table, &ctx.date)?;
    let typeface = Typeface::resolve(settings.chart_font.as_deref())?;

    let staged_csv = stage(&ctx.output_dir, ".csv")?;
    let staged_png = stage(&ctx.output_dir, ".png")?;
    write_csv(&table, staged_csv.path())?;
    chart.render_png(staged_png.path(), &typeface)?;

    let chart_path = publish(staged_png, ctx.chart_path())?;
    let csv_path = match publish(staged_csv, ctx.csv_path()) {
        Ok(path) => path,
        Err(err) => {
            if let Err(e) = fs::remove_file(&chart_path) {
                warn!(
                    path = %chart_path.display(),
                    error = %e,
                    "Failed to remove chart after CSV publish failed"
                );
            }
            return Err(err);
        }
    };

    info!(
        rows = table.len(),
        csv = %csv_path.display(),
        chart = %chart_path.display(),
        "Snapshot complete"
    );

    Ok(RunSummary {
        rows: table.len(),
        csv_path,
        chart_path,
        chart,
    })
}

/// Empty staging file in `dir`, removed on drop unless published.
fn stage(dir: &Path, suffix: &str) -> Result<NamedTempFile> {
    Builder::new()
        .prefix(".citywx-")
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| SnapshotError::io(dir, e))
}

/// Rename a staged file over `target`, replacing any earlier output.
fn publish(staged: NamedTempFile, target: PathBuf) -> Result<PathBuf> {
    staged
        .persist(&target)
        .map_err(|e| SnapshotError::io(&target, e.error))?;
    Ok(target)
}

/// Full run for today against OpenWeather with the fixed city list.
///
/// The credential is resolved before the provider is built, so a missing
/// key never reaches the network.
pub async fn execute(
    root: &Path,
    api_key_override: Option<String>,
    settings: &Settings,
) -> Result<RunSummary> {
    let ctx = RunContext::prepare(root, api_key_override, RunDate::today())?;
    let provider = OpenWeatherProvider::new(ctx.api_key.clone(), settings)?;

    run(&ctx, &provider, &TARGET_CITIES, settings).await
}
