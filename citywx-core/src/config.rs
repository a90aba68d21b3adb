use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    date::RunDate,
    error::{Result, SnapshotError},
};

/// Name of the credential in `.env` and in the process environment.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const ENV_FILE: &str = ".env";
pub const SETTINGS_FILE: &str = "citywx.toml";
pub const OUTPUT_DIR: &str = "output";

/// Optional tuning read from `<root>/citywx.toml`.
///
/// Example TOML:
/// ```toml
/// lang = "ja"
/// request_delay_ms = 1000
/// chart_font = "Noto Sans CJK JP"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Endpoint root; `/weather` is appended for current conditions.
    pub base_url: String,
    pub lang: String,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    /// Font family for chart text. It must draw Japanese; unset means
    /// pick an installed Japanese family.
    pub chart_font: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            lang: "ja".to_string(),
            request_delay_ms: 1000,
            timeout_secs: 10,
            chart_font: None,
        }
    }
}

impl Settings {
    /// Load settings from `root`, or return defaults if the file doesn't exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| SnapshotError::io(&path, e))?;

        toml::from_str(&contents).map_err(|e| {
            SnapshotError::Configuration(format!(
                "Failed to parse settings file {}: {e}",
                path.display()
            ))
        })
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ensure `<root>/output` exists and return its path.
pub fn prepare_output_dir(root: &Path) -> Result<PathBuf> {
    let output_dir = root.join(OUTPUT_DIR);
    fs::create_dir_all(&output_dir).map_err(|e| SnapshotError::io(&output_dir, e))?;
    Ok(output_dir)
}

/// Read the API key from `<root>/.env` without touching the process environment.
pub fn load_api_key(root: &Path) -> Result<String> {
    let path = root.join(ENV_FILE);
    let missing = || {
        SnapshotError::Configuration(format!(
            "{API_KEY_VAR} could not be loaded.\n\
             Hint: run `citywx configure` or add {API_KEY_VAR}=<key> to {}.",
            path.display()
        ))
    };

    if !path.exists() {
        return Err(missing());
    }

    let entries = dotenvy::from_path_iter(&path).map_err(|e| env_file_error(&path, e))?;
    for entry in entries {
        let (key, value) = entry.map_err(|e| env_file_error(&path, e))?;
        if key == API_KEY_VAR {
            let value = value.trim();
            if value.is_empty() {
                return Err(missing());
            }
            return Ok(value.to_string());
        }
    }

    Err(missing())
}

/// Set or replace the API key in `<root>/.env`, keeping every other line.
pub fn save_api_key(root: &Path, api_key: &str) -> Result<PathBuf> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(SnapshotError::Configuration(
            "Refusing to store an empty API key".to_string(),
        ));
    }

    fs::create_dir_all(root).map_err(|e| SnapshotError::io(root, e))?;

    let path = root.join(ENV_FILE);
    let existing = if path.exists() {
        fs::read_to_string(&path).map_err(|e| SnapshotError::io(&path, e))?
    } else {
        String::new()
    };

    let entry = format!("{API_KEY_VAR}={api_key}");
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if is_api_key_line(line) {
                replaced = true;
                entry.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(entry);
    }

    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(&path, contents).map_err(|e| SnapshotError::io(&path, e))?;

    Ok(path)
}

fn is_api_key_line(line: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
    line.strip_prefix(API_KEY_VAR)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

fn env_file_error(path: &Path, err: dotenvy::Error) -> SnapshotError {
    SnapshotError::Configuration(format!("Failed to read {}: {err}", path.display()))
}

/// Per-invocation values, computed once before any network activity.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub api_key: String,
    pub date: RunDate,
}

impl RunContext {
    /// Create the output directory and resolve the credential.
    ///
    /// A non-blank `api_key_override` (from `--api-key` or the environment)
    /// wins over `.env`.
    pub fn prepare(root: &Path, api_key_override: Option<String>, date: RunDate) -> Result<Self> {
        let output_dir = prepare_output_dir(root)?;

        let api_key = match api_key_override
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        {
            Some(key) => key,
            None => load_api_key(root)?,
        };

        Ok(Self {
            root: root.to_path_buf(),
            output_dir,
            api_key,
            date,
        })
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(self.date.csv_file_name())
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(self.date.chart_file_name())
    }
}
