use serde::Serialize;

use crate::date::RunDate;

/// Current conditions for one city as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Canonical name returned by the provider, which may differ from the query.
    pub location_name: String,
    pub condition: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
}

/// One city snapshot for the run date.
///
/// Field order is the column order of the written table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub date: String,
    pub city_name: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
}

impl WeatherRecord {
    pub fn new(date: &RunDate, observation: Observation) -> Self {
        Self {
            date: date.display(),
            city_name: observation.location_name,
            description: observation.condition,
            temperature_c: observation.temperature_c,
            humidity_pct: observation.humidity_pct,
            wind_speed_ms: observation.wind_speed_mps,
            feels_like_c: observation.feels_like_c,
            temp_min_c: observation.temp_min_c,
            temp_max_c: observation.temp_max_c,
        }
    }
}

/// Rows are cities in request order, columns are [`WeatherTable::COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTable {
    records: Vec<WeatherRecord>,
}

impl WeatherTable {
    pub const COLUMNS: [&'static str; 9] = [
        "日付",
        "都市名",
        "天気",
        "気温(℃)",
        "湿度(%)",
        "風速(m/s)",
        "体感温度(℃)",
        "最低気温(℃)",
        "最高気温(℃)",
    ];

    pub fn from_records(records: Vec<WeatherRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.city_name.as_str())
    }

    pub fn temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.temperature_c)
    }
}
