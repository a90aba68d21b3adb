use std::time::Duration;

use tracing::info;

use crate::{date::RunDate, error::Result, model::WeatherRecord, provider::WeatherProvider};

/// Cities requested on every run, in table order.
pub const TARGET_CITIES: [&str; 12] = [
    "Tokyo", "Osaka", "Nagoya", "Sapporo", "Kyoto", "Fukuoka", "Yokohama", "Sendai", "Chiba",
    "Maebashi", "Shizuoka", "Naha",
];

/// Fetch one record per city, one request at a time and in order.
///
/// Sleeps `delay` between successive requests. Stops at the first failure,
/// so callers never see a partial list.
pub async fn fetch_records(
    provider: &dyn WeatherProvider,
    cities: &[&str],
    date: &RunDate,
    delay: Duration,
) -> Result<Vec<WeatherRecord>> {
    info!(cities = cities.len(), "Fetching current weather");

    let mut records = Vec::with_capacity(cities.len());
    for (i, city) in cities.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!(city, "Fetching weather");
        let observation = provider.current(city).await?;
        records.push(WeatherRecord::new(date, observation));
    }

    info!(records = records.len(), "Finished fetching weather");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use reqwest::StatusCode;

    use super::*;
    use crate::{error::SnapshotError, model::Observation};

    /// Answers from memory and remembers what it was asked.
    #[derive(Debug, Default)]
    struct FakeProvider {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    }

    impl FakeProvider {
        fn called(&self) -> Vec<String> {
            self.calls
                .lock()
                .expect("lock")
                .iter()
                .map(|(city, _)| city.clone())
                .collect()
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, city: &str) -> Result<Observation> {
            self.calls
                .lock()
                .expect("lock")
                .push((city.to_string(), tokio::time::Instant::now()));

            if self.fail_on == Some(city) {
                return Err(SnapshotError::HttpStatus {
                    city: city.to_string(),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }

            Ok(Observation {
                location_name: city.to_uppercase(),
                condition: "曇りがち".to_string(),
                temperature_c: city.len() as f64,
                humidity_pct: 50,
                wind_speed_mps: 1.5,
                feels_like_c: 0.0,
                temp_min_c: 0.0,
                temp_max_c: 0.0,
            })
        }
    }

    fn run_date() -> RunDate {
        RunDate::from_date(NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"))
    }

    #[test]
    fn target_cities_are_fixed() {
        assert_eq!(TARGET_CITIES.len(), 12);
        assert_eq!(TARGET_CITIES.first(), Some(&"Tokyo"));
        assert_eq!(TARGET_CITIES.last(), Some(&"Naha"));
    }

    #[tokio::test]
    async fn one_record_per_city_in_request_order() {
        let provider = FakeProvider::default();
        let cities = ["Sendai", "Kyoto", "Naha"];

        let records = fetch_records(&provider, &cities, &run_date(), Duration::ZERO)
            .await
            .expect("fetch");

        assert_eq!(provider.called(), vec!["Sendai", "Kyoto", "Naha"]);
        let names: Vec<_> = records.iter().map(|r| r.city_name.as_str()).collect();
        assert_eq!(names, vec!["SENDAI", "KYOTO", "NAHA"]);
        assert!(records.iter().all(|r| r.date == "2024/01/15"));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let provider = FakeProvider {
            fail_on: Some("Osaka"),
            ..FakeProvider::default()
        };

        let err = fetch_records(
            &provider,
            &["Tokyo", "Osaka", "Nagoya"],
            &run_date(),
            Duration::ZERO,
        )
        .await
        .unwrap_err();

        assert!(err.is_network());
        assert_eq!(provider.called(), vec!["Tokyo", "Osaka"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_only_between_requests() {
        let provider = FakeProvider::default();
        let start = tokio::time::Instant::now();

        fetch_records(
            &provider,
            &["Tokyo", "Osaka", "Nagoya"],
            &run_date(),
            Duration::from_secs(1),
        )
        .await
        .expect("fetch");

        let calls = provider.calls.lock().expect("lock");
        let offsets: Vec<_> = calls.iter().map(|(_, at)| *at - start).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2)
            ]
        );
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn no_cities_no_requests() {
        let provider = FakeProvider::default();
        let records = fetch_records(&provider, &[], &run_date(), Duration::from_secs(1))
            .await
            .expect("fetch");

        assert!(records.is_empty());
        assert!(provider.called().is_empty());
    }
}
