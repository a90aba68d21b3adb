use chrono::{Local, NaiveDate};

/// The calendar date a run is stamped with, captured once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDate(NaiveDate);

impl RunDate {
    /// Today's date in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// `YYYY/MM/DD`, used in the table and the chart title.
    pub fn display(&self) -> String {
        self.0.format("%Y/%m/%d").to_string()
    }

    /// `YYYYMMDD`, safe for file names.
    pub fn file_stamp(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    pub fn csv_file_name(&self) -> String {
        format!("weather_{}.csv", self.file_stamp())
    }

    pub fn chart_file_name(&self) -> String {
        format!("weather_{}.png", self.file_stamp())
    }
}
