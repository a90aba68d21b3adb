//! Writers for a finished [`WeatherTable`](crate::model::WeatherTable).

pub mod chart;
pub mod csv_writer;

pub use chart::{Bar, BarChart, ChartLabels, Typeface};
pub use csv_writer::write_csv;
