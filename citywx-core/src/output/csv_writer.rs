use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    error::{Result, SnapshotError},
    model::WeatherTable,
};

/// Lets spreadsheet tools detect UTF-8 when opening the file.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `table` to `path`, replacing any existing file.
pub fn write_csv(table: &WeatherTable, path: &Path) -> Result<PathBuf> {
    info!(path = %path.display(), rows = table.len(), "Writing CSV");

    let csv_err = |source| SnapshotError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(|e| SnapshotError::io(path, e))?;
    file.write_all(UTF8_BOM)
        .map_err(|e| SnapshotError::io(path, e))?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    wtr.write_record(WeatherTable::COLUMNS).map_err(csv_err)?;
    for record in table.records() {
        wtr.serialize(record).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| SnapshotError::io(path, e))?;

    Ok(path.to_path_buf())
}
