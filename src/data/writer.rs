use std::io::Write;
use std::path::Path;

use super::model::Dataset;

/// Write the dataset as CSV: header row first, no index column.
pub fn write_csv(dataset: &Dataset, path: &Path) -> csv::Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_records(dataset, writer)
}

/// Same as [`write_csv`] but into an arbitrary sink.
pub fn write_to<W: Write>(dataset: &Dataset, sink: W) -> csv::Result<()> {
    write_records(dataset, csv::Writer::from_writer(sink))
}

fn write_records<W: Write>(dataset: &Dataset, mut writer: csv::Writer<W>) -> csv::Result<()> {
    writer.write_record(dataset.headers())?;
    for row in &dataset.rows {
        let cells = dataset.record(row);
        writer.write_record(cells.iter().map(|c| c.as_bytes()))?;
    }
    writer.flush()?;
    Ok(())
}
