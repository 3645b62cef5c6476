use std::io::Write;
use std::path::Path;

use crate::error::DemandError;
use crate::models::DemandTable;

/// Write a demand table as tab-separated text to any writer.
pub fn write_demand_table_to<W: Write>(table: &DemandTable, mut out: W) -> Result<(), DemandError> {
    out.write_all(table.to_tsv().as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Write a demand table to a file.
pub fn write_demand_table(table: &DemandTable, path: impl AsRef<Path>) -> Result<(), DemandError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_demand_table_to(table, std::io::BufWriter::new(file))
}
