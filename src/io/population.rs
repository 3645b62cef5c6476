use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::DemandError;
use crate::models::PopulationTable;

fn reader_builder(separator: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(separator)
        .comment(Some(b'#'))
        .trim(csv::Trim::All);
    builder
}

fn parse_population<R: Read>(rdr: &mut csv::Reader<R>) -> Result<PopulationTable, DemandError> {
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if header.len() < 2 {
        return Err(DemandError::ParseError(
            "Population table needs a time column and at least one subregion column".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = header.iter().find(|h| !seen.insert(h.as_str())) {
        return Err(DemandError::ParseError(format!(
            "Duplicate column '{dup}' in population table"
        )));
    }

    let mut times = Vec::new();
    let mut columns: HashMap<String, Vec<f64>> = header[1..]
        .iter()
        .map(|h| (h.clone(), Vec::new()))
        .collect();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| {
                DemandError::ParseError(format!(
                    "Row {}, column '{}': '{field}' is not a number",
                    row + 1,
                    header[col]
                ))
            })?;
            if !value.is_finite() {
                return Err(DemandError::ParseError(format!(
                    "Row {}, column '{}': value must be finite",
                    row + 1,
                    header[col]
                )));
            }
            if col == 0 {
                times.push(value);
            } else if let Some(column) = columns.get_mut(&header[col]) {
                column.push(value);
            }
        }
    }

    PopulationTable::new(header, times, columns)
}

/// Read a population table from a delimited text file.
///
/// The first column holds times; every other column holds the population of
/// one subregion, named by its header.
pub fn read_population(path: impl AsRef<Path>, separator: u8) -> Result<PopulationTable, DemandError> {
    let mut rdr = reader_builder(separator).from_path(path.as_ref())?;
    parse_population(&mut rdr)
}

/// Read a population table from bytes.
pub fn read_population_from_bytes(data: &[u8], separator: u8) -> Result<PopulationTable, DemandError> {
    let mut rdr = reader_builder(separator).from_reader(data);
    parse_population(&mut rdr)
}
