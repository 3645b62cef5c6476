use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DemandError;
use crate::models::{DevelopedCells, SubregionId};

use super::DevelopedSource;

/// Parse one developed-cell count; zonal sums of binary maps may be printed as floats.
fn parse_cells(field: &str) -> Option<u64> {
    let field = field.trim();
    field.parse::<u64>().ok().or_else(|| {
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.trunc() as u64)
    })
}

fn parse_developed_csv<R: Read>(rdr: &mut csv::Reader<R>) -> Result<DevelopedCells, DemandError> {
    let mut cells = DevelopedCells::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        let subregion = fields
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DemandError::ParseError(format!("Row {}: missing subregion id", row + 1)))?;
        if cells.get(subregion).is_some() {
            return Err(DemandError::ParseError(format!(
                "Subregion {subregion} appears more than once"
            )));
        }
        let counts = fields
            .map(|f| {
                parse_cells(f).ok_or_else(|| {
                    DemandError::ParseError(format!(
                        "Subregion {subregion}: '{f}' is not a developed-cell count"
                    ))
                })
            })
            .collect::<Result<Vec<u64>, _>>()?;
        cells.insert(subregion, counts);
    }
    Ok(cells)
}

fn csv_builder(separator: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .delimiter(separator)
        .comment(Some(b'#'))
        .trim(csv::Trim::All);
    builder
}

/// Read developed-cell counts from a wide table: one row per subregion, the
/// subregion id first, then one count per observed time.
pub fn read_developed_csv(path: impl AsRef<Path>, separator: u8) -> Result<DevelopedCells, DemandError> {
    let mut rdr = csv_builder(separator).from_path(path.as_ref())?;
    parse_developed_csv(&mut rdr)
}

/// Read a wide developed-cell table from bytes.
pub fn read_developed_csv_from_bytes(data: &[u8], separator: u8) -> Result<DevelopedCells, DemandError> {
    let mut rdr = csv_builder(separator).from_reader(data);
    parse_developed_csv(&mut rdr)
}

/// Parse a pipe-separated zonal statistics report (`r.univar -t` layout).
///
/// The header line starts with `zone`; the developed-cell count of each zone
/// is its `sum` column, since development maps are binary.
pub fn parse_zonal_statistics(text: &str) -> Result<Vec<(SubregionId, u64)>, DemandError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| DemandError::ParseError("Empty zonal statistics report".to_string()))?;
    let columns: Vec<&str> = header.split('|').map(str::trim).collect();
    if columns.first() != Some(&"zone") {
        return Err(DemandError::ParseError(format!(
            "Zonal statistics header must start with 'zone', got '{header}'"
        )));
    }
    let sum_idx = columns.iter().position(|c| *c == "sum").ok_or_else(|| {
        DemandError::ParseError("Zonal statistics report has no 'sum' column".to_string())
    })?;

    lines
        .enumerate()
        .map(|(i, line)| {
            let fields: Vec<&str> = line.split('|').collect();
            let zone = fields[0].trim();
            let cells = fields.get(sum_idx).and_then(|f| parse_cells(f)).ok_or_else(|| {
                DemandError::ParseError(format!(
                    "Zonal statistics line {}: no valid 'sum' for zone '{zone}'",
                    i + 2
                ))
            })?;
            Ok((zone.to_string(), cells))
        })
        .collect()
}

/// Combine per-time zonal statistics reports, oldest first, into developed-cell series.
pub fn developed_from_zonal_reports<S: AsRef<str>>(
    reports: &[S],
    observed_times: usize,
) -> Result<DevelopedCells, DemandError> {
    if reports.len() != observed_times {
        return Err(DemandError::CountMismatch(format!(
            "{} development reports do not correspond to {observed_times} observed times",
            reports.len()
        )));
    }
    let mut cells = DevelopedCells::new();
    for (i, report) in reports.iter().enumerate() {
        let zones = parse_zonal_statistics(report.as_ref())?;
        debug!(report = i, zones = zones.len(), "parsed zonal statistics");
        for (zone, count) in zones {
            cells.push(zone, count);
        }
    }
    Ok(cells)
}

/// Developed cells from a wide CSV table.
pub struct CsvDeveloped {
    pub path: PathBuf,
    pub separator: u8,
}

impl DevelopedSource for CsvDeveloped {
    fn load(&self, _observed_times: usize) -> Result<DevelopedCells, DemandError> {
        read_developed_csv(&self.path, self.separator)
    }
}

/// Developed cells from one zonal statistics report per observed time.
pub struct ZonalReports {
    pub paths: Vec<PathBuf>,
}

impl DevelopedSource for ZonalReports {
    fn load(&self, observed_times: usize) -> Result<DevelopedCells, DemandError> {
        let reports = self
            .paths
            .iter()
            .map(std::fs::read_to_string)
            .collect::<Result<Vec<String>, _>>()?;
        developed_from_zonal_reports(&reports, observed_times)
    }
}
