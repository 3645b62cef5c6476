mod demand_table;
mod developed;
mod population;
mod report;

use crate::error::DemandError;
use crate::models::DevelopedCells;

pub use demand_table::{write_demand_table, write_demand_table_to};
pub use developed::{
    developed_from_zonal_reports, parse_zonal_statistics, read_developed_csv,
    read_developed_csv_from_bytes, CsvDeveloped, ZonalReports,
};
pub use population::{read_population, read_population_from_bytes};
pub use report::{report_json, write_report, FitReport, SubregionReport};

/// A source of developed-cell counts per subregion.
pub trait DevelopedSource {
    /// Load counts; `observed_times` is the number of observed population times.
    fn load(&self, observed_times: usize) -> Result<DevelopedCells, DemandError>;
}

/// Resolve a field separator given by name (`comma`, `tab`, `pipe`, `space`,
/// `semicolon`) or as a single character (`\t` is accepted for tab).
pub fn parse_separator(name: &str) -> Result<u8, DemandError> {
    match name.to_lowercase().as_str() {
        "comma" => Ok(b','),
        "tab" | "\\t" => Ok(b'\t'),
        "pipe" => Ok(b'|'),
        "space" => Ok(b' '),
        "semicolon" => Ok(b';'),
        _ => match name.as_bytes() {
            [b] if *b != b'\n' && *b != b'"' => Ok(*b),
            _ => Err(DemandError::ParseError(format!(
                "Unsupported separator: '{name}'. Use comma, tab, pipe, space, semicolon or a single character"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_separators() {
        assert_eq!(parse_separator("comma").unwrap(), b',');
        assert_eq!(parse_separator("TAB").unwrap(), b'\t');
        assert_eq!(parse_separator("\\t").unwrap(), b'\t');
        assert_eq!(parse_separator("pipe").unwrap(), b'|');
        assert_eq!(parse_separator("space").unwrap(), b' ');
        assert_eq!(parse_separator("semicolon").unwrap(), b';');
    }

    #[test]
    fn test_literal_separator() {
        assert_eq!(parse_separator(",").unwrap(), b',');
        assert_eq!(parse_separator(":").unwrap(), b':');
    }

    #[test]
    fn test_invalid_separator() {
        assert!(parse_separator("::").is_err());
        assert!(parse_separator("").is_err());
        assert!(parse_separator("\n").is_err());
    }

    #[test]
    fn test_csv_source_trait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("developed.csv");
        std::fs::write(&path, "subregion;2000;2005;2010\n7;1;2;3\n").unwrap();
        let source: &dyn DevelopedSource = &CsvDeveloped {
            path,
            separator: b';',
        };
        let cells = source.load(3).unwrap();
        assert_eq!(cells.get("7"), Some(&[1, 2, 3][..]));
    }
}
