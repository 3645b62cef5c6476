use std::collections::BTreeMap;

use crate::error::DemandError;
use crate::models::{DemandTable, DemandVector, SubregionId};

/// Lay demand vectors out in the population table's column order.
///
/// `header` is the full source header with the time column first. One row is
/// produced per `simulation_times[1..]`; subregions without a vector (for
/// example zones absent from the zonal statistics) get 0.
pub fn assemble_table(
    header: &[String],
    simulation_times: &[f64],
    demand: &BTreeMap<SubregionId, DemandVector>,
) -> Result<DemandTable, DemandError> {
    if header.is_empty() {
        return Err(DemandError::ValidationError(
            "Demand table header needs a time column".to_string(),
        ));
    }
    let intervals = simulation_times.len().saturating_sub(1);
    if let Some(v) = demand.values().find(|v| v.len() != intervals) {
        return Err(DemandError::CountMismatch(format!(
            "Subregion {} has {} demand values for {intervals} simulation intervals",
            v.subregion,
            v.len()
        )));
    }

    let rows = (0..intervals)
        .map(|i| {
            header[1..]
                .iter()
                .map(|sub| demand.get(sub).map_or(0, |v| v.cells[i]))
                .collect()
        })
        .collect();

    Ok(DemandTable {
        steps: simulation_times.len(),
        header: header.to_vec(),
        times: simulation_times
            .iter()
            .skip(1)
            .map(|t| t.trunc() as i64)
            .collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["year".into(), "3".into(), "1".into(), "2".into()]
    }

    fn demand() -> BTreeMap<SubregionId, DemandVector> {
        let mut map = BTreeMap::new();
        map.insert(
            "1".to_string(),
            DemandVector {
                subregion: "1".into(),
                cells: vec![5, 6],
            },
        );
        map.insert(
            "3".to_string(),
            DemandVector {
                subregion: "3".into(),
                cells: vec![7, 8],
            },
        );
        map
    }

    #[test]
    fn test_rows_follow_header_order() {
        let table = assemble_table(&header(), &[2010.0, 2020.0, 2030.0], &demand()).unwrap();
        assert_eq!(table.rows, vec![vec![7, 5, 0], vec![8, 6, 0]]);
        assert_eq!(table.times, vec![2020, 2030]);
        assert_eq!(table.steps, 3);
    }

    #[test]
    fn test_dimensions() {
        let table = assemble_table(&header(), &[2010.0, 2020.0, 2030.0], &demand()).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 4);
        for line in table.to_tsv().lines().skip(2) {
            assert_eq!(line.split('\t').count(), 4);
        }
    }

    #[test]
    fn test_unknown_subregion_is_zero() {
        let table = assemble_table(&header(), &[2010.0, 2020.0, 2030.0], &demand()).unwrap();
        assert_eq!(table.value(0, "2"), Some(0));
        assert_eq!(table.value(1, "2"), Some(0));
    }

    #[test]
    fn test_fractional_times_truncate() {
        let table = assemble_table(&header(), &[2010.0, 2020.7, 2030.2], &demand()).unwrap();
        assert_eq!(table.times, vec![2020, 2030]);
    }

    #[test]
    fn test_vector_length_mismatch() {
        let result = assemble_table(&header(), &[2010.0, 2020.0], &demand());
        assert!(matches!(result, Err(DemandError::CountMismatch(_))));
    }

    #[test]
    fn test_empty_header_is_error() {
        assert!(assemble_table(&[], &[2010.0, 2020.0], &BTreeMap::new()).is_err());
    }
}
