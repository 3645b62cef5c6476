use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::DemandError;

/// Identifier of a spatial zone. Integer zone ids are kept as their decimal text
/// so they line up with population table headers.
pub type SubregionId = String;

/// An ordered sequence of `(time, value)` observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, checking that both sides have the same length and are finite.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, DemandError> {
        if times.len() != values.len() {
            return Err(DemandError::ValidationError(format!(
                "Time series has {} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if times.iter().chain(values.iter()).any(|v| !v.is_finite()) {
            return Err(DemandError::ValidationError(
                "Time series contains non-finite values".to_string(),
            ));
        }
        Ok(Self { times, values })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Join two series and order the result by time.
    ///
    /// The sort is stable, so equal times keep `self` before `other`.
    pub fn concat(&self, other: &TimeSeries) -> TimeSeries {
        let mut pairs: Vec<(f64, f64)> = self
            .times
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .chain(other.times.iter().copied().zip(other.values.iter().copied()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, values) = pairs.into_iter().unzip();
        TimeSeries { times, values }
    }
}

/// Population per subregion, keyed by a time column.
///
/// `header[0]` is the time column name; `header[1..]` are the subregion ids in
/// the order they appear in the source, which is the authoritative column order
/// of the demand table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationTable {
    header: Vec<String>,
    times: Vec<f64>,
    columns: HashMap<SubregionId, Vec<f64>>,
}

impl PopulationTable {
    /// Build a table from its header, time column and per-subregion columns.
    pub fn new(
        header: Vec<String>,
        times: Vec<f64>,
        columns: HashMap<SubregionId, Vec<f64>>,
    ) -> Result<Self, DemandError> {
        if header.is_empty() {
            return Err(DemandError::ValidationError(
                "Population table needs at least a time column".to_string(),
            ));
        }
        for id in &header[1..] {
            let column = columns.get(id).ok_or_else(|| DemandError::missing(id, "population"))?;
            if column.len() != times.len() {
                return Err(DemandError::CountMismatch(format!(
                    "Population column '{id}' has {} values but the table has {} times",
                    column.len(),
                    times.len()
                )));
            }
        }
        Ok(Self {
            header,
            times,
            columns,
        })
    }

    /// Full header, time column first.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn time_column(&self) -> &str {
        &self.header[0]
    }

    /// Subregion ids in source order.
    pub fn subregions(&self) -> &[String] {
        &self.header[1..]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn series(&self, subregion: &str) -> Option<&[f64]> {
        self.columns.get(subregion).map(Vec::as_slice)
    }

    /// The `(time, population)` series of one subregion.
    pub fn time_series(&self, subregion: &str) -> Option<TimeSeries> {
        self.series(subregion).map(|values| TimeSeries {
            times: self.times.clone(),
            values: values.to_vec(),
        })
    }

    pub fn contains(&self, subregion: &str) -> bool {
        self.columns.contains_key(subregion)
    }
}

/// Developed-cell counts per subregion, one entry per observed time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopedCells {
    counts: BTreeMap<SubregionId, Vec<u64>>,
}

impl DevelopedCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation for a subregion.
    pub fn push(&mut self, subregion: impl Into<SubregionId>, cells: u64) {
        self.counts.entry(subregion.into()).or_default().push(cells);
    }

    /// Replace the full count series of a subregion.
    pub fn insert(&mut self, subregion: impl Into<SubregionId>, cells: Vec<u64>) {
        self.counts.insert(subregion.into(), cells);
    }

    pub fn get(&self, subregion: &str) -> Option<&[u64]> {
        self.counts.get(subregion).map(Vec::as_slice)
    }

    /// Subregion ids in sorted order.
    pub fn subregions(&self) -> impl Iterator<Item = &SubregionId> {
        self.counts.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubregionId, &Vec<u64>)> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(SubregionId, Vec<u64>)> for DevelopedCells {
    fn from_iter<I: IntoIterator<Item = (SubregionId, Vec<u64>)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
