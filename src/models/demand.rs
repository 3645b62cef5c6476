use serde::{Deserialize, Serialize};

use super::SubregionId;

/// Newly demanded developed cells per simulation interval for one subregion.
///
/// `cells[i]` covers the interval ending at `simulation_times[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandVector {
    pub subregion: SubregionId,
    pub cells: Vec<u64>,
}

impl DemandVector {
    pub fn zeros(subregion: impl Into<SubregionId>, len: usize) -> Self {
        Self {
            subregion: subregion.into(),
            cells: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }
}

/// Non-fatal data-quality findings raised while projecting demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DemandWarning {
    /// Some intervals had a negative projected increment and were set to zero.
    NegativeDemandClamped {
        subregion: SubregionId,
        intervals: usize,
    },
    /// The selected curve has a non-positive slope; the whole vector was zeroed.
    InverseRelationship { subregion: SubregionId, slope: f64 },
    /// No requested method could be fitted; the subregion gets zero demand.
    NoViableModel { subregion: SubregionId, reason: String },
}

impl DemandWarning {
    pub fn subregion(&self) -> &str {
        match self {
            DemandWarning::NegativeDemandClamped { subregion, .. }
            | DemandWarning::InverseRelationship { subregion, .. }
            | DemandWarning::NoViableModel { subregion, .. } => subregion,
        }
    }
}

impl std::fmt::Display for DemandWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandWarning::NegativeDemandClamped {
                subregion,
                intervals,
            } => write!(
                f,
                "Subregion {subregion} has negative numbers of newly developed cells in {intervals} interval(s), changing to zero"
            ),
            DemandWarning::InverseRelationship { subregion, slope } => write!(
                f,
                "For subregion {subregion} population and development are inversely proportional (slope {slope:.6}), will result in zero demand"
            ),
            DemandWarning::NoViableModel { subregion, reason } => write!(
                f,
                "No regression model for subregion {subregion}, will result in zero demand: {reason}"
            ),
        }
    }
}

/// Demand vector plus the warnings raised while deriving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProjection {
    pub vector: DemandVector,
    pub warnings: Vec<DemandWarning>,
}

/// Final demand table: one row per simulation interval, one column per subregion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandTable {
    /// Number of simulation times, including the reference time
    pub steps: usize,
    /// Header in source order, time column first
    pub header: Vec<String>,
    /// `simulation_times[1..]` truncated to integers
    pub times: Vec<i64>,
    /// `rows[i][j]` is the demand of `header[j + 1]` in interval `i`
    pub rows: Vec<Vec<u64>>,
}

impl DemandTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of fields per data line, time field included.
    pub fn num_columns(&self) -> usize {
        self.header.len()
    }

    /// Demand of one subregion in interval `row`, if the subregion is a column.
    pub fn value(&self, row: usize, subregion: &str) -> Option<u64> {
        let col = self.header.iter().skip(1).position(|h| h == subregion)?;
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Render as tab-separated text.
    ///
    /// ```
    /// use land_demand::models::DemandTable;
    ///
    /// let table = DemandTable {
    ///     steps: 2,
    ///     header: vec!["year".into(), "a".into(), "b".into()],
    ///     times: vec![2020],
    ///     rows: vec![vec![7, 0]],
    /// };
    /// assert_eq!(table.to_tsv(), "Years_to_simulate: 2\nyear\ta\tb\n2020\t7\t0\n");
    /// ```
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Years_to_simulate: {}\n", self.steps));
        out.push_str(&self.header.join("\t"));
        out.push('\n');
        for (time, row) in self.times.iter().zip(&self.rows) {
            out.push_str(&time.to_string());
            for value in row {
                out.push('\t');
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }
        out
    }
}
