mod demand;
mod fit;
mod method;
mod series;

pub use demand::{DemandProjection, DemandTable, DemandVector, DemandWarning};
pub use fit::{CurveFit, Selection, SkippedMethod};
pub use method::RegressionMethod;
pub use series::{DevelopedCells, PopulationTable, SubregionId, TimeSeries};
