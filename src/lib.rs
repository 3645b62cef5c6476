pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod potential;
pub mod visualization;

pub use analysis::{DemandEngine, DemandRun};
pub use config::DemandConfig;
pub use error::DemandError;
pub use io::DevelopedSource;
pub use models::{
    CurveFit, DemandTable, DemandVector, DemandWarning, DevelopedCells, PopulationTable,
    RegressionMethod, Selection,
};
