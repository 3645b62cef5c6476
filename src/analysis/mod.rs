mod assembly;
mod engine;
mod interpolation;
pub mod ols;
mod projection;
mod regression;
mod selection;

pub use assembly::assemble_table;
pub use engine::{validate_simulation_times, DemandEngine, DemandRun};
pub use interpolation::{interpolate, simulated_population};
pub use projection::{project_demand, project_increments, project_unfitted};
pub use regression::{fit_curve, MIN_OBSERVATIONS};
pub use selection::select_model;
