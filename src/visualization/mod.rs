mod tables;
mod charts;

pub use tables::{
    format_demand_table, print_demand_table,
    format_selection_table, print_selection_table,
    format_input_summary,
};
pub use charts::{format_fit_chart, format_fit_charts, print_fit_charts, write_fit_charts};
