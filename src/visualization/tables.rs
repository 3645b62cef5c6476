use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::DemandRun;
use crate::models::{DemandTable, DevelopedCells, PopulationTable};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format the per-subregion model selection as a string.
pub fn format_selection_table(run: &DemandRun) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Model Selection".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table();
    table.set_header(vec![
        "Subregion",
        "Method",
        "Equation",
        "RMSE",
        "R²",
        "Total Demand",
    ]);

    for (id, sel) in &run.selections {
        let total = run.demand(id).map_or(0, |v| v.total());
        table.add_row(vec![
            Cell::new(id),
            Cell::new(sel.best.method),
            Cell::new(sel.best.equation()),
            Cell::new(format!("{:.3}", sel.best.rmse)),
            Cell::new(format!("{:.3}", sel.best.r_squared)),
            Cell::new(total),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the per-subregion model selection.
pub fn print_selection_table(run: &DemandRun) {
    print!("{}", format_selection_table(run));
}

/// Format the demand table for the console.
pub fn format_demand_table(demand: &DemandTable) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Demand (new developed cells)".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!("Years to simulate: {}", demand.steps).dimmed()
    ));

    let mut table = new_table();
    table.set_header(demand.header.clone());
    for (time, row) in demand.times.iter().zip(&demand.rows) {
        let mut cells = vec![Cell::new(time)];
        cells.extend(row.iter().map(Cell::new));
        table.add_row(cells);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the demand table.
pub fn print_demand_table(demand: &DemandTable) {
    print!("{}", format_demand_table(demand));
}

/// Format a quick overview of the input tables.
pub fn format_input_summary(
    observed: &PopulationTable,
    projected: &PopulationTable,
    developed: Option<&DevelopedCells>,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Input Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let span = |times: &[f64]| match (times.first(), times.last()) {
        (Some(a), Some(b)) => format!("{a} - {b}"),
        _ => "-".to_string(),
    };

    let mut table = new_table();
    table.set_header(vec!["Table", "Subregions", "Times", "Span"]);
    table.add_row(vec![
        Cell::new("Observed population"),
        Cell::new(observed.subregions().len()),
        Cell::new(observed.times().len()),
        Cell::new(span(observed.times())),
    ]);
    table.add_row(vec![
        Cell::new("Projected population"),
        Cell::new(projected.subregions().len()),
        Cell::new(projected.times().len()),
        Cell::new(span(projected.times())),
    ]);
    if let Some(developed) = developed {
        let counts = developed.iter().next().map_or(0, |(_, c)| c.len());
        table.add_row(vec![
            Cell::new("Developed cells"),
            Cell::new(developed.len()),
            Cell::new(counts),
            Cell::new(""),
        ]);
        let unfitted = observed
            .subregions()
            .iter()
            .filter(|s| developed.get(s).is_none())
            .count();
        if unfitted > 0 {
            output.push_str(&format!(
                "{}\n",
                format!("{unfitted} population subregion(s) have no developed cells and will get zero demand")
                    .yellow()
            ));
        }
    }

    output.push_str(&format!("{table}"));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn population(times: Vec<f64>) -> PopulationTable {
        let n = times.len();
        let mut columns = HashMap::new();
        columns.insert("1".to_string(), vec![1.0; n]);
        columns.insert("2".to_string(), vec![2.0; n]);
        PopulationTable::new(
            vec!["year".into(), "1".into(), "2".into()],
            times,
            columns,
        )
        .unwrap()
    }

    #[test]
    fn test_format_demand_table_contains_values() {
        let demand = DemandTable {
            steps: 3,
            header: vec!["year".into(), "37001".into()],
            times: vec![2020, 2030],
            rows: vec![vec![42], vec![17]],
        };
        let output = format_demand_table(&demand);
        assert!(output.contains("Demand"));
        assert!(output.contains("37001"));
        assert!(output.contains("2030"));
        assert!(output.contains("42"));
        assert!(output.contains("Years to simulate: 3"));
    }

    #[test]
    fn test_format_input_summary() {
        let observed = population(vec![2000.0, 2005.0, 2010.0]);
        let projected = population(vec![2020.0]);
        let developed: DevelopedCells = [("1".to_string(), vec![1, 2, 3])].into_iter().collect();
        let output = format_input_summary(&observed, &projected, Some(&developed));
        assert!(output.contains("Observed population"));
        assert!(output.contains("Projected population"));
        assert!(output.contains("Developed cells"));
        assert!(output.contains("2000 - 2010"));
        assert!(output.contains("1 population subregion(s)"));
    }

    #[test]
    fn test_format_input_summary_without_developed() {
        let observed = population(vec![2000.0]);
        let output = format_input_summary(&observed, &observed, None);
        assert!(!output.contains("Developed cells"));
    }
}
