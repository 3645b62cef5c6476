use std::path::Path;

use colored::Colorize;

use crate::analysis::DemandRun;
use crate::error::DemandError;
use crate::models::Selection;

const WIDTH: usize = 56;
const HEIGHT: usize = 16;
/// Points sampled along the fitted curve.
const CURVE_SAMPLES: usize = 10;

const OBSERVED: char = 'o';
const CURVE: char = '*';
const SIMULATED: char = '+';

/// `n` evenly spaced values from `lo` to `hi`, both included.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn scale(v: f64, lo: f64, hi: f64, cells: usize) -> usize {
    if hi - lo <= f64::EPSILON {
        return cells / 2;
    }
    (((v - lo) / (hi - lo)) * (cells - 1) as f64)
        .round()
        .clamp(0.0, (cells - 1) as f64) as usize
}

/// Render one subregion's fit as a text scatter plot.
///
/// Observed points are `o`, the fitted curve `*` (sampled from the smallest
/// observed to the largest simulated population) and the predictions at the
/// simulation times `+`. Later layers draw over earlier ones.
pub fn format_fit_chart(selection: &Selection) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}, RMSE: {:.3}\n",
        selection.subregion, selection.best.rmse
    ));
    output.push_str(&format!(
        "{} ({})\n",
        selection.best.equation(),
        selection.best.method
    ));

    let x_lo = selection
        .observed_population
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let x_hi = selection
        .simulated_population
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let curve: Vec<(f64, f64)> = if x_lo.is_finite() && x_hi.is_finite() {
        linspace(x_lo, x_hi, CURVE_SAMPLES)
            .into_iter()
            .map(|x| (x, selection.best.predict(x)))
            .collect()
    } else {
        Vec::new()
    };

    let observed = selection
        .observed_population
        .iter()
        .copied()
        .zip(selection.observed_developed.iter().copied());
    let simulated = selection
        .simulated_population
        .iter()
        .copied()
        .zip(selection.predicted.iter().copied());
    let layers: Vec<(char, Vec<(f64, f64)>)> = vec![
        (CURVE, curve),
        (SIMULATED, simulated.collect()),
        (OBSERVED, observed.collect()),
    ];

    let all = || layers.iter().flat_map(|(_, pts)| pts.iter().copied());
    let (Some((px_lo, px_hi)), Some((py_lo, py_hi))) =
        (bounds(all().map(|p| p.0)), bounds(all().map(|p| p.1)))
    else {
        output.push_str("  No data available.\n");
        return output;
    };

    let mut grid = vec![vec![' '; WIDTH]; HEIGHT];
    for (mark, points) in &layers {
        for &(x, y) in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let col = scale(x, px_lo, px_hi, WIDTH);
            let row = HEIGHT - 1 - scale(y, py_lo, py_hi, HEIGHT);
            grid[row][col] = *mark;
        }
    }

    let label_width = 10;
    for (i, row) in grid.iter().enumerate() {
        let label = match i {
            0 => format!("{py_hi:>label_width$.1}"),
            r if r == HEIGHT - 1 => format!("{py_lo:>label_width$.1}"),
            _ => " ".repeat(label_width),
        };
        output.push_str(&format!("{label} |{}\n", row.iter().collect::<String>()));
    }
    output.push_str(&format!("{} +{}\n", " ".repeat(label_width), "-".repeat(WIDTH)));
    output.push_str(&format!(
        "{} {:<w$.1}{:>w2$.1}\n",
        " ".repeat(label_width),
        px_lo,
        px_hi,
        w = WIDTH / 2,
        w2 = WIDTH - WIDTH / 2
    ));
    output.push_str(&format!(
        "{} x: population, y: developed cells   {OBSERVED} observed  {CURVE} fitted  {SIMULATED} simulated\n",
        " ".repeat(label_width)
    ));
    output
}

/// Format every subregion's fit chart, one after another.
pub fn format_fit_charts(run: &DemandRun) -> String {
    run.selections
        .values()
        .map(format_fit_chart)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print every subregion's fit chart.
pub fn print_fit_charts(run: &DemandRun) {
    println!("\n{}", "Fitted Curves".bold().green());
    print!("{}", format_fit_charts(run));
}

/// Write the fit charts of a run to a text file.
pub fn write_fit_charts(run: &DemandRun, path: impl AsRef<Path>) -> Result<(), DemandError> {
    std::fs::write(path.as_ref(), format_fit_charts(run))?;
    Ok(())
}
