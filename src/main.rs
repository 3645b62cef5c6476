use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use land_demand::{
    io::{self, CsvDeveloped, DevelopedSource, ZonalReports},
    models::{DevelopedCells, PopulationTable, RegressionMethod},
    potential::{run_potential, PotentialRequest},
    visualization::{
        format_input_summary, print_demand_table, print_fit_charts, print_selection_table,
        write_fit_charts,
    },
    DemandConfig, DemandEngine,
};

#[derive(Parser)]
#[command(
    name = "land-demand",
    about = "Land demand estimation - projects newly developed cells from population change",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit population/development curves and write the per-subregion demand table
    Demand {
        /// Observed population table (time column, then one column per subregion)
        #[arg(short, long)]
        observed: PathBuf,

        /// Projected population table
        #[arg(short, long)]
        projected: PathBuf,

        /// Developed cells table (subregion id, then one count per observed time)
        #[arg(short, long, conflicts_with = "zonal", required_unless_present = "zonal")]
        developed: Option<PathBuf>,

        /// Zonal statistics reports of developed cells, one per observed time, oldest first
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        zonal: Vec<PathBuf>,

        /// Simulation times, comma separated; the first is the reference time
        #[arg(short, long, value_delimiter = ',')]
        simulation_times: Vec<f64>,

        /// Regression methods to compare: linear, logarithmic, exponential
        #[arg(short, long, value_delimiter = ',')]
        method: Vec<RegressionMethod>,

        /// Field separator of the input tables (comma, tab, pipe, space, semicolon)
        #[arg(long)]
        separator: Option<String>,

        /// TOML run configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output demand file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write per-subregion fit charts to this text file
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Write a JSON fit report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Estimate development potential coefficients with R
    Potential {
        /// Input CSV with predictors, response and level columns
        #[arg(short, long)]
        input: PathBuf,

        /// Output coefficient file
        #[arg(short, long)]
        output: PathBuf,

        /// Predictor columns, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Binary response column (developed or not)
        #[arg(short, long, default_value = "developed")]
        response: String,

        /// Subregion column used as the random-effect level
        #[arg(short, long, default_value = "subregion")]
        level: String,

        /// Search predictor subsets for the best model
        #[arg(short, long)]
        dredge: bool,

        /// Minimum number of predictors in model search
        #[arg(long, default_value = "1")]
        min_variables: usize,

        /// Maximum number of predictors in model search (default: all)
        #[arg(long)]
        max_variables: Option<usize>,

        /// R interpreter to run
        #[arg(long, default_value = "Rscript")]
        rscript: String,
    },

    /// Display a quick summary of the input tables
    Inspect {
        /// Observed population table
        #[arg(short, long)]
        observed: PathBuf,

        /// Projected population table
        #[arg(short, long)]
        projected: PathBuf,

        /// Developed cells table
        #[arg(short, long, conflicts_with = "zonal")]
        developed: Option<PathBuf>,

        /// Zonal statistics reports of developed cells, one per observed time, oldest first
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        zonal: Vec<PathBuf>,

        /// Field separator of the input tables
        #[arg(long, default_value = "comma")]
        separator: String,
    },
}

fn load_tables(
    observed: &Path,
    projected: &Path,
    separator: u8,
) -> Result<(PopulationTable, PopulationTable)> {
    let observed = io::read_population(observed, separator)?;
    let projected = io::read_population(projected, separator)?;
    Ok((observed, projected))
}

fn developed_source(
    developed: Option<PathBuf>,
    zonal: Vec<PathBuf>,
    separator: u8,
) -> Option<Box<dyn DevelopedSource>> {
    match developed {
        Some(path) => Some(Box::new(CsvDeveloped { path, separator })),
        None if !zonal.is_empty() => Some(Box::new(ZonalReports { paths: zonal })),
        None => None,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demand {
            observed,
            projected,
            developed,
            zonal,
            simulation_times,
            method,
            separator,
            config,
            output,
            plot,
            report,
            pretty,
        } => {
            let mut settings = match &config {
                Some(path) => DemandConfig::load(path)?,
                None => DemandConfig::default(),
            };
            if !simulation_times.is_empty() {
                settings.simulation_times = simulation_times;
            }
            if !method.is_empty() {
                settings.methods = method;
            }
            if let Some(separator) = separator {
                settings.separator = separator;
            }
            if plot.is_some() {
                settings.plot = plot;
            }
            if report.is_some() {
                settings.report = report;
            }
            settings.validate()?;
            let separator = settings.separator_byte()?;

            let (observed, projected) = load_tables(&observed, &projected, separator)?;
            let Some(source) = developed_source(developed, zonal, separator) else {
                anyhow::bail!("Provide developed cells with --developed or --zonal");
            };
            let cells = source.load(observed.times().len())?;
            info!(
                subregions = cells.len(),
                observed_times = observed.times().len(),
                "loaded inputs"
            );

            let engine = DemandEngine::new(&cells, &observed, &projected);
            let run = engine.run(&settings.simulation_times, &settings.methods)?;

            match &output {
                Some(path) => {
                    io::write_demand_table(&run.table, path)?;
                    print_selection_table(&run);
                    println!();
                    print_demand_table(&run.table);
                    println!();
                    println!(
                        "{} Demand written to {}",
                        "Success:".green().bold(),
                        path.display()
                    );
                }
                None => print!("{}", run.table.to_tsv()),
            }

            let warnings = run.warnings().len();
            if warnings > 0 {
                info!(warnings, "some subregions were adjusted, see warnings above");
            }

            if let Some(path) = &settings.plot {
                write_fit_charts(&run, path)?;
                info!(path = %path.display(), "wrote fit charts");
            }
            if let Some(path) = &settings.report {
                io::write_report(&run, path, pretty)?;
                info!(path = %path.display(), "wrote fit report");
            }
            if output.is_some() && settings.plot.is_none() {
                print_fit_charts(&run);
            }
        }

        Commands::Potential {
            input,
            output,
            columns,
            response,
            level,
            dredge,
            min_variables,
            max_variables,
            rscript,
        } => {
            let mut request = PotentialRequest::new(&input, &output, columns, response, level);
            request.dredge = dredge;
            request.min_variables = min_variables;
            request.max_variables = max_variables;
            request.rscript = rscript;

            let run = run_potential(&request)?;
            println!("{}", run.stdout);
            println!(
                "{} Coefficients written to {}",
                "Success:".green().bold(),
                output.display()
            );
        }

        Commands::Inspect {
            observed,
            projected,
            developed,
            zonal,
            separator,
        } => {
            let separator = io::parse_separator(&separator)?;
            let (observed, projected) = load_tables(&observed, &projected, separator)?;
            let cells: Option<DevelopedCells> = developed_source(developed, zonal, separator)
                .map(|source| source.load(observed.times().len()))
                .transpose()?;

            println!("\n{}", "Quick Summary".bold().cyan());
            print!("{}", format_input_summary(&observed, &projected, cells.as_ref()));
            println!();
            println!("  Time column:    {}", observed.time_column());
            println!("  Subregions:     {}", observed.subregions().join(", "));
        }
    }

    Ok(())
}
