//! Development potential coefficients via an external R process.
//!
//! The mixed-effects logistic model (optionally with automatic model search)
//! is fitted by `Rscript`. This module stages the input columns and the R
//! script in a temporary directory, runs the process, and reformats its
//! coefficient table. The temporary directory is removed when the guard is
//! dropped, on success and on every error path.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::DemandError;

const RSCRIPT: &str = r#"
for (package in c("MuMIn", "lme4", "optparse")) {
    if (!(is.element(package, installed.packages()[,1])))
        stop(paste("Package", package, " not found"))
}
suppressPackageStartupMessages(library(MuMIn))
suppressPackageStartupMessages(library(lme4))
suppressPackageStartupMessages(library(optparse))
option_list = list(
  make_option(c("-i","--input"), action="store", default=NA, type='character', help="input CSV file"),
  make_option(c("-o","--output"), action="store", default=NA, type='character', help="output CSV file"),
  make_option(c("-l","--level"), action="store", default=NA, type='character', help="level variable name"),
  make_option(c("-r","--response"), action="store", default=NA, type='character', help="binary response variable name"),
  make_option(c("-d","--usedredge"), action="store", default=NA, type='logical', help="use dredge to find best model"),
  make_option(c("-m","--minimum"), action="store", default=NA, type='integer', help="minimum number of variables for dredge"),
  make_option(c("-x","--maximum"), action="store", default=NA, type='integer', help="maximum number of variables for dredge")
)

opt = parse_args(OptionParser(option_list=option_list))

input_data = read.csv(opt$input)
predictors <- names(input_data)
predictors <- predictors[predictors != opt$level]
predictors <- predictors[predictors != opt$response]

interc <- paste("(1|", opt$level, ")")
fmla <- as.formula(paste(opt$response, " ~ ", paste(c(predictors, interc), collapse= "+")))
model = glmer(formula=fmla, family = binomial, data=input_data, na.action = "na.fail")

if(opt$usedredge) {
    select.model <- dredge(model, evaluate=TRUE, rank="AIC", fixed=~(1|opt$level), m.lim=c(opt$minimum, opt$maximum), trace=FALSE)
    model.best <- get.models(select.model, 1)
    model = glmer(formula(model.best[[1]]), family = binomial, data=input_data, na.action = "na.fail")
}
print(summary(model))
coefs <- as.data.frame(coef(model)[[1]])
write.table(cbind(rownames(coefs), coefs), opt$output, row.names=FALSE, sep="\t")
"#;

/// One potential-model run.
#[derive(Debug, Clone)]
pub struct PotentialRequest {
    /// CSV with one row per sampled cell
    pub input: PathBuf,
    /// Destination of the reformatted coefficient table
    pub output: PathBuf,
    /// Predictor columns
    pub columns: Vec<String>,
    /// Binary developed/undeveloped column
    pub response: String,
    /// Subregion column, used as the random-effect level
    pub level: String,
    /// Search predictor subsets for the best model
    pub dredge: bool,
    pub min_variables: usize,
    /// Defaults to the number of predictor columns
    pub max_variables: Option<usize>,
    /// Interpreter to run
    pub rscript: String,
}

impl PotentialRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        columns: Vec<String>,
        response: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            columns,
            response: response.into(),
            level: level.into(),
            dredge: false,
            min_variables: 1,
            max_variables: None,
            rscript: "Rscript".to_string(),
        }
    }

    pub fn max_variables(&self) -> usize {
        self.max_variables.unwrap_or(self.columns.len())
    }

    pub fn validate(&self) -> Result<(), DemandError> {
        if self.columns.is_empty() {
            return Err(DemandError::ValidationError(
                "At least one predictor column is required".to_string(),
            ));
        }
        if self.columns.iter().any(|c| *c == self.response || *c == self.level) {
            return Err(DemandError::ValidationError(
                "Predictor columns must not include the response or level column".to_string(),
            ));
        }
        if self.dredge && self.min_variables > self.max_variables() {
            return Err(DemandError::ValidationError(format!(
                "Minimum number of predictor variables ({}) is larger than maximum ({})",
                self.min_variables,
                self.max_variables()
            )));
        }
        Ok(())
    }
}

/// Copy the predictor, response and level columns of a CSV into `dest`.
pub fn select_columns(
    input: &Path,
    dest: &Path,
    columns: &[String],
) -> Result<usize, DemandError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(input)?;
    let headers = rdr.headers()?.clone();
    let indices = columns
        .iter()
        .map(|c| {
            headers.iter().position(|h| h == c).ok_or_else(|| {
                DemandError::ValidationError(format!("Column '{c}' not found in {}", input.display()))
            })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut wtr = csv::Writer::from_path(dest)?;
    wtr.write_record(columns)?;
    let mut rows = 0;
    for record in rdr.records() {
        let record = record?;
        wtr.write_record(indices.iter().map(|&i| record.get(i).unwrap_or("")))?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// Turn the tab-separated, quoted R coefficient table into the space-separated
/// layout consumed downstream, with the first two header cells named `ID` and
/// `Intercept`.
pub fn reformat_coefficients(text: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row: Vec<&str> = line.split('\t').map(|f| f.trim().trim_matches('"')).collect();
        if i == 0 {
            if let Some(first) = row.get_mut(0) {
                *first = "ID";
            }
            if let Some(second) = row.get_mut(1) {
                *second = "Intercept";
            }
        }
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

/// Console output of a successful R run.
#[derive(Debug, Clone, Default)]
pub struct PotentialRun {
    /// Model summary
    pub stdout: String,
    /// Messages and warnings printed by R
    pub stderr: String,
}

/// Run the potential model and write the reformatted coefficients.
pub fn run_potential(request: &PotentialRequest) -> Result<PotentialRun, DemandError> {
    request.validate()?;

    let workdir = tempfile::Builder::new().prefix("potential").tempdir()?;
    let script = workdir.path().join("potential.R");
    let data = workdir.path().join("input.csv");
    let coefficients = workdir.path().join("potential.csv");
    std::fs::write(&script, RSCRIPT)?;

    let mut columns = request.columns.clone();
    columns.push(request.response.clone());
    columns.push(request.level.clone());
    let rows = select_columns(&request.input, &data, &columns)?;
    debug!(rows, dir = %workdir.path().display(), "staged potential input");

    if request.dredge {
        info!("Running automatic model selection ...");
    } else {
        info!("Computing model...");
    }
    let output = Command::new(&request.rscript)
        .arg(&script)
        .arg("-i")
        .arg(&data)
        .arg("-l")
        .arg(&request.level)
        .arg("-r")
        .arg(&request.response)
        .arg("-m")
        .arg(request.min_variables.to_string())
        .arg("-x")
        .arg(request.max_variables().to_string())
        .arg("-o")
        .arg(&coefficients)
        .arg("-d")
        .arg(if request.dredge { "TRUE" } else { "FALSE" })
        .output()
        .map_err(|e| {
            DemandError::ExternalProcess(format!("Failed to start {}: {e}", request.rscript))
        })?;

    if !output.status.success() {
        return Err(DemandError::ExternalProcess(format!(
            "Running R script failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        info!("R: {stderr}");
    }

    let table = std::fs::read_to_string(&coefficients)?;
    std::fs::write(&request.output, reformat_coefficients(&table))?;
    Ok(PotentialRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}
