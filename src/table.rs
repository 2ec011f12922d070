//! Benchmark result tables.
//!
//! A [`BenchmarkTable`] is one CSV file held in memory: the header row and
//! the raw records. Columns are parsed on access, so a file only needs the
//! columns that the caller actually asks for. Tables are read-only and are
//! loaded fresh for every request.

use crate::error::{Error, Result};
use crate::metrics;
use serde::Deserialize;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Column holding the program (block) identifier.
pub const NAME: &str = "name";
/// Elapsed solve time in seconds.
pub const TIME: &str = "time";
/// Gas saved by the found program.
pub const SAVED_GAS: &str = "saved_gas";

/// Mutually exclusive per-row result of a superoptimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    AlreadyOptimal,
    DiscoveredOptimal,
    NonOptimalWithLessGas,
    NonOptimalWithSameGas,
    NoSolutionFound,
}

impl Outcome {
    pub fn all() -> [Outcome; 5] {
        [
            Outcome::AlreadyOptimal,
            Outcome::DiscoveredOptimal,
            Outcome::NonOptimalWithLessGas,
            Outcome::NonOptimalWithSameGas,
            Outcome::NoSolutionFound,
        ]
    }

    /// The indicator column for this outcome.
    pub fn column(&self) -> &'static str {
        match self {
            Outcome::AlreadyOptimal => "already_optimal",
            Outcome::DiscoveredOptimal => "discovered_optimal",
            Outcome::NonOptimalWithLessGas => "non_optimal_with_less_gas",
            Outcome::NonOptimalWithSameGas => "non_optimal_with_same_gas",
            Outcome::NoSolutionFound => "no_solution_found",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Typed view of one record. Every field is optional since the different
/// file families only carry a subset of the columns.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchmarkRow {
    pub name: Option<String>,
    pub init_progr_len: Option<f64>,
    pub expected_progr_len: Option<f64>,
    pub initial_size_relation: Option<f64>,
    pub number_of_necessary_push: Option<f64>,
    pub number_of_necessary_uninterpreted_instructions: Option<f64>,
    pub time: Option<f64>,
    pub saved_gas: Option<f64>,
    pub already_optimal: Option<f64>,
    pub discovered_optimal: Option<f64>,
    pub non_optimal_with_less_gas: Option<f64>,
    pub non_optimal_with_same_gas: Option<f64>,
    pub no_solution_found: Option<f64>,
}

impl BenchmarkRow {
    fn indicator(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::AlreadyOptimal => self.already_optimal,
            Outcome::DiscoveredOptimal => self.discovered_optimal,
            Outcome::NonOptimalWithLessGas => self.non_optimal_with_less_gas,
            Outcome::NonOptimalWithSameGas => self.non_optimal_with_same_gas,
            Outcome::NoSolutionFound => self.no_solution_found,
        }
    }

    /// The first outcome whose indicator is set, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        Outcome::all()
            .into_iter()
            .find(|o| self.indicator(*o).is_some_and(|v| v != 0.0))
    }
}

/// One CSV file of benchmark results.
#[derive(Debug, Clone)]
pub struct BenchmarkTable {
    source: String,
    headers: csv::StringRecord,
    records: Vec<csv::StringRecord>,
}

impl BenchmarkTable {
    /// Load a table from a CSV file with a header row.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let table = Self::from_reader(file, &path.display().to_string())?;

        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "loaded results table"
        );

        Ok(table)
    }

    /// Load a table from any reader. `source` names the table in errors.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let csv_error = |e| Error::Csv {
            source_name: source.to_string(),
            source: e,
        };

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers().map_err(csv_error)?.clone();
        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(csv_error)?;

        metrics::TABLES_LOADED.increment();
        metrics::ROWS_LOADED.add(records.len() as u64);

        Ok(Self {
            source: source.to_string(),
            headers,
            records,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.position(column).ok_or_else(|| Error::MissingColumn {
            source_name: self.source.clone(),
            column: column.to_string(),
        })
    }

    /// Parse a column as floats, in row order. Blank cells are missing
    /// values and come back as NaN.
    pub fn column(&self, column: &str) -> Result<Vec<f64>> {
        let idx = self.require(column)?;

        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let value = record.get(idx).unwrap_or("").trim();
                if value.is_empty() {
                    return Ok(f64::NAN);
                }
                value.parse::<f64>().map_err(|_| Error::InvalidValue {
                    source_name: self.source.clone(),
                    column: column.to_string(),
                    row,
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Raw text of a column, in row order.
    pub fn text_column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.require(column)?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(idx).unwrap_or(""))
            .collect())
    }

    /// Sum of a numeric column, skipping missing values.
    pub fn column_sum(&self, column: &str) -> Result<f64> {
        Ok(self
            .column(column)?
            .iter()
            .filter(|v| !v.is_nan())
            .sum())
    }

    /// Deserialize every record into a [`BenchmarkRow`].
    pub fn rows(&self) -> Result<Vec<BenchmarkRow>> {
        self.records
            .iter()
            .map(|record| {
                record
                    .deserialize::<BenchmarkRow>(Some(&self.headers))
                    .map_err(|e| Error::Csv {
                        source_name: self.source.clone(),
                        source: e,
                    })
            })
            .collect()
    }
}
