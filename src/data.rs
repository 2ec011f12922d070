//! Locating and loading results files.
//!
//! File names follow three conventions inside the data directory:
//!
//! - `<encoding>_<group>.csv` for the encoding stage,
//! - `comparison_<base>_<category>.csv` for parameter comparisons,
//! - `<setup>_<solver>.csv` for solver setups.
//!
//! Every call reads the file again. Nothing is cached.

use crate::catalog::is_file_component;
use crate::error::{Error, Result};
use crate::table::BenchmarkTable;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DataSource {
    dir: PathBuf,
}

impl DataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, parts: &[&str]) -> Result<PathBuf> {
        for part in parts {
            if !is_file_component(part) {
                return Err(Error::InvalidSelection(format!(
                    "'{}' cannot be used in a results file name",
                    part
                )));
            }
        }
        Ok(self.dir.join(format!("{}.csv", parts.join("_"))))
    }

    pub fn encoding_path(&self, encoding: &str, group: &str) -> Result<PathBuf> {
        self.file(&[encoding, group])
    }

    pub fn comparison_path(&self, base: &str, category: &str) -> Result<PathBuf> {
        self.file(&["comparison", base, category])
    }

    pub fn setup_path(&self, setup: &str, solver: &str) -> Result<PathBuf> {
        self.file(&[setup, solver])
    }

    pub fn encoding_table(&self, encoding: &str, group: &str) -> Result<BenchmarkTable> {
        BenchmarkTable::from_path(&self.encoding_path(encoding, group)?)
    }

    pub fn comparison_table(&self, base: &str, category: &str) -> Result<BenchmarkTable> {
        BenchmarkTable::from_path(&self.comparison_path(base, category)?)
    }

    pub fn setup_table(&self, setup: &str, solver: &str) -> Result<BenchmarkTable> {
        BenchmarkTable::from_path(&self.setup_path(setup, solver)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_conventions() {
        let source = DataSource::new("/data");
        assert_eq!(
            source.encoding_path("at_most", "z3").unwrap(),
            PathBuf::from("/data/at_most_z3.csv")
        );
        assert_eq!(
            source
                .comparison_path("no_output_before_pop", "no_output_before_pop_at_most")
                .unwrap(),
            PathBuf::from("/data/comparison_no_output_before_pop_no_output_before_pop_at_most.csv")
        );
        assert_eq!(
            source.setup_path("cav_benchmarks", "oms").unwrap(),
            PathBuf::from("/data/cav_benchmarks_oms.csv")
        );
    }

    #[test]
    fn rejects_traversal() {
        let source = DataSource::new("/data");
        assert!(matches!(
            source.encoding_path("../secret", "z3"),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            source.setup_path("best", ""),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::new(dir.path());
        match source.encoding_table("at_most", "z3") {
            Err(Error::FileNotFound(path)) => assert_eq!(path, dir.path().join("at_most_z3.csv")),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }
}
