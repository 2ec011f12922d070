//! Static-parameter metrics derived from a results table.
//!
//! A [`Metric`] names either a column that is read directly or a ratio of
//! two columns. Ratios against the program length lower bound treat a bound
//! of zero as a bound of one, since a zero bound means no bound was
//! computed.

use crate::error::{Error, Result};
use crate::table::BenchmarkTable;
use std::fmt;
use std::str::FromStr;

pub const INIT_PROGR_LEN: &str = "init_progr_len";
pub const EXPECTED_PROGR_LEN: &str = "expected_progr_len";
pub const INITIAL_SIZE_RELATION: &str = "initial_size_relation";
pub const NECESSARY_PUSH: &str = "number_of_necessary_push";
pub const NECESSARY_UNINTERPRETED: &str = "number_of_necessary_uninterpreted_instructions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    InitialLength,
    InitialSizeRelation,
    NecessaryPush,
    NecessaryUninterpreted,
    PushPerInitial,
    UninterpretedPerInitial,
    PushPerExpected,
    UninterpretedPerExpected,
}

/// How a metric is computed from the table.
enum Source {
    Column(&'static str),
    /// numerator / denominator, the denominator must be non-zero
    Ratio(&'static str, &'static str),
    /// numerator / denominator, zero denominators are replaced by one
    RatioToBound(&'static str, &'static str),
}

impl Metric {
    pub fn all() -> [Metric; 8] {
        [
            Metric::InitialLength,
            Metric::InitialSizeRelation,
            Metric::NecessaryPush,
            Metric::NecessaryUninterpreted,
            Metric::PushPerInitial,
            Metric::UninterpretedPerInitial,
            Metric::PushPerExpected,
            Metric::UninterpretedPerExpected,
        ]
    }

    /// The identifier used by the dashboard controls and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::InitialLength => "init_progr_len",
            Metric::InitialSizeRelation => "initial_size_relation",
            Metric::NecessaryPush => "number_of_necessary_push",
            Metric::NecessaryUninterpreted => "number_of_necessary_uninterpreted_instructions",
            Metric::PushPerInitial => "push_per_initial",
            Metric::UninterpretedPerInitial => "uninterpreted_per_initial",
            Metric::PushPerExpected => "push_per_expected",
            Metric::UninterpretedPerExpected => "uninterpreted_per_expected",
        }
    }

    fn source(&self) -> Source {
        match self {
            Metric::InitialLength => Source::Column(INIT_PROGR_LEN),
            Metric::InitialSizeRelation => Source::Column(INITIAL_SIZE_RELATION),
            Metric::NecessaryPush => Source::Column(NECESSARY_PUSH),
            Metric::NecessaryUninterpreted => Source::Column(NECESSARY_UNINTERPRETED),
            Metric::PushPerInitial => Source::Ratio(NECESSARY_PUSH, INIT_PROGR_LEN),
            Metric::UninterpretedPerInitial => {
                Source::Ratio(NECESSARY_UNINTERPRETED, INIT_PROGR_LEN)
            }
            Metric::PushPerExpected => Source::RatioToBound(NECESSARY_PUSH, EXPECTED_PROGR_LEN),
            Metric::UninterpretedPerExpected => {
                Source::RatioToBound(NECESSARY_UNINTERPRETED, EXPECTED_PROGR_LEN)
            }
        }
    }

    /// Compute the metric for every row of `table`, in row order.
    ///
    /// Either the whole series is returned or an error; there is no partial
    /// output.
    pub fn select(&self, table: &BenchmarkTable) -> Result<Vec<f64>> {
        match self.source() {
            Source::Column(column) => table.column(column),
            Source::Ratio(numerator, denominator) => {
                let num = table.column(numerator)?;
                let den = table.column(denominator)?;

                num.iter()
                    .zip(den.iter())
                    .enumerate()
                    .map(|(row, (n, d))| {
                        if *d == 0.0 {
                            Err(Error::DivisionByZero {
                                metric: self.as_str(),
                                row,
                            })
                        } else {
                            Ok(n / d)
                        }
                    })
                    .collect()
            }
            Source::RatioToBound(numerator, bound) => {
                let num = table.column(numerator)?;
                let bound = table.column(bound)?;

                Ok(num
                    .iter()
                    .zip(bound.iter())
                    .map(|(n, b)| if *b == 0.0 { *n } else { n / b })
                    .collect())
            }
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Metric::all()
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `metric` and compute it for `table`.
pub fn select(table: &BenchmarkTable, metric: &str) -> Result<Vec<f64>> {
    metric.parse::<Metric>()?.select(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> BenchmarkTable {
        BenchmarkTable::from_reader(csv.as_bytes(), "test.csv").unwrap()
    }

    const STATIC_PARAMS: &str = "init_progr_len,expected_progr_len,initial_size_relation,number_of_necessary_push,number_of_necessary_uninterpreted_instructions\n\
        10,5,0.5,3,2\n\
        4,0,0,4,1\n\
        8,2,0.25,6,0\n";

    #[test]
    fn direct_columns() {
        let t = table(STATIC_PARAMS);
        assert_eq!(select(&t, "init_progr_len").unwrap(), vec![10.0, 4.0, 8.0]);
        assert_eq!(
            select(&t, "initial_size_relation").unwrap(),
            vec![0.5, 0.0, 0.25]
        );
        assert_eq!(
            select(&t, "number_of_necessary_push").unwrap(),
            vec![3.0, 4.0, 6.0]
        );
        assert_eq!(
            select(&t, "number_of_necessary_uninterpreted_instructions").unwrap(),
            vec![2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn push_per_initial_is_elementwise() {
        let t = table(STATIC_PARAMS);
        let push = t.column(NECESSARY_PUSH).unwrap();
        let init = t.column(INIT_PROGR_LEN).unwrap();
        let ratio = select(&t, "push_per_initial").unwrap();

        assert_eq!(ratio.len(), t.len());
        for i in 0..t.len() {
            assert_eq!(ratio[i], push[i] / init[i]);
        }
    }

    #[test]
    fn uninterpreted_per_initial() {
        let t = table(STATIC_PARAMS);
        assert_eq!(
            select(&t, "uninterpreted_per_initial").unwrap(),
            vec![0.2, 0.25, 0.0]
        );
    }

    #[test]
    fn zero_bound_divides_by_one() {
        let t = table("number_of_necessary_push,expected_progr_len\n4,0\n");
        assert_eq!(select(&t, "push_per_expected").unwrap(), vec![4.0]);
    }

    #[test]
    fn per_expected_ratios() {
        let t = table(STATIC_PARAMS);
        assert_eq!(
            select(&t, "push_per_expected").unwrap(),
            vec![0.6, 4.0, 3.0]
        );
        assert_eq!(
            select(&t, "uninterpreted_per_expected").unwrap(),
            vec![0.4, 1.0, 0.0]
        );
    }

    #[test]
    fn zero_initial_length_is_an_error() {
        let t = table("number_of_necessary_push,init_progr_len\n1,2\n3,0\n");
        match select(&t, "push_per_initial") {
            Err(Error::DivisionByZero { metric, row }) => {
                assert_eq!(metric, "push_per_initial");
                assert_eq!(row, 1);
            }
            other => panic!("expected DivisionByZero, got {:?}", other),
        }
    }

    #[test]
    fn unknown_metric() {
        let t = table(STATIC_PARAMS);
        match select(&t, "gas_per_push") {
            Err(Error::InvalidMetric(name)) => assert_eq!(name, "gas_per_push"),
            other => panic!("expected InvalidMetric, got {:?}", other),
        }
    }

    #[test]
    fn missing_denominator_column() {
        let t = table("number_of_necessary_push\n1\n");
        match select(&t, "push_per_expected") {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, EXPECTED_PROGR_LEN),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn identifiers_round_trip() {
        for metric in Metric::all() {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn empty_table_yields_empty_series() {
        let t = table("number_of_necessary_push,init_progr_len\n");
        assert!(select(&t, "push_per_initial").unwrap().is_empty());
    }
}
