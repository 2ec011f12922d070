//! Figure builders for every chart of the dashboard.
//!
//! A [`Selection`] is the state of one stage's controls. [`render`] reads the
//! files the selection maps to and builds the stage's figures. Each call
//! reads the files again; no state is kept between calls.

use crate::catalog::{self, Catalog, label_of};
use crate::data::DataSource;
use crate::error::{Error, Result};
use crate::figure::{BarMode, BoxMode, Domain, Figure, Layout, Title, Trace};
use crate::metric::Metric;
use crate::metrics;
use crate::stats::{self, pair_by_name};
use crate::table::{BenchmarkTable, NAME, Outcome, SAVED_GAS, TIME};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub const ENCODING_TIME: &str = "encoding-time";
pub const ENCODING_GAS: &str = "encoding-gas";
pub const ENCODING_STATISTICS: &str = "encoding-statistics";
pub const COMPARISON_TIMES: &str = "comparison-times";
pub const SETUP_TIME: &str = "setup-time";
pub const SETUP_OUTCOMES: &str = "setup-outcomes";
pub const SETUP_PAIRED: &str = "setup-paired";

/// The dashboard stages, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Stage one: determining the best encoding.
    Encoding,
    /// Static parameters that affect an encoding.
    Parameters,
    /// Stage two: determining the best solver setup.
    Setups,
}

impl StageId {
    pub fn all() -> [StageId; 3] {
        [StageId::Encoding, StageId::Parameters, StageId::Setups]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Encoding => "encoding",
            StageId::Parameters => "parameters",
            StageId::Setups => "setups",
        }
    }
}

impl FromStr for StageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StageId::all()
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| Error::InvalidSelection(format!("unknown stage '{}'", s)))
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range over a metric, in percent of the metric's span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const FULL: Range = Range {
        low: 0.0,
        high: 100.0,
    };

    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelection(format!("invalid range '{}'", s));

        let (low, high) = s.split_once(',').ok_or_else(invalid)?;
        let low: f64 = low.trim().parse().map_err(|_| invalid())?;
        let high: f64 = high.trim().parse().map_err(|_| invalid())?;

        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low > high {
            return Err(invalid());
        }

        Ok(Self { low, high })
    }

    /// The metric interval covered by this range, given the metric's bounds.
    fn interval(&self, min: f64, max: f64) -> (f64, f64) {
        let span = max - min;
        // the end points map to the bounds exactly
        let at = |pct: f64| match pct {
            p if p <= 0.0 => min,
            p if p >= 100.0 => max,
            p => min + span * p / 100.0,
        };
        (at(self.low), at(self.high))
    }
}

/// Control state of one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Encoding {
        groups: Vec<String>,
        encodings: Vec<String>,
    },
    Parameters {
        category: String,
        metric: Metric,
        range: Range,
    },
    Setups {
        setups: Vec<String>,
        solver: String,
    },
}

impl Selection {
    pub fn stage(&self) -> StageId {
        match self {
            Selection::Encoding { .. } => StageId::Encoding,
            Selection::Parameters { .. } => StageId::Parameters,
            Selection::Setups { .. } => StageId::Setups,
        }
    }

    /// The selection the dashboard starts with.
    pub fn defaults(stage: StageId, catalog: &Catalog) -> Result<Self> {
        let no_options = |name: &str| Error::InvalidSelection(format!("no {} configured", name));

        Ok(match stage {
            StageId::Encoding => Selection::Encoding {
                groups: catalog::selected(&catalog.groups),
                encodings: catalog::selected(&catalog.encodings),
            },
            StageId::Parameters => Selection::Parameters {
                category: catalog::selected_one(&catalog.categories)
                    .ok_or_else(|| no_options("categories"))?
                    .to_string(),
                metric: catalog::selected_one(&catalog.comparison_filters)
                    .ok_or_else(|| no_options("comparison filters"))?
                    .parse()?,
                range: Range::FULL,
            },
            StageId::Setups => Selection::Setups {
                setups: catalog::selected(&catalog.setups),
                solver: catalog::selected_one(&catalog.setup_solvers)
                    .ok_or_else(|| no_options("setup solvers"))?
                    .to_string(),
            },
        })
    }

    /// Build a selection from query parameters. Absent parameters take the
    /// default; an empty list parameter means nothing is selected. Every
    /// value must be one of the catalog's options.
    pub fn from_query(
        stage: StageId,
        params: &HashMap<String, String>,
        catalog: &Catalog,
    ) -> Result<Self> {
        let mut selection = Self::defaults(stage, catalog)?;

        match &mut selection {
            Selection::Encoding { groups, encodings } => {
                if let Some(v) = params.get("groups") {
                    *groups = parse_list("groups", v, &catalog.groups)?;
                }
                if let Some(v) = params.get("encodings") {
                    *encodings = parse_list("encodings", v, &catalog.encodings)?;
                }
            }
            Selection::Parameters {
                category,
                metric,
                range,
            } => {
                if let Some(v) = params.get("category") {
                    *category = parse_one("category", v, &catalog.categories)?;
                }
                if let Some(v) = params.get("metric") {
                    let parsed: Metric = v.trim().parse()?;
                    if !catalog::contains(&catalog.comparison_filters, parsed.as_str()) {
                        return Err(Error::InvalidSelection(format!(
                            "'{}' is not an offered comparison filter",
                            parsed
                        )));
                    }
                    *metric = parsed;
                }
                if let Some(v) = params.get("range") {
                    *range = Range::parse(v)?;
                }
            }
            Selection::Setups { setups, solver } => {
                if let Some(v) = params.get("setups") {
                    *setups = parse_list("setups", v, &catalog.setups)?;
                }
                if let Some(v) = params.get("solver") {
                    *solver = parse_one("solver", v, &catalog.setup_solvers)?;
                }
            }
        }

        Ok(selection)
    }
}

fn parse_one(param: &str, value: &str, choices: &[catalog::Choice]) -> Result<String> {
    let value = value.trim();
    if catalog::contains(choices, value) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidSelection(format!(
            "'{}' is not a known {}",
            value, param
        )))
    }
}

/// Comma separated options. Repeated values keep their first position.
fn parse_list(param: &str, value: &str, choices: &[catalog::Choice]) -> Result<Vec<String>> {
    let mut values: Vec<String> = Vec::new();
    for v in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        let v = parse_one(param, v, choices)?;
        if !values.contains(&v) {
            values.push(v);
        }
    }
    Ok(values)
}

/// Figures of one stage, keyed by slot id.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub figures: BTreeMap<&'static str, Figure>,
    /// Min and max of the selected metric, for the parameters stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 2]>,
}

/// Build all figures for `selection`.
pub fn render(selection: &Selection, source: &DataSource, catalog: &Catalog) -> Result<Rendered> {
    let result = match selection {
        Selection::Encoding { groups, encodings } => {
            render_encoding(groups, encodings, source, catalog)
        }
        Selection::Parameters {
            category,
            metric,
            range,
        } => render_parameters(category, *metric, *range, source, catalog),
        Selection::Setups { setups, solver } => render_setups(setups, solver, source, catalog),
    };

    match &result {
        Ok(rendered) => {
            metrics::FIGURES_RENDERED.add(rendered.figures.len() as u64);
            tracing::debug!(
                stage = %selection.stage(),
                figures = rendered.figures.len(),
                "rendered stage"
            );
        }
        Err(_) => {
            metrics::FIGURE_ERRORS.increment();
        }
    }

    result
}

// ============================================================================
// Stage one: encodings
// ============================================================================

/// One loaded `<encoding>_<group>.csv`.
struct EncodingRun<'a> {
    group: &'a str,
    encoding: &'a str,
    table: BenchmarkTable,
}

fn render_encoding(
    groups: &[String],
    encodings: &[String],
    source: &DataSource,
    catalog: &Catalog,
) -> Result<Rendered> {
    let mut runs = Vec::with_capacity(groups.len() * encodings.len());
    for encoding in encodings {
        for group in groups {
            runs.push(EncodingRun {
                group: group.as_str(),
                encoding: encoding.as_str(),
                table: source.encoding_table(encoding, group)?,
            });
        }
    }

    let mut figures = BTreeMap::new();
    figures.insert(
        ENCODING_TIME,
        encoding_box(&runs, encodings, catalog, TIME, 60.0, "Times per contract (minutes)")?,
    );
    figures.insert(
        ENCODING_GAS,
        encoding_box(&runs, encodings, catalog, SAVED_GAS, 1.0, "Saved gas per contract")?,
    );
    figures.insert(ENCODING_STATISTICS, encoding_statistics(&runs, catalog)?);

    Ok(Rendered {
        figures,
        bounds: None,
    })
}

/// One box trace per encoding, x labelled by group.
fn encoding_box(
    runs: &[EncodingRun],
    encodings: &[String],
    catalog: &Catalog,
    column: &str,
    divisor: f64,
    y_title: &str,
) -> Result<Figure> {
    let mut figure = Figure::new(
        Layout::default()
            .with_y_title(y_title)
            .with_box_mode(BoxMode::Group),
    );

    for encoding in encodings {
        let mut x = Vec::new();
        let mut y = Vec::new();

        for run in runs.iter().filter(|r| r.encoding == encoding.as_str()) {
            let values = run.table.column(column)?;
            let label = label_of(&catalog.groups, run.group);
            x.extend(std::iter::repeat_n(label.to_string(), values.len()));
            y.extend(values.into_iter().map(|v| v / divisor));
        }

        figure.trace(Trace::Box {
            name: label_of(&catalog.encodings, encoding).to_string(),
            x,
            y,
        });
    }

    Ok(figure)
}

/// Stacked bars: one trace per outcome, one bar per (group, encoding).
fn encoding_statistics(runs: &[EncodingRun], catalog: &Catalog) -> Result<Figure> {
    let mut figure = Figure::new(
        Layout::default()
            .with_y_title("Comparison in outputs")
            .with_bar_mode(BarMode::Stack),
    );

    // bars are ordered by group, then encoding
    let mut ordered: Vec<&EncodingRun> = runs.iter().collect();
    let group_rank = |g: &str| catalog.groups.iter().position(|c| c.value == g);
    ordered.sort_by_key(|r| group_rank(r.group));

    let mut groups = Vec::with_capacity(ordered.len());
    let mut encodings = Vec::with_capacity(ordered.len());
    let mut shares = Vec::with_capacity(ordered.len());

    for run in &ordered {
        groups.push(label_of(&catalog.groups, run.group).to_string());
        encodings.push(label_of(&catalog.encodings, run.encoding).to_string());
        shares.push(stats::outcome_percentages(&run.table)?);
    }

    for outcome in Outcome::all() {
        figure.trace(Trace::Bar {
            name: catalog.outcome_label(outcome).to_string(),
            x: vec![groups.clone(), encodings.clone()],
            y: shares.iter().map(|s| s[outcome.index()]).collect(),
        });
    }

    Ok(figure)
}

// ============================================================================
// Parameter comparison
// ============================================================================

fn render_parameters(
    category: &str,
    metric: Metric,
    range: Range,
    source: &DataSource,
    catalog: &Catalog,
) -> Result<Rendered> {
    let base = catalog.base_category.as_str();
    let table = source.comparison_table(base, category)?;

    let values = metric.select(&table)?;
    let bounds = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let keep: Vec<bool> = match bounds {
        Some((min, max)) => {
            let (lo, hi) = range.interval(min, max);
            values.iter().map(|v| *v >= lo && *v <= hi).collect()
        }
        None => vec![false; values.len()],
    };

    let metric_label = label_of(&catalog.comparison_filters, metric.as_str());
    let mut figure = Figure::new(
        Layout::default()
            .with_title("Comparison between two encodings according to static parameters")
            .with_x_title(metric_label)
            .with_y_title("Times per contract (minutes)"),
    );

    let names = table.text_column(NAME).ok();

    for cat in [base, category] {
        let times = table.column(&format!("time_{}", cat))?;

        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut text = names.as_ref().map(|_| Vec::new());

        for (i, (value, time)) in values.iter().zip(times.iter()).enumerate() {
            if !keep[i] {
                continue;
            }
            x.push(*value);
            y.push(time / 60.0);
            if let (Some(text), Some(names)) = (text.as_mut(), names.as_ref()) {
                text.push(names[i].to_string());
            }
        }

        figure.trace(Trace::Scatter {
            name: catalog.category_label(cat).to_string(),
            x,
            y,
            mode: "markers",
            text,
        });
    }

    let mut figures = BTreeMap::new();
    figures.insert(COMPARISON_TIMES, figure);

    Ok(Rendered {
        figures,
        bounds: bounds.map(|(lo, hi)| [lo, hi]),
    })
}

// ============================================================================
// Stage two: solver setups
// ============================================================================

fn render_setups(
    setups: &[String],
    solver: &str,
    source: &DataSource,
    catalog: &Catalog,
) -> Result<Rendered> {
    let tables = setups
        .iter()
        .map(|setup| source.setup_table(setup, solver))
        .collect::<Result<Vec<_>>>()?;

    let solver_label = label_of(&catalog.setup_solvers, solver);

    // time distribution per setup
    let mut time = Figure::new(
        Layout::default()
            .with_title(format!("Times per contract with {}", solver_label))
            .with_y_title("Times per contract (minutes)"),
    );
    for (setup, table) in setups.iter().zip(tables.iter()) {
        let label = label_of(&catalog.setups, setup);
        let y: Vec<f64> = table.column(TIME)?.into_iter().map(|t| t / 60.0).collect();
        time.trace(Trace::Box {
            name: label.to_string(),
            x: vec![label.to_string(); y.len()],
            y,
        });
    }

    // one donut per setup
    let mut outcomes = Figure::new(
        Layout::default()
            .with_title(format!("Outcomes with {}", solver_label))
            .with_grid(1, setups.len().max(1)),
    );
    let labels: Vec<String> = Outcome::all()
        .iter()
        .map(|o| catalog.outcome_label(*o).to_string())
        .collect();
    for (column, (setup, table)) in setups.iter().zip(tables.iter()).enumerate() {
        let label = label_of(&catalog.setups, setup);
        outcomes.trace(Trace::Pie {
            name: label.to_string(),
            labels: labels.clone(),
            values: stats::outcome_totals(table)?.to_vec(),
            hole: 0.4,
            domain: Domain { row: 0, column },
            title: Title::new(label),
        });
    }

    let mut figures = BTreeMap::new();
    figures.insert(SETUP_TIME, time);
    figures.insert(SETUP_OUTCOMES, outcomes);
    figures.insert(SETUP_PAIRED, setup_paired(setups, &tables, catalog)?);

    Ok(Rendered {
        figures,
        bounds: None,
    })
}

/// Times of the same programs under the first two setups.
fn setup_paired(
    setups: &[String],
    tables: &[BenchmarkTable],
    catalog: &Catalog,
) -> Result<Figure> {
    let (Some(left_setup), Some(right_setup)) = (setups.first(), setups.get(1)) else {
        return Ok(Figure::new(
            Layout::default().with_title("Select two setups to compare matching programs"),
        ));
    };
    let (left, right) = (&tables[0], &tables[1]);

    let left_label = label_of(&catalog.setups, left_setup);
    let right_label = label_of(&catalog.setups, right_setup);

    let pairs = pair_by_name(left, right)?;
    let left_times = left.column(TIME)?;
    let right_times = right.column(TIME)?;

    let mut figure = Figure::new(
        Layout::default()
            .with_title(format!("{} programs found in both setups", pairs.len()))
            .with_x_title(format!("{} (minutes)", left_label))
            .with_y_title(format!("{} (minutes)", right_label)),
    );

    figure.trace(Trace::Scatter {
        name: format!("{} vs {}", left_label, right_label),
        x: pairs.iter().map(|p| left_times[p.left] / 60.0).collect(),
        y: pairs.iter().map(|p| right_times[p.right] / 60.0).collect(),
        mode: "markers",
        text: Some(pairs.into_iter().map(|p| p.name).collect()),
    });

    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn stage_ids() {
        for stage in StageId::all() {
            assert_eq!(stage.as_str().parse::<StageId>().unwrap(), stage);
        }
        assert!(matches!(
            "stage-three".parse::<StageId>(),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn range_parsing() {
        assert_eq!(
            Range::parse("10, 90").unwrap(),
            Range {
                low: 10.0,
                high: 90.0
            }
        );
        assert!(Range::parse("90,10").is_err());
        assert!(Range::parse("0,101").is_err());
        assert!(Range::parse("50").is_err());
        assert_eq!(Range::FULL.interval(2.0, 12.0), (2.0, 12.0));
        assert_eq!(
            Range::parse("50,100").unwrap().interval(2.0, 12.0),
            (7.0, 12.0)
        );
    }

    #[test]
    fn query_overrides_defaults() {
        let catalog = Catalog::default();

        let selection = Selection::from_query(
            StageId::Encoding,
            &params(&[("encodings", "pushed_once, alternative_gas_model")]),
            &catalog,
        )
        .unwrap();
        assert_eq!(
            selection,
            Selection::Encoding {
                groups: catalog::selected(&catalog.groups),
                encodings: vec![
                    "pushed_once".to_string(),
                    "alternative_gas_model".to_string()
                ],
            }
        );

        let selection =
            Selection::from_query(StageId::Encoding, &params(&[("groups", "")]), &catalog)
                .unwrap();
        assert!(matches!(selection, Selection::Encoding { groups, .. } if groups.is_empty()));
    }

    #[test]
    fn repeated_list_values_are_dropped() {
        let catalog = Catalog::default();
        let selection = Selection::from_query(
            StageId::Encoding,
            &params(&[("groups", "z3"), ("encodings", "at_most,at_most, pushed_once,at_most")]),
            &catalog,
        )
        .unwrap();
        assert_eq!(
            selection,
            Selection::Encoding {
                groups: vec!["z3".to_string()],
                encodings: vec!["at_most".to_string(), "pushed_once".to_string()],
            }
        );
    }

    #[test]
    fn metric_must_be_offered() {
        let mut catalog = Catalog::default();
        catalog
            .comparison_filters
            .retain(|c| c.value == "init_progr_len");

        let selection = Selection::from_query(
            StageId::Parameters,
            &params(&[("metric", "init_progr_len")]),
            &catalog,
        )
        .unwrap();
        assert!(matches!(
            selection,
            Selection::Parameters {
                metric: Metric::InitialLength,
                ..
            }
        ));

        assert!(matches!(
            Selection::from_query(
                StageId::Parameters,
                &params(&[("metric", "push_per_initial")]),
                &catalog
            ),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn query_rejects_unknown_values() {
        let catalog = Catalog::default();
        assert!(matches!(
            Selection::from_query(StageId::Encoding, &params(&[("groups", "cvc5")]), &catalog),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            Selection::from_query(
                StageId::Parameters,
                &params(&[("metric", "gas_per_push")]),
                &catalog
            ),
            Err(Error::InvalidMetric(_))
        ));
        assert!(matches!(
            Selection::from_query(StageId::Setups, &params(&[("solver", "../z3")]), &catalog),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn parameter_defaults() {
        let catalog = Catalog::default();
        let selection = Selection::defaults(StageId::Parameters, &catalog).unwrap();
        assert_eq!(
            selection,
            Selection::Parameters {
                category: "no_output_before_pop_at_most_pushed_once".to_string(),
                metric: Metric::InitialLength,
                range: Range::FULL,
            }
        );
    }
}
