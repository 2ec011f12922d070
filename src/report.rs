//! Offline outputs: the static HTML report and the encoding summary.

use crate::catalog::{self, Catalog, label_of};
use crate::data::DataSource;
use crate::error::Result;
use crate::format::{format_gas, format_pct, format_secs, or_dash};
use crate::layout::{self, PageMode, StageOutput};
use crate::plots::{self, Selection, StageId};
use crate::stats::{self, Summary};
use crate::table::Outcome;
use serde::Serialize;
use std::collections::BTreeMap;

/// Render the dashboard with the default selection of every stage embedded.
///
/// A stage whose files cannot be read is reported inside the page instead
/// of failing the whole report.
pub fn generate_html_report(source: &DataSource, catalog: &Catalog) -> String {
    let mut outputs = BTreeMap::new();

    for stage in StageId::all() {
        let output = Selection::defaults(stage, catalog)
            .and_then(|selection| plots::render(&selection, source, catalog));

        let output = match output {
            Ok(rendered) => StageOutput::Rendered(rendered),
            Err(e) => {
                tracing::warn!(stage = %stage, error = %e, "stage left out of report");
                StageOutput::Failed {
                    error: e.to_string(),
                }
            }
        };

        outputs.insert(stage.as_str(), output);
    }

    layout::render_page(catalog, &PageMode::Static(outputs))
}

/// Outcome shares and distributions of one `<encoding>_<group>.csv`.
#[derive(Debug, Clone, Serialize)]
pub struct EncodingSummary {
    pub group: String,
    pub encoding: String,
    pub rows: usize,
    /// Percent per outcome, keyed by outcome column.
    pub outcomes: BTreeMap<&'static str, f64>,
    /// Rows with no outcome indicator set.
    pub unclassified: usize,
    /// Solve time in seconds.
    pub time: Option<Summary>,
    pub saved_gas: Option<Summary>,
}

/// Summarize every (group, encoding) of the default stage one selection.
pub fn collect_summary(source: &DataSource, catalog: &Catalog) -> Result<Vec<EncodingSummary>> {
    let mut summaries = Vec::new();

    for group in catalog::selected(&catalog.groups) {
        for encoding in catalog::selected(&catalog.encodings) {
            let table = source.encoding_table(&encoding, &group)?;
            let shares = stats::outcome_percentages(&table)?;
            let rows = table.rows()?;

            let time: Vec<f64> = rows.iter().filter_map(|r| r.time).collect();
            let saved_gas: Vec<f64> = rows.iter().filter_map(|r| r.saved_gas).collect();

            summaries.push(EncodingSummary {
                rows: rows.len(),
                outcomes: Outcome::all()
                    .iter()
                    .map(|o| (o.column(), shares[o.index()]))
                    .collect(),
                unclassified: rows.iter().filter(|r| r.outcome().is_none()).count(),
                time: Summary::from_values(&time),
                saved_gas: Summary::from_values(&saved_gas),
                group: group.clone(),
                encoding,
            });
        }
    }

    Ok(summaries)
}

/// Print summaries as a table.
pub fn print_summary_table(summaries: &[EncodingSummary], catalog: &Catalog) {
    println!(
        "  {:<20} {:<36} {:>6} {:>7} {:>7} {:>7} {:>7} {:>7} {:>6} {:>9} {:>9}",
        "group", "encoding", "rows", "opt", "disc", "less", "same", "none", "unset", "p50 time",
        "p50 gas"
    );
    println!(
        "  {:-<20} {:-<36} {:->6} {:->7} {:->7} {:->7} {:->7} {:->7} {:->6} {:->9} {:->9}",
        "", "", "", "", "", "", "", "", "", "", ""
    );

    for s in summaries {
        let pct = |o: Outcome| format_pct(s.outcomes.get(o.column()).copied().unwrap_or(0.0));

        println!(
            "  {:<20} {:<36} {:>6} {:>7} {:>7} {:>7} {:>7} {:>7} {:>6} {:>9} {:>9}",
            label_of(&catalog.groups, &s.group),
            label_of(&catalog.encodings, &s.encoding),
            s.rows,
            pct(Outcome::AlreadyOptimal),
            pct(Outcome::DiscoveredOptimal),
            pct(Outcome::NonOptimalWithLessGas),
            pct(Outcome::NonOptimalWithSameGas),
            pct(Outcome::NoSolutionFound),
            s.unclassified,
            or_dash(s.time.map(|t| t.median), format_secs),
            or_dash(s.saved_gas.map(|g| g.median), format_gas),
        );
    }
    println!();
}

/// Print summaries as JSON.
pub fn print_summary_json(summaries: &[EncodingSummary]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(summaries)?);
    Ok(())
}
