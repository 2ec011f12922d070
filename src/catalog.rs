//! Display names and control options for the dashboard.
//!
//! The catalog is plain configuration: it is built once (defaults, possibly
//! overridden from the config file), validated, and then handed by reference
//! to everything that renders labels. Nothing in here is mutated at runtime.

use crate::metric::Metric;
use crate::table::Outcome;
use serde::{Deserialize, Serialize};

/// One selectable option of a checklist or radio control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
    /// Selected when the dashboard first loads.
    #[serde(default)]
    pub selected: bool,
}

impl Choice {
    pub fn new(label: &str, value: &str, selected: bool) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    pub title: String,
    pub subtitle: String,

    /// Run groups of stage one (a solver, or the combined results).
    pub groups: Vec<Choice>,
    /// Encodings compared in stage one.
    pub encodings: Vec<Choice>,

    /// Category every parameter comparison is made against.
    pub base_category: String,
    pub base_category_label: String,
    pub categories: Vec<Choice>,
    /// Metrics offered as comparison filter. Values are metric identifiers.
    pub comparison_filters: Vec<Choice>,

    pub setups: Vec<Choice>,
    pub setup_solvers: Vec<Choice>,

    /// Display names of the outcome categories, keyed by indicator column.
    pub outcomes: Vec<Choice>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            title: "Syrup Data Visualizer".to_string(),
            subtitle: "A detailed analysis on determining the best options for including Syrup in a compiler".to_string(),
            groups: vec![
                Choice::new("Combined results", "combined", true),
                Choice::new("Barcelogic", "barcelogic", true),
                Choice::new("Z3", "z3", true),
                Choice::new("OptiMathSAT", "oms", true),
            ],
            encodings: vec![
                Choice::new("Initial configuration", "initial_configuration", true),
                Choice::new("At most one uninterpreted function", "at_most", true),
                Choice::new("Every numerical value must be pushed", "pushed_once", false),
                Choice::new("No output before a POP instruction", "no_output_before_pop", false),
                Choice::new("Alternative gas model", "alternative_gas_model", false),
            ],
            base_category: "no_output_before_pop".to_string(),
            base_category_label: "No output before pop".to_string(),
            categories: vec![
                Choice::new(
                    "No output before pop + at most",
                    "no_output_before_pop_at_most",
                    false,
                ),
                Choice::new(
                    "No output before pop + pushed once",
                    "no_output_before_pop_pushed_once",
                    false,
                ),
                Choice::new(
                    "No output before pop + at most + pushed once",
                    "no_output_before_pop_at_most_pushed_once",
                    true,
                ),
            ],
            comparison_filters: vec![
                Choice::new("Initial program length", "init_progr_len", true),
                Choice::new(
                    "Relation between program length lower bound and initial program length",
                    "initial_size_relation",
                    false,
                ),
                Choice::new(
                    "Number of necessary PUSHx instructions",
                    "number_of_necessary_push",
                    false,
                ),
                Choice::new(
                    "Number of necessary uninterpreted instructions",
                    "number_of_necessary_uninterpreted_instructions",
                    false,
                ),
                Choice::new(
                    "Relation between number of necessary PUSHx instructions and initial program length",
                    "push_per_initial",
                    false,
                ),
                Choice::new(
                    "Relation between number of necessary uninterpreted instructions and initial program length",
                    "uninterpreted_per_initial",
                    false,
                ),
                Choice::new(
                    "Relation between number of necessary PUSHx instructions and program length lower bound",
                    "push_per_expected",
                    false,
                ),
                Choice::new(
                    "Relation between number of necessary uninterpreted instructions and program length lower bound",
                    "uninterpreted_per_expected",
                    false,
                ),
            ],
            setups: vec![
                Choice::new("Best encoding", "best_encoding", true),
                Choice::new("Best encoding on CAV benchmarks", "cav_benchmarks", true),
            ],
            setup_solvers: vec![
                Choice::new("Barcelogic", "barcelogic", true),
                Choice::new("Z3", "z3", false),
                Choice::new("OptiMathSAT", "oms", false),
            ],
            outcomes: vec![
                Choice::new("Already optimal", "already_optimal", false),
                Choice::new("Discovered optimal", "discovered_optimal", false),
                Choice::new("Non optimal with less gas", "non_optimal_with_less_gas", false),
                Choice::new("Non optimal with same gas", "non_optimal_with_same_gas", false),
                Choice::new("No solution found", "no_solution_found", false),
            ],
        }
    }
}

impl Catalog {
    /// Check that every option list can drive the dashboard.
    pub fn validate(&self) -> Result<(), String> {
        let lists = [
            ("groups", &self.groups),
            ("encodings", &self.encodings),
            ("categories", &self.categories),
            ("comparison_filters", &self.comparison_filters),
            ("setups", &self.setups),
            ("setup_solvers", &self.setup_solvers),
        ];

        for (name, choices) in lists {
            if choices.is_empty() {
                return Err(format!("catalog.{} must not be empty", name));
            }
            for choice in choices.iter() {
                if !is_file_component(&choice.value) {
                    return Err(format!(
                        "catalog.{}: '{}' is not a valid file name component",
                        name, choice.value
                    ));
                }
            }
        }

        if !is_file_component(&self.base_category) {
            return Err(format!(
                "catalog.base_category: '{}' is not a valid file name component",
                self.base_category
            ));
        }

        for filter in &self.comparison_filters {
            filter
                .value
                .parse::<Metric>()
                .map_err(|e| format!("catalog.comparison_filters: {}", e))?;
        }

        for outcome in &self.outcomes {
            if !Outcome::all().iter().any(|o| o.column() == outcome.value) {
                return Err(format!(
                    "catalog.outcomes: unknown outcome '{}'",
                    outcome.value
                ));
            }
        }

        Ok(())
    }

    pub fn outcome_label(&self, outcome: Outcome) -> &str {
        label_of(&self.outcomes, outcome.column())
    }

    /// Label of a category, including the base category.
    pub fn category_label<'a>(&'a self, value: &'a str) -> &'a str {
        if value == self.base_category {
            &self.base_category_label
        } else {
            label_of(&self.categories, value)
        }
    }
}

/// Label of `value` in `choices`, or the value itself when it is not listed.
pub fn label_of<'a>(choices: &'a [Choice], value: &'a str) -> &'a str {
    choices
        .iter()
        .find(|c| c.value == value)
        .map(|c| c.label.as_str())
        .unwrap_or(value)
}

/// Values selected by default.
pub fn selected(choices: &[Choice]) -> Vec<String> {
    choices
        .iter()
        .filter(|c| c.selected)
        .map(|c| c.value.clone())
        .collect()
}

/// The default of a single-choice control: the first selected option, or
/// the first option when none is marked.
pub fn selected_one(choices: &[Choice]) -> Option<&str> {
    choices
        .iter()
        .find(|c| c.selected)
        .or_else(|| choices.first())
        .map(|c| c.value.as_str())
}

pub fn contains(choices: &[Choice], value: &str) -> bool {
    choices.iter().any(|c| c.value == value)
}

/// Values end up in file names, so only a conservative character set is
/// accepted.
pub fn is_file_component(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
