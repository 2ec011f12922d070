//! Dashboard over Syrup superoptimizer benchmark results.
//!
//! Results are CSV files, one per (encoding, group), (base category,
//! category) or (setup, solver). The dashboard turns the selection made
//! with its controls into Plotly figures: solve time and saved gas box
//! plots, outcome shares as stacked bars or donuts, and category
//! comparisons filtered by a derived metric.

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod format;
pub mod layout;
pub mod logging;
pub mod metric;
pub mod metrics;
pub mod plots;
pub mod report;
pub mod server;
pub mod stats;
pub mod table;

pub use catalog::Catalog;
pub use config::Config;
pub use data::DataSource;
pub use error::{Error, Result};
pub use metric::Metric;
pub use plots::{Rendered, Selection, StageId};
pub use table::BenchmarkTable;
