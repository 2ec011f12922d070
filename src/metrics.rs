//! Dashboard metrics.

use metriken::{Counter, metric};

#[metric(
    name = "tables_loaded",
    description = "Total number of results files parsed"
)]
pub static TABLES_LOADED: Counter = Counter::new();

#[metric(name = "rows_loaded", description = "Total number of result rows parsed")]
pub static ROWS_LOADED: Counter = Counter::new();

#[metric(
    name = "figures_rendered",
    description = "Total number of figures built"
)]
pub static FIGURES_RENDERED: Counter = Counter::new();

#[metric(
    name = "figure_errors",
    description = "Stage renders that failed with a data or selection error"
)]
pub static FIGURE_ERRORS: Counter = Counter::new();

#[metric(
    name = "http_requests",
    description = "Total number of figure API requests"
)]
pub static HTTP_REQUESTS: Counter = Counter::new();

/// Render every registered metric in Prometheus text format.
pub fn prometheus_output() -> String {
    let mut output = String::with_capacity(1024);

    for metric in metriken::metrics().iter() {
        let name = metric.name();

        if name.is_empty() {
            continue;
        }

        let value = match metric.value() {
            Some(v) => v,
            None => continue,
        };

        let prom_name: String = name
            .chars()
            .map(|c: char| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        match value {
            metriken::Value::Counter(v) => {
                output.push_str(&format!("# TYPE {} counter\n", prom_name));
                output.push_str(&format!("{} {}\n", prom_name, v));
            }
            metriken::Value::Gauge(v) => {
                output.push_str(&format!("# TYPE {} gauge\n", prom_name));
                output.push_str(&format!("{} {}\n", prom_name, v));
            }
            _ => {}
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_exported() {
        HTTP_REQUESTS.increment();
        let output = prometheus_output();
        assert!(output.contains("# TYPE http_requests counter"));
        assert!(output.contains("# TYPE tables_loaded counter"));
    }
}
