//! Figure descriptions in the shape Plotly expects (`data` + `layout`).
//!
//! Only the handful of trace types and layout keys the dashboard uses are
//! modelled. Unset options are left out of the JSON so the charting library
//! falls back to its own defaults.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Box {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
    },
    Bar {
        name: String,
        /// One vector per category level; two levels give a grouped axis.
        x: Vec<Vec<String>>,
        y: Vec<f64>,
    },
    Pie {
        name: String,
        labels: Vec<String>,
        values: Vec<f64>,
        hole: f64,
        domain: Domain,
        title: Title,
    },
    Scatter {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        mode: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Vec<String>>,
    },
}

/// Grid cell of a pie trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Domain {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxMode {
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boxmode: Option<BoxMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

impl Layout {
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(Title::new(text));
        self
    }

    pub fn with_x_title(mut self, text: impl Into<String>) -> Self {
        self.xaxis = Some(Axis {
            title: Title::new(text),
        });
        self
    }

    pub fn with_y_title(mut self, text: impl Into<String>) -> Self {
        self.yaxis = Some(Axis {
            title: Title::new(text),
        });
        self
    }

    pub fn with_box_mode(mut self, mode: BoxMode) -> Self {
        self.boxmode = Some(mode);
        self
    }

    pub fn with_bar_mode(mut self, mode: BarMode) -> Self {
        self.barmode = Some(mode);
        self
    }

    pub fn with_grid(mut self, rows: usize, columns: usize) -> Self {
        self.grid = Some(Grid { rows, columns });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn box_trace_json() {
        let mut figure = Figure::new(
            Layout::default()
                .with_y_title("Times per contract (minutes)")
                .with_box_mode(BoxMode::Group),
        );
        figure.trace(Trace::Box {
            name: "at_most".to_string(),
            x: vec!["z3".to_string()],
            y: vec![1.5],
        });

        assert_eq!(
            serde_json::to_value(&figure).unwrap(),
            json!({
                "data": [{"type": "box", "name": "at_most", "x": ["z3"], "y": [1.5]}],
                "layout": {
                    "yaxis": {"title": {"text": "Times per contract (minutes)"}},
                    "boxmode": "group"
                }
            })
        );
    }

    #[test]
    fn pie_and_scatter_json() {
        let pie = Trace::Pie {
            name: "best".to_string(),
            labels: vec!["Already optimal".to_string()],
            values: vec![3.0],
            hole: 0.4,
            domain: Domain { row: 0, column: 1 },
            title: Title::new("Best"),
        };
        let value = serde_json::to_value(&pie).unwrap();
        assert_eq!(value["type"], "pie");
        assert_eq!(value["domain"], json!({"row": 0, "column": 1}));

        let scatter = Trace::Scatter {
            name: "a".to_string(),
            x: vec![1.0],
            y: vec![2.0],
            mode: "markers",
            text: None,
        };
        let value = serde_json::to_value(&scatter).unwrap();
        assert_eq!(value["type"], "scatter");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn stacked_bar_layout() {
        let layout = Layout::default().with_bar_mode(BarMode::Stack).with_grid(1, 2);
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value, json!({"barmode": "stack", "grid": {"rows": 1, "columns": 2}}));
    }
}
