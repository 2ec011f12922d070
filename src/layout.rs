//! The dashboard page.
//!
//! The layout is described once by [`stages`]: every stage is a title, a
//! set of controls and a set of figure slots, with labels taken from the
//! [`Catalog`]. [`render_page`] turns that description into a single HTML
//! document. In live mode the page asks the figure API for new figures on
//! every control change; in static mode the figures are embedded.

use crate::catalog::{Catalog, Choice};
use crate::plots::{self, Rendered, StageId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Plotly bundle used by the page.
const PLOTLY_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub enum ControlKind<'a> {
    Checklist(&'a [Choice]),
    Radio(&'a [Choice]),
    /// Percent range over the selected metric.
    RangeSlider,
}

pub struct Control<'a> {
    /// Query parameter the control sets.
    pub param: &'static str,
    pub title: String,
    pub kind: ControlKind<'a>,
}

pub struct Slot {
    pub id: &'static str,
    /// Wide slots take seven of twelve columns, narrow ones five.
    pub wide: bool,
}

pub struct Stage<'a> {
    pub id: StageId,
    pub title: String,
    pub controls: Vec<Control<'a>>,
    pub slots: Vec<Slot>,
}

/// The dashboard, top to bottom.
pub fn stages(catalog: &Catalog) -> Vec<Stage<'_>> {
    vec![
        Stage {
            id: StageId::Encoding,
            title: "Stage one: Determining the best encoding".to_string(),
            controls: vec![
                Control {
                    param: "groups",
                    title: "Choose solver option:".to_string(),
                    kind: ControlKind::Checklist(&catalog.groups),
                },
                Control {
                    param: "encodings",
                    title: "Choose encoding option:".to_string(),
                    kind: ControlKind::Checklist(&catalog.encodings),
                },
            ],
            slots: vec![
                Slot {
                    id: plots::ENCODING_TIME,
                    wide: true,
                },
                Slot {
                    id: plots::ENCODING_STATISTICS,
                    wide: false,
                },
                Slot {
                    id: plots::ENCODING_GAS,
                    wide: true,
                },
            ],
        },
        Stage {
            id: StageId::Parameters,
            title: "Determine possible parameters that affect the encoding".to_string(),
            controls: vec![
                Control {
                    param: "category",
                    title: format!(
                        "Choose category to compare against {}:",
                        catalog.base_category_label.to_lowercase()
                    ),
                    kind: ControlKind::Radio(&catalog.categories),
                },
                Control {
                    param: "metric",
                    title: "Choose comparison filter:".to_string(),
                    kind: ControlKind::Radio(&catalog.comparison_filters),
                },
                Control {
                    param: "range",
                    title: "Restrict the filter range (percent of its span):".to_string(),
                    kind: ControlKind::RangeSlider,
                },
            ],
            slots: vec![Slot {
                id: plots::COMPARISON_TIMES,
                wide: true,
            }],
        },
        Stage {
            id: StageId::Setups,
            title: "Stage two: Determining the best solver setup".to_string(),
            controls: vec![
                Control {
                    param: "setups",
                    title: "Choose setups:".to_string(),
                    kind: ControlKind::Checklist(&catalog.setups),
                },
                Control {
                    param: "solver",
                    title: "Choose solver:".to_string(),
                    kind: ControlKind::Radio(&catalog.setup_solvers),
                },
            ],
            slots: vec![
                Slot {
                    id: plots::SETUP_TIME,
                    wide: true,
                },
                Slot {
                    id: plots::SETUP_OUTCOMES,
                    wide: false,
                },
                Slot {
                    id: plots::SETUP_PAIRED,
                    wide: true,
                },
            ],
        },
    ]
}

/// Outcome of rendering one stage ahead of time.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    Rendered(Rendered),
    Failed { error: String },
}

pub enum PageMode {
    /// Controls fetch figures from the server.
    Live,
    /// Figures are embedded, keyed by stage id; controls are disabled.
    Static(BTreeMap<&'static str, StageOutput>),
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn render_choices(out: &mut String, stage: StageId, param: &str, input: &str, choices: &[Choice]) {
    for choice in choices {
        let _ = write!(
            out,
            r#"<label class="choice"><input type="{input}" name="{stage}-{param}" value="{value}"{checked}>{label}</label>"#,
            input = input,
            stage = stage,
            param = param,
            value = escape_html(&choice.value),
            checked = if choice.selected { " checked" } else { "" },
            label = escape_html(&choice.label),
        );
    }
}

fn render_radio(out: &mut String, stage: StageId, param: &str, choices: &[Choice]) {
    // exactly one option of a radio group starts checked
    let default = crate::catalog::selected_one(choices);
    for choice in choices {
        let _ = write!(
            out,
            r#"<label class="choice"><input type="radio" name="{stage}-{param}" value="{value}"{checked}>{label}</label>"#,
            stage = stage,
            param = param,
            value = escape_html(&choice.value),
            checked = if Some(choice.value.as_str()) == default {
                " checked"
            } else {
                ""
            },
            label = escape_html(&choice.label),
        );
    }
}

fn render_control(out: &mut String, stage: StageId, control: &Control) {
    let kind = match control.kind {
        ControlKind::Checklist(_) => "checklist",
        ControlKind::Radio(_) => "radio",
        ControlKind::RangeSlider => "range",
    };

    let _ = write!(
        out,
        r#"<div class="control" data-control="{}" data-kind="{}"><h5>{}</h5>"#,
        control.param,
        kind,
        escape_html(&control.title)
    );

    match control.kind {
        ControlKind::Checklist(choices) => {
            render_choices(out, stage, control.param, "checkbox", choices)
        }
        ControlKind::Radio(choices) => render_radio(out, stage, control.param, choices),
        ControlKind::RangeSlider => {
            out.push_str(
                r#"<input class="range-low" type="range" min="0" max="100" step="1" value="0"><input class="range-high" type="range" min="0" max="100" step="1" value="100"><div class="bounds"></div>"#,
            );
        }
    }

    out.push_str("</div>");
}

fn render_stage(out: &mut String, stage: &Stage) {
    let _ = write!(
        out,
        r#"<section class="stage" data-stage="{}"><h3>{}</h3><div class="row"><div class="pretty_container five columns">"#,
        stage.id,
        escape_html(&stage.title)
    );

    for control in &stage.controls {
        render_control(out, stage.id, control);
    }
    out.push_str(r#"<div class="error"></div></div>"#);

    for slot in &stage.slots {
        let _ = write!(
            out,
            r#"<div class="pretty_container {} columns"><div class="graph" id="{}"></div></div>"#,
            if slot.wide { "seven" } else { "five" },
            slot.id
        );
    }

    out.push_str("</div></section>");
}

/// JSON that is safe to place inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// Render the complete dashboard document.
pub fn render_page(catalog: &Catalog, mode: &PageMode) -> String {
    let mut body = String::new();
    for stage in stages(catalog) {
        render_stage(&mut body, &stage);
    }

    let (mode_name, static_data) = match mode {
        PageMode::Live => ("live", "null".to_string()),
        PageMode::Static(outputs) => ("static", script_json(outputs)),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f2f2f2;
            color: #333;
        }}
        header, h3 {{
            text-align: center;
        }}
        header h2 {{
            margin-bottom: 0;
        }}
        header h4 {{
            margin-top: 0;
            font-weight: normal;
        }}
        h3 {{
            margin: 25px 0;
        }}
        .row {{
            display: grid;
            grid-template-columns: repeat(12, 1fr);
            gap: 20px;
            margin-bottom: 20px;
        }}
        .five {{
            grid-column: span 5;
        }}
        .seven {{
            grid-column: span 7;
        }}
        .pretty_container {{
            background: white;
            border-radius: 5px;
            padding: 15px;
            box-shadow: 2px 2px 2px lightgrey;
        }}
        @media (max-width: 900px) {{
            .five, .seven {{
                grid-column: span 12;
            }}
        }}
        .control h5 {{
            text-align: center;
            margin: 15px 0 10px 0;
        }}
        .choice {{
            display: inline-block;
            margin-left: 20px;
        }}
        .choice input {{
            margin-right: 5px;
        }}
        .control input[type=range] {{
            width: 100%;
        }}
        .bounds {{
            text-align: center;
            color: #7f8c8d;
        }}
        .error {{
            color: #c0392b;
            text-align: center;
            margin-top: 10px;
        }}
    </style>
</head>
<body>
    <header>
        <h2>{title}</h2>
        <h4>{subtitle}</h4>
    </header>
    {body}
    <script>
        const MODE = "{mode}";
        const STATIC_DATA = {static_data};

        function stageParams(section) {{
            const params = new URLSearchParams();
            section.querySelectorAll('[data-control]').forEach(control => {{
                const name = control.dataset.control;
                const kind = control.dataset.kind;
                if (kind === 'checklist') {{
                    const values = Array.from(control.querySelectorAll('input:checked')).map(i => i.value);
                    params.set(name, values.join(','));
                }} else if (kind === 'radio') {{
                    const checked = control.querySelector('input:checked');
                    if (checked) params.set(name, checked.value);
                }} else if (kind === 'range') {{
                    let low = Number(control.querySelector('.range-low').value);
                    let high = Number(control.querySelector('.range-high').value);
                    if (low > high) [low, high] = [high, low];
                    params.set(name, low + ',' + high);
                }}
            }});
            return params;
        }}

        function showError(section, message) {{
            section.querySelector('.error').textContent = message;
        }}

        function draw(section, rendered) {{
            if (rendered.error) {{
                showError(section, rendered.error);
                return;
            }}
            for (const [id, figure] of Object.entries(rendered.figures)) {{
                Plotly.react(id, figure.data, figure.layout, {{ responsive: true }});
            }}
            const bounds = section.querySelector('.bounds');
            if (bounds) {{
                bounds.textContent = rendered.bounds
                    ? 'Filter values from ' + rendered.bounds[0].toFixed(2) + ' to ' + rendered.bounds[1].toFixed(2)
                    : '';
            }}
        }}

        async function refresh(section) {{
            showError(section, '');
            try {{
                const url = '/api/figures/' + section.dataset.stage + '?' + stageParams(section);
                const response = await fetch(url);
                const body = await response.json();
                if (!response.ok) {{
                    showError(section, body.error);
                    return;
                }}
                draw(section, body);
            }} catch (e) {{
                showError(section, String(e));
            }}
        }}

        document.querySelectorAll('section.stage').forEach(section => {{
            if (MODE === 'static') {{
                const rendered = STATIC_DATA[section.dataset.stage];
                if (rendered) draw(section, rendered);
                section.querySelectorAll('input').forEach(i => i.disabled = true);
                return;
            }}
            section.querySelectorAll('input').forEach(i => {{
                i.addEventListener('change', () => refresh(section));
            }});
            refresh(section);
        }});
    </script>
</body>
</html>
"##,
        title = escape_html(&catalog.title),
        subtitle = escape_html(&catalog.subtitle),
        plotly = PLOTLY_URL,
        body = body,
        mode = mode_name,
        static_data = static_data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn every_stage_has_controls_and_slots() {
        let catalog = Catalog::default();
        let stages = stages(&catalog);
        assert_eq!(
            stages.iter().map(|s| s.id).collect::<Vec<_>>(),
            StageId::all().to_vec()
        );
        for stage in &stages {
            assert!(!stage.controls.is_empty());
            assert!(!stage.slots.is_empty());
        }
    }

    #[test]
    fn live_page_contains_controls() {
        let page = render_page(&Catalog::default(), &PageMode::Live);
        assert!(page.contains(r#"const MODE = "live";"#));
        assert!(page.contains(r#"data-stage="encoding""#));
        assert!(page.contains(r#"data-stage="parameters""#));
        assert!(page.contains(r#"data-stage="setups""#));
        assert!(page.contains(
            r#"<input type="checkbox" name="encoding-encodings" value="at_most" checked>At most one uninterpreted function"#
        ));
        assert!(page.contains(
            r#"<input type="checkbox" name="encoding-encodings" value="pushed_once">"#
        ));
        assert!(page.contains(r#"id="encoding-statistics""#));
        assert!(page.contains(r#"data-kind="range""#));
    }

    #[test]
    fn radio_defaults_to_first_option() {
        let mut catalog = Catalog::default();
        for c in catalog.setup_solvers.iter_mut() {
            c.selected = false;
        }
        let page = render_page(&catalog, &PageMode::Live);
        assert!(page.contains(
            r#"<input type="radio" name="setups-solver" value="barcelogic" checked>"#
        ));
        assert!(page.contains(r#"<input type="radio" name="setups-solver" value="z3">"#));
    }

    #[test]
    fn labels_are_escaped() {
        let mut catalog = Catalog::default();
        catalog.title = "<script>alert(1)</script>".to_string();
        let page = render_page(&catalog, &PageMode::Live);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn static_page_embeds_outputs() {
        let mut outputs = BTreeMap::new();
        outputs.insert(
            "setups",
            StageOutput::Failed {
                error: "results file not found: </script>".to_string(),
            },
        );
        let page = render_page(&Catalog::default(), &PageMode::Static(outputs));
        assert!(page.contains(r#"const MODE = "static";"#));
        assert!(page.contains(r#"{"setups":{"error":"results file not found: <\/script>"}}"#));
    }
}
