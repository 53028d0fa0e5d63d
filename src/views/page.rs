//! Scoring page
//!
//! Server-rendered single page: sidebar controls, applicant form, and the
//! results area once something has been submitted. The sidebar inputs join
//! the form through the `form` attribute so one submit carries everything.

use std::fmt::Write;

use crate::logic::features::FEATURE_LAYOUT;
use crate::logic::model::threshold::{MAX_THRESHOLD, MIN_THRESHOLD, THRESHOLD_STEP};
use crate::logic::model::ModelKind;
use crate::logic::report::{Explanation, ScoreReport};
use crate::models::{Applicant, FieldKind, FieldSpec, ScoreControls, FORM_FIELDS};

const FORM_ID: &str = "client-form";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; color: #262730; }
aside { width: 260px; min-height: 100vh; background: #f0f2f6; padding: 1.5rem; box-sizing: border-box; }
main { flex: 1; max-width: 760px; padding: 1.5rem 2rem; }
label { display: block; margin-top: .75rem; font-size: .9rem; }
input, select { width: 100%; padding: .35rem; box-sizing: border-box; }
button { margin-top: 1rem; padding: .5rem 1.2rem; }
.caption { color: #808495; font-size: .85rem; }
.metrics { display: flex; gap: 3rem; margin: 1rem 0; }
.metric span { display: block; font-size: 2rem; }
.banner { padding: .8rem 1rem; border-radius: .4rem; margin: .75rem 0; }
.risky { background: #ffe2e2; color: #7d1a1a; }
.safe { background: #dff5e3; color: #1b5e2b; }
.info { background: #e3effc; color: #124875; }
.error { background: #ffe2e2; color: #7d1a1a; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .3rem .5rem; border-bottom: 1px solid #e6e9ef; }
"#;

/// What the page shows below the form
pub enum Outcome {
    /// Nothing submitted yet
    Pending,
    Scored(ScoreReport),
    Failed(String),
}

/// Everything needed to render one page
pub struct PageView {
    pub controls: ScoreControls,
    pub applicant: Applicant,
    pub outcome: Outcome,
}

impl PageView {
    pub fn fresh() -> Self {
        Self {
            controls: ScoreControls::default(),
            applicant: Applicant::default(),
            outcome: Outcome::Pending,
        }
    }
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(view: &PageView) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Credit Scoring - Give Me Some Credit</title>");
    let _ = write!(html, "<style>{}</style></head><body>", STYLE);

    render_sidebar(&mut html, &view.controls);

    html.push_str("<main><h1>Credit Scoring</h1>");
    html.push_str(
        "<p>Estimated probability of serious delinquency within two years \
         (<code>SeriousDlqin2yrs</code>) from models trained on <em>Give Me Some Credit</em>.</p>",
    );
    html.push_str(
        "<p class=\"caption\">Educational demo. Do not use for real credit decisions.</p>",
    );

    render_form(&mut html, &view.applicant);

    match &view.outcome {
        Outcome::Pending => {}
        Outcome::Scored(report) => render_report(&mut html, report),
        Outcome::Failed(message) => {
            let _ = write!(html, "<div class=\"banner error\">{}</div>", escape(message));
        }
    }

    html.push_str("</main></body></html>");
    html
}

fn render_sidebar(html: &mut String, controls: &ScoreControls) {
    html.push_str("<aside><h2>Settings</h2>");

    let _ = write!(html, "<label for=\"model\">Model</label><select id=\"model\" name=\"model\" form=\"{}\">", FORM_ID);
    for kind in ModelKind::ALL {
        let selected = if kind == controls.model { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            kind.as_str(),
            selected,
            kind.label()
        );
    }
    html.push_str("</select>");

    let _ = write!(
        html,
        "<label for=\"threshold\">Threshold (risk cutoff): <output id=\"threshold-value\">{:.2}</output></label>\
         <input type=\"range\" id=\"threshold\" name=\"threshold\" form=\"{}\" \
         min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\" \
         oninput=\"document.getElementById('threshold-value').value = Number(this.value).toFixed(2)\">",
        controls.threshold,
        FORM_ID,
        MIN_THRESHOLD,
        MAX_THRESHOLD,
        THRESHOLD_STEP,
        controls.threshold
    );

    html.push_str("</aside>");
}

fn format_value(spec: &FieldSpec, value: f64) -> String {
    match spec.kind {
        FieldKind::Integer => format!("{}", value as i64),
        FieldKind::Real => format!("{}", value),
    }
}

fn render_form(html: &mut String, applicant: &Applicant) {
    html.push_str("<h2>Applicant data</h2>");
    let _ = write!(html, "<form id=\"{}\" method=\"post\" action=\"/\">", FORM_ID);

    for spec in &FORM_FIELDS {
        let _ = write!(
            html,
            "<label for=\"{name}\">{label}</label>\
             <input type=\"number\" id=\"{name}\" name=\"{name}\" \
             min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" required>",
            name = spec.name,
            label = escape(spec.label),
            min = format_value(spec, spec.min),
            max = format_value(spec, spec.max),
            step = spec.step,
            value = format_value(spec, applicant.value(spec.feature)),
        );
    }

    html.push_str("<button type=\"submit\">Calculate score</button></form>");
}

fn render_report(html: &mut String, report: &ScoreReport) {
    let _ = write!(
        html,
        "<h2>Result</h2><p class=\"caption\">{} &middot; submission {}</p>\
         <div class=\"metrics\">\
         <div class=\"metric\">Delinquency probability<span>{}</span></div>\
         <div class=\"metric\">Probability (%)<span>{}</span></div>\
         </div>",
        report.model.label(),
        report.submission_id,
        report.probability_text(),
        report.percent_text(),
    );

    let class = if report.decision.is_risky() { "risky" } else { "safe" };
    let _ = write!(
        html,
        "<div class=\"banner {}\">Decision: {} ({})</div>",
        class,
        report.decision,
        escape(&report.decision_rule)
    );

    match &report.explanation {
        Explanation::Available { top_factors, summary } => {
            html.push_str("<h3>Top factors (Logistic Regression)</h3>");
            html.push_str("<p class=\"caption\">Approximate impact of each feature on the prediction.</p>");
            html.push_str(
                "<table><thead><tr><th>feature</th><th>input value</th><th>impact</th>\
                 <th>contribution</th></tr></thead><tbody>",
            );
            for row in top_factors {
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:+.4}</td></tr>",
                    escape(row.feature),
                    row.input_value,
                    row.direction.label(),
                    row.contribution
                );
            }
            html.push_str("</tbody></table>");
            let _ = write!(html, "<p>{}</p>", escape(summary));
        }
        Explanation::Unavailable { message } => {
            let _ = write!(html, "<div class=\"banner info\">{}</div>", escape(message));
        }
    }

    html.push_str("<details><summary>Show data sent to the model</summary><table><thead><tr>");
    for name in FEATURE_LAYOUT {
        let _ = write!(html, "<th>{}</th>", escape(name));
    }
    html.push_str("</tr></thead><tbody><tr class=\"record\">");
    for entry in &report.record {
        let _ = write!(html, "<td>{}</td>", entry.value);
    }
    html.push_str("</tr></tbody></table></details>");
}
