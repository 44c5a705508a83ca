//! HTML pricing form.
//!
//! Every field arrives as text. Numbers are parsed here (steps, paths and
//! seed as integers), the payoff is trimmed and compiled, and the page is
//! re-rendered with the submitted values and either the estimated price or
//! the error message. All user text written into the page is escaped.

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, Redirect},
    Form,
};
use pricer_pricing::mc::GbmParams;
use pricer_pricing::payoff::parse_payoff_expression;
use tracing::info;

use super::{check_limits, execution_mode, run_blocking, MonteCarloJob};
use crate::error::ApiError;
use crate::routes::AppState;

/// Field names with the values shown on a fresh form.
const DEFAULTS: [(&str, &str); 8] = [
    ("spot", "100"),
    ("rate", "0.05"),
    ("volatility", "0.2"),
    ("maturity", "1"),
    ("steps", "252"),
    ("paths", "20000"),
    ("payoff", "max(S - 100, 0)"),
    ("seed", ""),
];

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/price")
}

/// GET /price
pub async fn show() -> Html<String> {
    Html(render_page(&HashMap::new(), None))
}

/// POST /price
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            let error = ApiError::InvalidRequest(rejection.body_text());
            return Html(render_page(&HashMap::new(), Some(&Outcome::from(error))));
        }
    };

    let outcome = match price_submission(&state, &fields).await {
        Ok(price) => Outcome::Price(price),
        Err(error) => Outcome::from(error),
    };
    Html(render_page(&fields, Some(&outcome)))
}

/// Result shown below the form.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Price(f64),
    Error(String),
}

impl From<ApiError> for Outcome {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::InvalidRequest(_) | ApiError::LimitExceeded { .. } => {
                Outcome::Error(error.to_string())
            }
            ApiError::Pricing(_) | ApiError::Worker(_) => {
                Outcome::Error(format!("Failed to price option: {}", error))
            }
        }
    }
}

async fn price_submission(
    state: &AppState,
    fields: &HashMap<String, String>,
) -> Result<f64, ApiError> {
    let spot = parse_float(fields, "spot")?;
    let rate = parse_float(fields, "rate")?;
    let volatility = parse_float(fields, "volatility")?;
    let maturity = parse_float(fields, "maturity")?;
    let steps = parse_count(fields, "steps")?;
    let paths = parse_count(fields, "paths")?;
    let payoff_text = required(fields, "payoff")?.trim();
    let seed = parse_seed(fields)?;

    check_limits(&state.config, steps, Some(paths))?;
    let payoff = parse_payoff_expression(payoff_text)?;

    let job = MonteCarloJob {
        gbm: GbmParams::new(spot, rate, volatility, maturity),
        steps,
        paths,
        payoff,
        seed,
        mode: execution_mode(&state.config, None),
    };
    let result = run_blocking(move || job.run()).await?;

    info!(steps, paths, price = result.price, "form price computed");
    Ok(result.price)
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ApiError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiError::InvalidRequest(format!("missing form field '{}'", name)))
}

fn parse_float(fields: &HashMap<String, String>, name: &str) -> Result<f64, ApiError> {
    let raw = required(fields, name)?;
    raw.trim().parse().map_err(|_| {
        ApiError::InvalidRequest(format!("{}: could not convert '{}' to a number", name, raw))
    })
}

fn parse_count(fields: &HashMap<String, String>, name: &str) -> Result<usize, ApiError> {
    let raw = required(fields, name)?;
    raw.trim().parse().map_err(|_| {
        ApiError::InvalidRequest(format!(
            "{}: expected a non-negative integer, got '{}'",
            name, raw
        ))
    })
}

fn parse_seed(fields: &HashMap<String, String>) -> Result<Option<u64>, ApiError> {
    let raw = fields.get("seed").map(|s| s.trim()).unwrap_or("");
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        ApiError::InvalidRequest(format!(
            "seed: expected a non-negative integer, got '{}'",
            raw
        ))
    })
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Monte Carlo Option Pricer</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 2rem auto; max-width: 800px; line-height: 1.5; }
        form { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem 1.5rem; }
        label { display: flex; flex-direction: column; font-weight: 600; }
        input[type="text"], input[type="number"] { padding: 0.4rem; font-size: 1rem; }
        .full { grid-column: 1 / -1; }
        .actions { grid-column: 1 / -1; }
        .error { color: #b00020; font-weight: 600; margin-top: 1rem; }
        .result { background: #f5f5f5; padding: 1rem; border-radius: 6px; margin-top: 1rem; }
        .hint { font-size: 0.95rem; color: #444; margin-top: -0.4rem; }
    </style>
</head>
<body>
    <h1>Monte Carlo Option Pricer</h1>
    <p>Simulate option prices under geometric Brownian motion. Supply a payoff expression using <code>S</code> for the terminal price or <code>path</code> for the full simulated path.</p>
"#;

fn render_page(fields: &HashMap<String, String>, outcome: Option<&Outcome>) -> String {
    let value = |name: &str| -> String {
        let shown = fields.get(name).map(String::as_str).unwrap_or_else(|| {
            DEFAULTS
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, default)| *default)
                .unwrap_or("")
        });
        escape_html(shown)
    };

    let mut page = String::from(PAGE_HEAD);
    page.push_str(&format!(
        r#"    <form method="post" action="/price">
        <label>Spot
            <input type="number" name="spot" step="any" value="{spot}" required>
        </label>
        <label>Rate (r)
            <input type="number" name="rate" step="any" value="{rate}" required>
            <span class="hint">Continuously compounded annual rate (e.g., 0.05 for 5%).</span>
        </label>
        <label>Volatility (sigma)
            <input type="number" name="volatility" step="any" value="{volatility}" required>
        </label>
        <label>Maturity (years)
            <input type="number" name="maturity" step="any" value="{maturity}" required>
        </label>
        <label>Steps per path
            <input type="number" name="steps" step="1" min="1" value="{steps}" required>
        </label>
        <label>Simulation paths
            <input type="number" name="paths" step="1" min="1" value="{paths}" required>
        </label>
        <label class="full">Payoff expression
            <input type="text" name="payoff" value="{payoff}" required>
            <span class="hint">Available names: <code>S</code>, <code>path</code>, <code>max</code>, <code>min</code>, <code>abs</code>, <code>exp</code>, <code>log</code>, <code>sqrt</code>, <code>fsum</code> and <code>math.*</code> functions.</span>
        </label>
        <label>Seed (optional)
            <input type="number" name="seed" step="1" value="{seed}">
        </label>
        <div class="actions">
            <button type="submit">Price Option</button>
        </div>
    </form>
"#,
        spot = value("spot"),
        rate = value("rate"),
        volatility = value("volatility"),
        maturity = value("maturity"),
        steps = value("steps"),
        paths = value("paths"),
        payoff = value("payoff"),
        seed = value("seed"),
    ));

    match outcome {
        Some(Outcome::Error(message)) => {
            page.push_str(&format!(
                "    <div class=\"error\">{}</div>\n",
                escape_html(message)
            ));
        }
        Some(Outcome::Price(price)) => {
            page.push_str(&format!(
                "    <div class=\"result\">Estimated price: <strong>{:.6}</strong></div>\n",
                price
            ));
        }
        None => {}
    }

    page.push_str("</body>\n</html>\n");
    page
}
