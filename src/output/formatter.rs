use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::model::{apply_deltas, Customer, DeltaMap, Feature, Inputs, Prediction, Weights};

const DEFAULT_BAR_WIDTH: usize = 20;
const FEATURE_COLUMN: usize = 18;

/// Presentation options shared by the text reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportStyle {
    pub use_colors: bool,
    pub bar_width: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            use_colors: false,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

impl ReportStyle {
    /// Colors and bar width detected from stdout.
    pub fn detect() -> Self {
        Self {
            use_colors: should_use_colors(),
            bar_width: bar_width(),
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Bar width scaled to the terminal, or a fixed width for pipes
pub fn bar_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) => (w as usize / 4).clamp(10, 40),
        None => DEFAULT_BAR_WIDTH,
    }
}

/// Fraction on the 0..1 scale as a percentage with one decimal: 0.602 -> "60.2%"
pub fn format_pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

/// Fraction as percentage points with two decimals: 0.0123 -> "1.23"
pub fn format_pp(x: f64) -> String {
    format!("{:.2}", x * 100.0)
}

/// Like `format_pp` but always signed: "+1.23", "-0.40"
pub fn format_signed_pp(x: f64) -> String {
    format!("{:+.2}", x * 100.0)
}

/// Horizontal bar for a fraction. Out-of-range values are clamped for display.
pub fn format_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Pretty-printed JSON for scripting
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report as JSON")
}

fn heading(text: String, style: ReportStyle) -> String {
    if style.use_colors {
        text.bold().to_string()
    } else {
        text
    }
}

fn dim(text: String, style: ReportStyle) -> String {
    if style.use_colors {
        text.dimmed().to_string()
    } else {
        text
    }
}

fn signed(text: String, value: f64, style: ReportStyle) -> String {
    if !style.use_colors {
        text
    } else if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn weight_lines(weights: &Weights, customer: Customer, style: ReportStyle) -> Vec<String> {
    let mut lines: Vec<String> = weights.weights[customer]
        .iter()
        .map(|(feature, w)| {
            format!(
                "  {:<width$} {:>6}%  {}",
                feature.name(),
                format_pp(*w),
                format_bar(*w, style.bar_width),
                width = FEATURE_COLUMN
            )
        })
        .collect();
    lines.push(dim(
        format!("  Intercept b = {}", format_pp(weights.intercept[customer])),
        style,
    ));
    lines
}

/// Usage-adjusted weights and intercepts, one block per customer
pub fn format_weights_report(weights: &Weights, alpha: f64, style: ReportStyle) -> String {
    let mut blocks = vec![dim(format!("α (usage emphasis): {:.2}", alpha), style)];
    for customer in Customer::ALL {
        let mut lines = vec![heading(
            format!("{} - Usage-adjusted weights", customer),
            style,
        )];
        lines.extend(weight_lines(weights, customer, style));
        blocks.push(lines.join("\n"));
    }
    blocks.join("\n\n")
}

fn score_line(feature: Feature, base: f64, new: f64, style: ReportStyle) -> String {
    if (new - base).abs() < f64::EPSILON {
        format!(
            "  {:<width$} {:>6}",
            feature.name(),
            format_pct(base),
            width = FEATURE_COLUMN
        )
    } else {
        let shift = signed(format!("({} pp)", format_signed_pp(new - base)), new - base, style);
        format!(
            "  {:<width$} {:>6} -> {:>6} {}",
            feature.name(),
            format_pct(base),
            format_pct(new),
            shift,
            width = FEATURE_COLUMN
        )
    }
}

fn target_line(pred: f64, target: f64, style: ReportStyle) -> String {
    let gap = target - pred;
    if gap <= 0.0 {
        signed(format!("  Target {} met", format_pct(target)), 1.0, style)
    } else {
        dim(
            format!("  Target {}: {} pp to go", format_pct(target), format_pp(gap)),
            style,
        )
    }
}

/// What-if report: adjusted feature scores, predicted overall and weights
///
/// `inputs` and `deltas` must be the ones `prediction` was computed from.
pub fn format_prediction_report(
    inputs: &Inputs,
    deltas: Option<&DeltaMap>,
    prediction: &Prediction,
    target: f64,
    style: ReportStyle,
) -> String {
    let weights = Weights {
        weights: prediction.weights,
        intercept: prediction.intercept,
    };
    let mut blocks = vec![dim(format!("α (usage emphasis): {:.2}", inputs.alpha), style)];

    for customer in Customer::ALL {
        let base = &inputs.feature_scores[customer];
        let adjusted = match deltas {
            Some(d) => apply_deltas(base, &d[customer]),
            None => *base,
        };
        let outcome = prediction.result[customer];

        let mut lines = vec![heading(format!("{} - What-if", customer), style)];
        lines.extend(
            base.iter()
                .map(|(feature, b)| score_line(feature, *b, adjusted[feature], style)),
        );
        lines.push(format!(
            "  Predicted overall  {}",
            format_bar(outcome.pred, style.bar_width)
        ));
        lines.push(format!(
            "  Now: {} · Pred: {} · Δ: {} pp",
            format_pct(outcome.now),
            format_pct(outcome.pred),
            signed(format_signed_pp(outcome.delta), outcome.delta, style)
        ));
        lines.push(target_line(outcome.pred, target, style));
        lines.push(String::new());
        lines.extend(weight_lines(&weights, customer, style));
        blocks.push(lines.join("\n"));
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{compute_weights, predict_overall};

    fn plain() -> ReportStyle {
        ReportStyle {
            use_colors: false,
            bar_width: 10,
        }
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(0.602), "60.2%");
        assert_eq!(format_pct(1.0), "100.0%");
        assert_eq!(format_pct(0.0), "0.0%");
    }

    #[test]
    fn test_format_pp() {
        assert_eq!(format_pp(0.0123), "1.23");
        assert_eq!(format_pp(-0.004), "-0.40");
    }

    #[test]
    fn test_format_signed_pp() {
        assert_eq!(format_signed_pp(0.0123), "+1.23");
        assert_eq!(format_signed_pp(-0.0123), "-1.23");
    }

    #[test]
    fn test_format_bar_half() {
        assert_eq!(format_bar(0.5, 10), "█████░░░░░");
    }

    #[test]
    fn test_format_bar_clamps_for_display() {
        assert_eq!(format_bar(1.4, 4), "████");
        assert_eq!(format_bar(-0.2, 4), "░░░░");
        assert_eq!(format_bar(f64::NAN, 4), "░░░░");
    }

    #[test]
    fn test_weights_report_lists_every_feature() {
        let inputs = Inputs::seed();
        let report = format_weights_report(&compute_weights(&inputs), inputs.alpha, plain());
        assert!(report.starts_with("α (usage emphasis): 1.00"));
        assert!(report.contains("AWS - Usage-adjusted weights"));
        assert!(report.contains("Lab - Usage-adjusted weights"));
        assert_eq!(report.matches("Change management").count(), 2);
        assert_eq!(report.matches("Intercept b = ").count(), 2);
    }

    #[test]
    fn test_prediction_report_without_deltas() {
        let inputs = Inputs::seed();
        let prediction = predict_overall(&inputs, None);
        let report = format_prediction_report(&inputs, None, &prediction, 0.75, plain());
        assert!(report.contains("Now: 60.2% · Pred: 60.2% · Δ: "));
        assert!(report.contains("Target 75.0%: 14.80 pp to go"));
        // Lab is already above target
        assert!(report.contains("Target 75.0% met"));
        assert!(!report.contains("->"));
    }

    #[test]
    fn test_prediction_report_shows_shifted_scores() {
        let inputs = Inputs::seed();
        let mut deltas = DeltaMap::default();
        deltas.aws.export = Some(0.1);
        let prediction = predict_overall(&inputs, Some(&deltas));
        let report =
            format_prediction_report(&inputs, Some(&deltas), &prediction, 0.75, plain());
        assert!(report.contains("56.2% ->  66.2% (+10.00 pp)"));
        assert_eq!(report.matches("->").count(), 1);
    }

    #[test]
    fn test_format_json_prediction() {
        let prediction = predict_overall(&Inputs::seed(), None);
        let json = format_json(&prediction).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["AWS"]["now"], 0.602);
        assert!(value["weights"]["Lab"]["Change management"].is_number());
    }
}
