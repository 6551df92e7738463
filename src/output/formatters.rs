//! Reusable formatting utilities for CLI output

use colored::{ColoredString, Colorize};
use serde_json::Value;

use crate::dashboard::Source;

/// Width of the bars drawn by [`bar`]
pub const BAR_WIDTH: usize = 30;

/// Horizontal bar proportional to `value / max`.
///
/// Returns an empty string when `max` is not positive.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

/// Group digits in thousands: `1800` → `1,800`, `1234.5` → `1,234.5`
pub fn format_count(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let text = if n.fract() == 0.0 {
        format!("{:.0}", n.abs())
    } else {
        format!("{:.1}", n.abs())
    };
    let (digits, fraction) = match text.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + digits.len() / 3 + 1);
    if n < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = fraction {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// First `max_chars` characters of `text`, with an ellipsis when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Colored label for a data source
pub fn source_label(source: Source) -> ColoredString {
    let label = source.to_string();
    match source {
        Source::Network => label.green(),
        Source::Cache => label.cyan(),
        Source::Stale => label.yellow(),
        Source::Backup => label.red(),
    }
}

/// `live/total live`, green when everything is live, red when nothing is
pub fn live_summary(live: usize, total: usize) -> ColoredString {
    let text = format!("{}/{} live", live, total);
    if live == total {
        text.green()
    } else if live == 0 {
        text.red()
    } else {
        text.yellow()
    }
}

/// One-line description of an arbitrary payload
pub fn value_summary(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("{{{}}}", excerpt(&keys.join(", "), 60))
        }
        Value::Array(items) => format!("{} item(s)", items.len()),
        other => excerpt(&other.to_string(), 60),
    }
}
