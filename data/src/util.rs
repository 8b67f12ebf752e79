use chrono::NaiveDate;

/// `M/D` without zero padding, e.g. `3/14`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d").to_string()
}

/// Abbreviates large magnitudes for tooltips: `1.2M`, `3.4K`, `12`.
pub fn abbr_large_numbers(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Shortens `label` to at most `max_chars` characters, ending with an ellipsis when cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
