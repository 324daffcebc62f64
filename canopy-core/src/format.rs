//! Formatting helpers shared by report renderers.
//!
//! Missing values render as an em dash so panels never show `null`.

use chrono::{DateTime, Utc};

/// Placeholder for values that are not available.
pub const MISSING: &str = "—";

/// Format a timestamp relative to `now` (e.g., "2d ago").
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d, %Y").to_string()
    }
}

/// Format an optional timestamp as relative time, or an em dash if missing.
pub fn format_relative_time_opt(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match ts {
        Some(ts) => format_relative_time(ts, now),
        None => MISSING.to_string(),
    }
}

/// Format a yield in kilograms, switching to tonnes from 1000 kg (e.g., "2.5t").
pub fn format_kg(kg: f64) -> String {
    if kg >= 1_000.0 {
        format!("{:.1}t", kg / 1_000.0)
    } else {
        format!("{:.1} kg", kg)
    }
}

/// Format an optional yield, or an em dash if missing.
pub fn format_kg_opt(kg: Option<f64>) -> String {
    kg.map(format_kg).unwrap_or_else(|| MISSING.to_string())
}

/// Format carbon tonnes (e.g., "12.40 tCO2").
pub fn format_tons(tons: f64) -> String {
    format!("{:.2} tCO2", tons)
}

/// Format an optional day count (e.g., "94.5 days").
pub fn format_days_opt(days: Option<f64>) -> String {
    match days {
        Some(days) => format!("{:.1} days", days),
        None => MISSING.to_string(),
    }
}

/// Shorten a wallet address for display ("0x12ab…cdef").
pub fn short_wallet(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
