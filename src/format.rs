//! Display-only derived values: currency, durations, dates, percentages.

use chrono::{DateTime, Local, Utc};

/// Rupiah with dot-grouped thousands and no decimals, e.g. "Rp 125.000".
pub fn currency(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// "2h 5m" above an hour, "45m" below it.
pub fn duration(mins: i64) -> String {
    if mins <= 0 {
        return "0m".to_string();
    }
    let hours = mins / 60;
    let rest = mins % 60;
    if hours > 0 {
        format!("{}h {}m", hours, rest)
    } else {
        format!("{}m", rest)
    }
}

pub fn date(value: &DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%-d %B %Y").to_string()
}

pub fn datetime(value: &DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%-d %B %Y %H:%M").to_string()
}

pub fn relative(value: &DateTime<Utc>) -> String {
    let seconds = (Utc::now() - *value).num_seconds();
    if seconds < 60 {
        "Just now".to_string()
    } else if seconds < 3600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 2_592_000 {
        format!("{} days ago", seconds / 86_400)
    } else {
        date(value)
    }
}

/// Fraction for progress bars, clamped to 0..=1.
pub fn fraction(part: i64, whole: i64) -> f32 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64).clamp(0.0, 1.0) as f32
}

pub fn percent(value: f64) -> String {
    format!("{:.0}%", value.clamp(0.0, 100.0))
}

pub fn hours(value: f64) -> String {
    format!("{:.1}h", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(0), "Rp 0");
        assert_eq!(currency(999), "Rp 999");
        assert_eq!(currency(15000), "Rp 15.000");
        assert_eq!(currency(125000), "Rp 125.000");
        assert_eq!(currency(1234567), "Rp 1.234.567");
        assert_eq!(currency(-15000), "-Rp 15.000");
    }

    #[test]
    fn durations() {
        assert_eq!(duration(0), "0m");
        assert_eq!(duration(45), "45m");
        assert_eq!(duration(60), "1h 0m");
        assert_eq!(duration(125), "2h 5m");
    }

    #[test]
    fn fractions_clamp() {
        assert_eq!(fraction(5, 10), 0.5);
        assert_eq!(fraction(20, 10), 1.0);
        assert_eq!(fraction(3, 0), 0.0);
        assert_eq!(fraction(-1, 10), 0.0);
    }

    #[test]
    fn percent_clamps() {
        assert_eq!(percent(42.4), "42%");
        assert_eq!(percent(150.0), "100%");
        assert_eq!(percent(-3.0), "0%");
    }
}
