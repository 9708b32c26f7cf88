//! Text helpers for listing columns and the status line.

use chrono::{DateTime, Local};

const SIGNIFICANT_DIGITS: i32 = 4;
const UNITS: [(u64, &str); 5] = [
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "kB"),
    (1, "B"),
];

/// Render a byte count with a 1024-based unit.
pub fn format_size(size: u64) -> String {
    let (divider, unit) = UNITS
        .iter()
        .copied()
        .find(|(divider, _)| size >= *divider)
        .unwrap_or((1, "B"));

    let value = size as f64 / divider as f64;
    format!("{} {unit}", format_significant(value))
}

/// Render a unix timestamp as a short local date and time.
pub fn format_time(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&Local).format("%x %H:%M").to_string())
        .unwrap_or_default()
}

/// Status line text for the number of selected rows.
pub fn selection_status(count: usize) -> String {
    format!("{count} object(s) selected")
}

fn format_significant(value: f64) -> String {
    if value == 0.0 {
        return String::from("0");
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::{format_size, format_time, selection_status};

    #[test]
    fn given_sizes_across_units_when_formatted_then_binary_units_are_used() {
        let cases = [
            (0, "0 B"),
            (512, "512 B"),
            (2048, "2 kB"),
            (1536, "1.5 kB"),
            (5 * 1024 * 1024, "5 MB"),
            (3 * (1 << 30) + (1 << 29), "3.5 GB"),
            (1 << 40, "1 TB"),
        ];

        for (size, expected) in cases {
            assert_eq!(format_size(size), expected, "size {size}");
        }
    }

    #[test]
    fn given_fractional_size_when_formatted_then_four_digits_are_kept() {
        assert_eq!(format_size(1_234_567), "1.177 MB");
    }

    #[test]
    fn given_valid_timestamp_when_formatted_then_text_is_not_empty() {
        assert!(!format_time(1_500_000_000).is_empty());
    }

    #[test]
    fn given_selection_count_when_formatted_then_status_mentions_count() {
        assert_eq!(selection_status(3), "3 object(s) selected");
    }
}
