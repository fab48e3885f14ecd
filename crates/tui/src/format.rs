//! Display and input conventions for dates.

use chrono::NaiveDate;
use engine::{DATE_FORMAT, parse_date};

pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// `2024-03-05` → `05.03.2024`. Malformed values are shown as stored.
pub fn display_date(iso: &str) -> String {
    match parse_date(iso) {
        Ok(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => iso.to_string(),
    }
}

/// Accepts `DD.MM.YYYY` or `YYYY-MM-DD` and returns the ISO form.
pub fn parse_input_date(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if let Ok(date) = parse_date(raw) {
        return Ok(date.format(DATE_FORMAT).to_string());
    }
    NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| format!("Invalid date \"{raw}\" (use DD.MM.YYYY)."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_round_trip_between_forms() {
        assert_eq!(display_date("2024-03-05"), "05.03.2024");
        assert_eq!(display_date("garbage"), "garbage");
        assert_eq!(parse_input_date("05.03.2024").unwrap(), "2024-03-05");
        assert_eq!(parse_input_date(" 2024-03-05 ").unwrap(), "2024-03-05");
        assert!(parse_input_date("31.02.2024").is_err());
    }
}
