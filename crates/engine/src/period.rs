//! Calendar year-month used for monthly views.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, transactions::parse_date};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(EngineError::InvalidPeriod(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// `true` when `date` is a well-formed ISO date inside this month.
    ///
    /// The match is a prefix match on the canonical `YYYY-MM` string.
    pub fn contains(self, date: &str) -> bool {
        parse_date(date).is_ok() && date.starts_with(&self.to_string())
    }

    /// Human label, e.g. `March 2024`.
    pub fn label(self) -> String {
        const MONTHS: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        let name = MONTHS[(self.month - 1) as usize];
        format!("{name} {}", self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod(s.to_string());
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let period: Period = "2024-03".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2024-03");
        assert_eq!(period.label(), "March 2024");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("2024-3".parse::<Period>().is_err());
        assert!("2024-13".parse::<Period>().is_err());
        assert!("2024/03".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn navigation_wraps_years() {
        let jan: Period = "2024-01".parse().unwrap();
        assert_eq!(jan.prev().to_string(), "2023-12");
        assert_eq!(jan.prev().next(), jan);
        let dec: Period = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
    }

    #[test]
    fn contains_requires_well_formed_date() {
        let period: Period = "2024-03".parse().unwrap();
        assert!(period.contains("2024-03-31"));
        assert!(!period.contains("2024-04-01"));
        assert!(!period.contains("2024-03-xx"));
        assert!(!period.contains(""));
    }
}
