use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        anyhow::ensure!((1..=12).contains(&month), "month out of range: {month}");
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Shifts by a signed number of months, rolling over year boundaries.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month is validated on construction, day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(&self) -> u32 {
        let next = self.offset(1).first_day();
        (next - self.first_day()).num_days() as u32
    }

    /// English short month name, e.g. "Jan".
    pub fn short_label(&self) -> String {
        self.first_day().format("%b").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("expected YYYY-MM, got {s:?}"))?;
        let year = y
            .parse::<i32>()
            .with_context(|| format!("invalid year in {s:?}"))?;
        let month = m
            .parse::<u32>()
            .with_context(|| format!("invalid month in {s:?}"))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Wall-clock date in the local timezone. Aggregations take dates explicitly;
/// this is for callers at the edges.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}
