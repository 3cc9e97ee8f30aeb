use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::InvalidValue;

/// A settlement period: one calendar month of production.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: u8,
    pub year: u16,
}

impl Period {
    pub fn new(month: u8, year: u16) -> Result<Self, InvalidValue> {
        if !(1..=12).contains(&month) {
            return Err(InvalidValue::new("month", format!("must be 1-12, got {month}")));
        }
        // Keeps the year safely castable to SMALLINT at the storage boundary.
        if !(1900..=9999).contains(&year) {
            return Err(InvalidValue::new("year", format!("must be 1900-9999, got {year}")));
        }
        Ok(Self { month, year })
    }

    pub fn first_day(&self) -> NaiveDate {
        // Safe: month is validated into 1..=12 at construction.
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (next_month, next_year) = if self.month == 12 {
            (1, self.year as i32 + 1)
        } else {
            (self.month as u32 + 1, self.year as i32)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .unwrap_or(NaiveDate::MAX)
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year as i32 && date.month() == self.month as u32
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
