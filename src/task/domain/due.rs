//! Due timestamps assembled from separate date and time inputs.

use super::TaskDomainError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Combined due timestamp of a task, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDateTime(DateTime<Utc>);

impl DueDateTime {
    /// Combines a `YYYY-MM-DD` date with an optional `HH:MM[:SS]` time.
    ///
    /// A missing or blank time means the end of that day, `23:59:59`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingDueDate`] for a blank date,
    /// [`TaskDomainError::InvalidDueDate`] or
    /// [`TaskDomainError::InvalidDueTime`] for malformed input.
    pub fn from_parts(date: &str, time: Option<&str>) -> Result<Self, TaskDomainError> {
        let date_input = date.trim();
        if date_input.is_empty() {
            return Err(TaskDomainError::MissingDueDate);
        }
        let day = NaiveDate::parse_from_str(date_input, DATE_FORMAT)
            .map_err(|_| TaskDomainError::InvalidDueDate(date.to_owned()))?;

        let clock_time = match time.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => parse_time(value)?,
            None => end_of_day()?,
        };

        Ok(Self(Utc.from_utc_datetime(&day.and_time(clock_time))))
    }

    /// Wraps an existing UTC timestamp.
    #[must_use]
    pub const fn from_utc(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp)
    }

    /// Returns the wrapped timestamp.
    #[must_use]
    pub const fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns whether the deadline has passed at `now`.
    ///
    /// A deadline equal to `now` has not passed yet.
    #[must_use]
    pub fn is_past(self, now: DateTime<Utc>) -> bool {
        self.0 < now
    }

    /// Rejects timestamps strictly earlier than `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DueInPast`] when the deadline has passed.
    pub fn ensure_not_past(self, now: DateTime<Utc>) -> Result<Self, TaskDomainError> {
        if self.is_past(now) {
            return Err(TaskDomainError::DueInPast { due: self.0, now });
        }
        Ok(self)
    }
}

impl From<DueDateTime> for DateTime<Utc> {
    fn from(value: DueDateTime) -> Self {
        value.0
    }
}

impl fmt::Display for DueDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, TaskDomainError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| TaskDomainError::InvalidDueTime(value.to_owned()))
}

fn end_of_day() -> Result<NaiveTime, TaskDomainError> {
    NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| TaskDomainError::InvalidDueTime("23:59:59".to_owned()))
}
