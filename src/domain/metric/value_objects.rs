use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use validator::Validate;

use super::entity::{MetricCategory, MetricSample};
use crate::domain::shared::errors::DomainError;

lazy_static! {
    static ref METRIC_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9][a-z0-9_.:-]{0,127}$").unwrap();
}

/// Ingestion payload for a metric sample, validated before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct NewMetricSample {
    #[validate(regex(path = *METRIC_ID_REGEX))]
    pub id: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    pub category: MetricCategory,

    pub value: f64,

    #[serde(default)]
    #[validate(length(max = 32))]
    pub unit: String,

    /// Defaults to the time of recording
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl NewMetricSample {
    pub fn new(id: &str, category: MetricCategory, value: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            category,
            value,
            unit: String::new(),
            timestamp: None,
            tags: HashMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Structural validation without consuming the payload.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if !self.value.is_finite() {
            return Err(DomainError::InvalidInput(format!(
                "metric '{}' has non-finite value {}",
                self.id, self.value
            )));
        }
        Ok(())
    }

    /// Validates the payload and freezes it into an immutable sample.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` when the id, name or unit fail validation
    /// or when `value` is NaN or infinite. Values are never coerced.
    pub fn into_sample(self) -> Result<MetricSample, DomainError> {
        self.check()?;

        Ok(MetricSample {
            id: self.id,
            name: self.name,
            category: self.category,
            value: self.value,
            unit: self.unit,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            tags: self.tags,
        })
    }
}

/// Granularity used when asking for a trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    /// Fixed 30 days
    Month,
    /// Fixed 90 days
    Quarter,
}

impl TimeUnit {
    pub fn duration(self) -> Duration {
        match self {
            TimeUnit::Minute => Duration::minutes(1),
            TimeUnit::Hour => Duration::hours(1),
            TimeUnit::Day => Duration::days(1),
            TimeUnit::Week => Duration::weeks(1),
            TimeUnit::Month => Duration::days(30),
            TimeUnit::Quarter => Duration::days(90),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "minute" => Ok(TimeUnit::Minute),
            "hour" => Ok(TimeUnit::Hour),
            "day" => Ok(TimeUnit::Day),
            "week" => Ok(TimeUnit::Week),
            "month" => Ok(TimeUnit::Month),
            "quarter" => Ok(TimeUnit::Quarter),
            other => Err(DomainError::InvalidInput(format!(
                "unknown time unit '{}'",
                other
            ))),
        }
    }
}

/// Closed time interval; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Timeframe {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Timeframe {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidInput(format!(
                "timeframe start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The window `[end - span, end]`, clamped to the earliest representable instant.
    pub fn ending_at(end: DateTime<Utc>, span: Duration) -> Self {
        Self {
            start: end
                .checked_sub_signed(span)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end,
        }
    }

    /// `periods` units back from now. Spans beyond the calendar range cover all history.
    pub fn last(unit: TimeUnit, periods: u32) -> Self {
        let span = i32::try_from(periods)
            .ok()
            .and_then(|periods| unit.duration().checked_mul(periods))
            .unwrap_or(Duration::MAX);
        Self::ending_at(Utc::now(), span)
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// The equally long window immediately before this one.
    pub fn preceding(&self) -> Self {
        Self::ending_at(self.start, self.span())
    }
}
