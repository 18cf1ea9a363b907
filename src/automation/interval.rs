//! Parsing of the hours/minutes/seconds/milliseconds interval fields

use super::error::IntervalError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest sleep any loop will ever use.
pub const INTERVAL_FLOOR: Duration = Duration::from_millis(10);

/// Smallest raw interval accepted when enabling the secondary action.
pub const SECONDARY_MINIMUM: Duration = Duration::from_secs(1);

/// Interval fields exactly as typed by the user. Blank fields count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalInput {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub milliseconds: String,
}

impl IntervalInput {
    pub fn new(hours: &str, minutes: &str, seconds: &str, milliseconds: &str) -> Self {
        Self {
            hours: hours.to_string(),
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
            milliseconds: milliseconds.to_string(),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new("", "", "", &ms.to_string())
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new("", "", &secs.to_string(), "")
    }

    pub fn parse(&self) -> Result<IntervalSpec, IntervalError> {
        Ok(IntervalSpec {
            hours: parse_field("hours", &self.hours)?,
            minutes: parse_field("minutes", &self.minutes)?,
            seconds: parse_field("seconds", &self.seconds)?,
            milliseconds: parse_field("milliseconds", &self.milliseconds)?,
        })
    }

    /// Parses and clamps to [`INTERVAL_FLOOR`].
    pub fn effective(&self) -> Result<Duration, IntervalError> {
        Ok(self.parse()?.effective())
    }

    /// Parses and rejects totals below `minimum` instead of clamping.
    pub fn at_least(&self, minimum: Duration) -> Result<Duration, IntervalError> {
        let spec = self.parse()?;
        let total = spec.total_secs();
        if total < minimum.as_secs_f64() {
            return Err(IntervalError::BelowMinimum {
                total_secs: total,
                minimum_secs: minimum.as_secs_f64(),
            });
        }
        Ok(spec.effective())
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, IntervalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = trimmed.parse().map_err(|_| IntervalError::NotANumber {
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(IntervalError::NotANumber {
            field,
            value: raw.to_string(),
        });
    }
    if value < 0.0 {
        return Err(IntervalError::Negative { field, value });
    }
    Ok(value)
}

/// Validated, non-negative interval components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSpec {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub milliseconds: f64,
}

impl IntervalSpec {
    pub fn total_secs(&self) -> f64 {
        self.hours * 3600.0 + self.minutes * 60.0 + self.seconds + self.milliseconds / 1000.0
    }

    pub fn effective(&self) -> Duration {
        let total = self.total_secs();
        // Saturate absurdly long intervals instead of overflowing Duration
        let raw = Duration::try_from_secs_f64(total).unwrap_or(Duration::MAX);
        raw.max(INTERVAL_FLOOR)
    }
}
