use chrono::NaiveDate;
use http::StatusCode;

/// Telemetry API failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("request timed out, the vehicle may be asleep")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),
}

/// Local input rejected before anything is sent.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{parameter} must be between {min} and {max}, got {value}")]
    OutOfRange { parameter: &'static str, value: f64, min: f64, max: f64 },

    #[error("invalid date range: `{from}` is after `{to}`")]
    DateRange { from: NaiveDate, to: NaiveDate },

    #[error("invalid month `{0}`, expected `YYYY-MM`")]
    Month(String),
}

impl ValidationError {
    /// Check that `value` lies within `min..=max`.
    pub fn ensure_within(
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange { parameter, value, min, max })
        }
    }
}
