//! Scalar coercion registry
//!
//! Maps a [`ScalarKind`] to the function that turns raw wire text into an
//! [`ArgValue`]. Date, datetime and time are registered by default; other
//! kinds fall back to their built-in conversion unless overridden.

use crate::arguments::ArgValue;
use crate::types::ScalarKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use ferrule_validation::formats;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Coercion function: raw text to a typed value, or an error message
pub type CoercionFn = Arc<dyn Fn(&str) -> Result<ArgValue, String> + Send + Sync>;

#[derive(Clone)]
pub struct Coercions {
    table: HashMap<ScalarKind, CoercionFn>,
}

impl Default for Coercions {
    fn default() -> Self {
        let mut coercions = Self::empty();
        coercions.register(ScalarKind::Date, |raw| parse_date(raw).map(ArgValue::Date));
        coercions.register(ScalarKind::DateTime, |raw| parse_datetime(raw).map(ArgValue::DateTime));
        coercions.register(ScalarKind::Time, |raw| parse_time(raw).map(ArgValue::Time));
        coercions
    }
}

impl fmt::Debug for Coercions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.table.keys().map(ScalarKind::name).collect();
        kinds.sort_unstable();
        f.debug_struct("Coercions").field("registered", &kinds).finish()
    }
}

impl Coercions {
    /// Registry with nothing registered; every kind uses its fallback
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// Register (or replace) the coercion for `kind`
    pub fn register<F>(&mut self, kind: ScalarKind, f: F)
    where
        F: Fn(&str) -> Result<ArgValue, String> + Send + Sync + 'static,
    {
        self.table.insert(kind, Arc::new(f));
    }

    pub fn is_registered(&self, kind: &ScalarKind) -> bool {
        self.table.contains_key(kind)
    }

    pub fn coerce(&self, kind: &ScalarKind, raw: &str) -> Result<ArgValue, String> {
        match self.table.get(kind) {
            Some(f) => f(raw),
            None => fallback(kind, raw),
        }
    }
}

fn fallback(kind: &ScalarKind, raw: &str) -> Result<ArgValue, String> {
    match kind {
        ScalarKind::Bool => parse_bool(raw).map(ArgValue::Bool),
        ScalarKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|e| format!("invalid integer '{}': {}", raw, e)),
        ScalarKind::Float => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(ArgValue::Float(value)),
            Ok(_) => Err(format!("invalid number '{}': not finite", raw)),
            Err(e) => Err(format!("invalid number '{}': {}", raw, e)),
        },
        ScalarKind::Uuid => {
            if formats::validate_uuid(raw) {
                Ok(ArgValue::String(raw.to_lowercase()))
            } else {
                Err(format!("invalid UUID '{}'", raw))
            }
        }
        ScalarKind::Date => parse_date(raw).map(ArgValue::Date),
        ScalarKind::DateTime => parse_datetime(raw).map(ArgValue::DateTime),
        ScalarKind::Time => parse_time(raw).map(ArgValue::Time),
        ScalarKind::String | ScalarKind::Custom(_) => Ok(ArgValue::String(raw.to_string())),
    }
}

pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("invalid boolean '{}'", raw)),
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, naive ISO date-time (taken as UTC) or a bare date (midnight UTC)
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(format!("invalid datetime '{}'", raw))
}

/// `YYYY-MM-DD`, or the date part of a date-time
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .or_else(|_| parse_datetime(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid date '{}'", raw))
}

/// `HH:MM[:SS[.fff]]`, or the time part of a date-time
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .or_else(|_| parse_datetime(trimmed).map(|dt| dt.time()))
        .map_err(|_| format!("invalid time '{}'", raw))
}
