//! Validated argument mapping handed to handler logic

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A validated parameter value
#[derive(Clone)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Time(NaiveTime),
    /// Structured value, already validated against its model
    Json(serde_json::Value),
    /// Output of a request parser
    Parsed(Arc<dyn Any + Send + Sync>),
}

impl ArgValue {
    /// JSON form of the value; `None` for parser output
    pub fn to_json(&self) -> Option<serde_json::Value> {
        let value = match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Self::Time(t) => serde_json::Value::String(t.format("%H:%M:%S%.f").to_string()),
            Self::Json(v) => v.clone(),
            Self::Parsed(_) => return None,
        };
        Some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(_) => f.write_str("Parsed(..)"),
            other => write!(f, "{:?}", other.to_json()),
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Parsed(a), Self::Parsed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<NaiveDate> for ArgValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// Arguments keyed by binding name
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: HashMap<String, ArgValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserialize an argument into `T` (`Option<T>` maps `Null` to `None`)
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> ApiResult<T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ApiError::MissingArgument(name.to_string()))?;
        let json = value.to_json().ok_or_else(|| ApiError::Extraction {
            name: name.to_string(),
            reason: "value comes from a request parser; use parsed()".to_string(),
        })?;
        serde_json::from_value(json).map_err(|e| ApiError::Extraction {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Borrow the output of a request parser
    pub fn parsed<T: Any + Send + Sync>(&self, name: &str) -> ApiResult<&T> {
        match self.values.get(name) {
            Some(ArgValue::Parsed(value)) => {
                value.downcast_ref::<T>().ok_or_else(|| ApiError::Extraction {
                    name: name.to_string(),
                    reason: format!("parser output is not a {}", std::any::type_name::<T>()),
                })
            }
            Some(_) => Err(ApiError::Extraction {
                name: name.to_string(),
                reason: "not a request parser value".to_string(),
            }),
            None => Err(ApiError::MissingArgument(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_scalars_and_options() {
        let mut args = Arguments::new();
        args.insert("user_id", ArgValue::Int(123));
        args.insert("name", ArgValue::Null);
        args.insert("join_date", ArgValue::Date(NaiveDate::from_ymd_opt(2000, 1, 2).unwrap()));

        assert_eq!(args.get::<i64>("user_id").unwrap(), 123);
        assert_eq!(args.get::<Option<String>>("name").unwrap(), None);
        assert_eq!(
            args.get::<NaiveDate>("join_date").unwrap(),
            NaiveDate::from_ymd_opt(2000, 1, 2).unwrap()
        );
        assert!(matches!(args.get::<i64>("missing"), Err(ApiError::MissingArgument(_))));
        assert!(matches!(args.get::<i64>("join_date"), Err(ApiError::Extraction { .. })));
    }

    #[test]
    fn test_parsed() {
        #[derive(Debug, PartialEq)]
        struct Window(u32);

        let mut args = Arguments::new();
        args.insert("window", ArgValue::Parsed(Arc::new(Window(3))));

        assert_eq!(args.parsed::<Window>("window").unwrap(), &Window(3));
        assert!(args.parsed::<String>("window").is_err());
        assert!(args.get::<i64>("window").is_err());
    }

    #[test]
    fn test_arg_value_equality() {
        assert_eq!(ArgValue::from(5i64), ArgValue::Int(5));
        assert_eq!(ArgValue::from("a"), ArgValue::String("a".to_string()));
        assert_ne!(ArgValue::Null, ArgValue::Bool(false));
        assert_ne!(ArgValue::Float(f64::NAN), ArgValue::Null);
        assert_ne!(ArgValue::Int(1), ArgValue::Float(1.0));
    }
}
