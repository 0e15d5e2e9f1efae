//! Response normalization helpers
//!
//! Exchanges send numbers as JSON strings, JSON numbers or scientific
//! notation; timestamps as seconds, fractional seconds, milliseconds or
//! date strings. Everything funnels through [`Normalizer`], which parses from
//! the exact response text and reports schema surprises as `Normalization`
//! errors tagged with exchange and operation.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use common::{Error, ExchangeId, PriceLevel, Result, Side};
use rest::RawResponse;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Normalization context for one operation
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    exchange: ExchangeId,
    operation: &'static str,
}

impl Normalizer {
    /// Context for `operation` on `exchange`
    #[must_use]
    pub const fn new(exchange: ExchangeId, operation: &'static str) -> Self {
        Self {
            exchange,
            operation,
        }
    }

    /// Normalization error with this context
    #[must_use]
    pub fn error(&self, reason: impl Into<String>) -> Error {
        Error::normalization(self.exchange, self.operation, reason)
    }

    /// Error reported by the exchange inside a successful HTTP response
    #[must_use]
    pub fn api_error(&self, endpoint: &str, status: u16, message: impl Into<String>) -> Error {
        Error::ExchangeApi {
            exchange: self.exchange,
            endpoint: endpoint.to_string(),
            status,
            body: message.into(),
        }
    }

    /// Parse the response body as JSON
    ///
    /// # Errors
    /// Returns `Normalization` if the body is not JSON
    pub fn json(&self, response: &RawResponse) -> Result<Value> {
        response
            .json::<Value>()
            .map_err(|e| self.error(format!("body is not JSON: {e}")))
    }

    /// Member of an object
    ///
    /// # Errors
    /// Returns `Normalization` if `value` is not an object or lacks `key`
    pub fn field<'a>(&self, value: &'a Value, key: &str) -> Result<&'a Value> {
        value
            .get(key)
            .ok_or_else(|| self.error(format!("missing field '{key}'")))
    }

    /// Element of an array
    ///
    /// # Errors
    /// Returns `Normalization` if `value` is not an array or too short
    pub fn index<'a>(&self, value: &'a Value, index: usize) -> Result<&'a Value> {
        value
            .get(index)
            .ok_or_else(|| self.error(format!("missing element {index}")))
    }

    /// Value as an array
    ///
    /// # Errors
    /// Returns `Normalization` if `value` is not an array
    pub fn array<'a>(&self, value: &'a Value) -> Result<&'a Vec<Value>> {
        value
            .as_array()
            .ok_or_else(|| self.error(format!("expected array, got {}", kind(value))))
    }

    /// Value as an object
    ///
    /// # Errors
    /// Returns `Normalization` if `value` is not an object
    pub fn object<'a>(&self, value: &'a Value) -> Result<&'a Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.error(format!("expected object, got {}", kind(value))))
    }

    /// String or number rendered as text
    ///
    /// # Errors
    /// Returns `Normalization` for other JSON types
    pub fn text(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.error(format!("expected string or number, got {}", kind(other)))),
        }
    }

    /// Text of an object member
    ///
    /// # Errors
    /// See [`Normalizer::field`] and [`Normalizer::text`]
    pub fn text_field(&self, value: &Value, key: &str) -> Result<String> {
        self.text(self.field(value, key)?)
    }

    /// Exact decimal from a JSON string or number
    ///
    /// # Errors
    /// Returns `Normalization` if the value is not a decimal number
    pub fn decimal(&self, value: &Value) -> Result<Decimal> {
        let text = self.text(value)?;
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| self.error(format!("'{trimmed}' is not a decimal: {e}")))
    }

    /// Decimal of an object member
    ///
    /// # Errors
    /// See [`Normalizer::field`] and [`Normalizer::decimal`]
    pub fn decimal_field(&self, value: &Value, key: &str) -> Result<Decimal> {
        self.decimal(self.field(value, key)?)
    }

    /// Decimal of an optional member; missing or `null` is `None`
    ///
    /// # Errors
    /// Returns `Normalization` if present but not a decimal
    pub fn optional_decimal(&self, value: &Value, key: &str) -> Result<Option<Decimal>> {
        match value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => self.decimal(v).map(Some),
        }
    }

    /// Unix seconds, possibly fractional
    ///
    /// # Errors
    /// Returns `Normalization` if the value is not a valid timestamp
    pub fn seconds(&self, value: &Value) -> Result<DateTime<Utc>> {
        let secs = self.decimal(value)?;
        let whole = secs.trunc();
        let nanos = ((secs - whole) * Decimal::from(1_000_000_000)).trunc();
        whole
            .to_i64()
            .zip(nanos.to_u32())
            .and_then(|(s, n)| Utc.timestamp_opt(s, n).single())
            .ok_or_else(|| self.error(format!("'{secs}' is not a valid timestamp")))
    }

    /// Unix milliseconds
    ///
    /// # Errors
    /// Returns `Normalization` if the value is not a valid timestamp
    pub fn millis(&self, value: &Value) -> Result<DateTime<Utc>> {
        let millis = self.decimal(value)?;
        millis
            .trunc()
            .to_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| self.error(format!("'{millis}' is not a valid timestamp")))
    }

    /// RFC 3339 or naive UTC date string
    ///
    /// # Errors
    /// Returns `Normalization` if no supported format matches
    pub fn datetime(&self, value: &Value) -> Result<DateTime<Utc>> {
        let text = self.text(value)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
            return Ok(parsed.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| self.error(format!("'{text}' is not a recognised date")))
    }

    /// Order side from its common spellings
    ///
    /// # Errors
    /// Returns `Normalization` for unknown sides
    pub fn side(&self, value: &Value) -> Result<Side> {
        let text = self.text(value)?;
        Side::parse(&text).ok_or_else(|| self.error(format!("unknown side '{text}'")))
    }

    /// Price levels from `[[price, volume, ..], ..]` or
    /// `[{price_key: .., volume_key: ..}, ..]`
    ///
    /// # Errors
    /// Returns `Normalization` if a level has neither shape
    pub fn levels(&self, value: &Value, price_key: &str, volume_key: &str) -> Result<Vec<PriceLevel>> {
        self.array(value)?
            .iter()
            .map(|level| match level {
                Value::Array(_) => Ok(PriceLevel::new(
                    self.decimal(self.index(level, 0)?)?,
                    self.decimal(self.index(level, 1)?)?,
                )),
                Value::Object(_) => Ok(PriceLevel::new(
                    self.decimal_field(level, price_key)?,
                    self.decimal_field(level, volume_key)?,
                )),
                other => Err(self.error(format!("unexpected level {}", kind(other)))),
            })
            .collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Percentage figure (0.26 meaning 0.26%) as a fraction
#[must_use]
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}
