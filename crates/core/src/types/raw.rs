//! Tolerant readers for loosely-typed remote payload fields.
//!
//! Remote records arrive as raw JSON objects whose fields may be absent,
//! null, strings, or numbers depending on the store and API version. Each
//! reader here implements one of the coercion rules of the mapping step:
//! pass-through, default on absence, or required with a typed error. Nothing
//! in this module panics on unexpected shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::id::RemoteId;

/// Error produced when a payload field cannot be interpreted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RawFieldError {
    /// A field the schema requires is absent, null, or empty.
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    /// A field that must be numeric holds something else.
    #[error("field `{0}` is not numeric (got {1})")]
    NotNumeric(&'static str, String),
    /// A timestamp field holds something that is not an RFC 3339 datetime.
    #[error("field `{0}` is not a valid timestamp (got {1})")]
    NotTimestamp(&'static str, String),
}

/// Read a string field, stringifying scalar non-strings the way a dynamic
/// upstream would have stored them. Null, absent, and structured values
/// map to `None`.
#[must_use]
pub fn string(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a remote identifier: an integer, or a string holding one.
#[must_use]
pub fn remote_id(obj: &Value, key: &str) -> Option<RemoteId> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().map(RemoteId::new),
        Value::String(s) => s.trim().parse::<i64>().ok().map(RemoteId::new),
        _ => None,
    }
}

/// Read a monetary/decimal field, coercing absence, null, and non-numeric
/// values to zero. Used for spend, tax, discount, and weight totals.
#[must_use]
pub fn decimal_or_zero(obj: &Value, key: &str) -> Decimal {
    obj.get(key)
        .and_then(|v| as_decimal(v).ok().flatten())
        .unwrap_or_default()
}

/// Read an optional price-like field: absent, null, and empty map to `None`;
/// a present non-numeric value is an error.
///
/// # Errors
///
/// Returns [`RawFieldError::NotNumeric`] if the field is present but cannot
/// be parsed as a decimal.
pub fn optional_decimal(obj: &Value, key: &'static str) -> Result<Option<Decimal>, RawFieldError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => as_decimal(v).map_err(|()| RawFieldError::NotNumeric(key, snippet(v))),
    }
}

/// Read a required decimal field: absence and unparseable values are errors.
///
/// # Errors
///
/// Returns [`RawFieldError::Missing`] if the field is absent, null, or
/// empty, and [`RawFieldError::NotNumeric`] if it cannot be parsed.
pub fn required_decimal(obj: &Value, key: &'static str) -> Result<Decimal, RawFieldError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(RawFieldError::Missing(key)),
        Some(v) => as_decimal(v)
            .map_err(|()| RawFieldError::NotNumeric(key, snippet(v)))?
            .ok_or(RawFieldError::Missing(key)),
    }
}

/// Read an integer field with a default for absent or non-integral values.
#[must_use]
pub fn int_or(obj: &Value, key: &str, default: i32) -> i32 {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(default)
}

/// Read a boolean field with a default for absent or non-boolean values.
#[must_use]
pub fn bool_or(obj: &Value, key: &str, default: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Read an optional RFC 3339 timestamp field.
///
/// # Errors
///
/// Returns [`RawFieldError::NotTimestamp`] if the field is present but not
/// a parseable RFC 3339 datetime.
pub fn timestamp(obj: &Value, key: &'static str) -> Result<Option<DateTime<Utc>>, RawFieldError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| RawFieldError::NotTimestamp(key, snippet(&Value::String(s.clone())))),
        Some(v) => Err(RawFieldError::NotTimestamp(key, snippet(v))),
    }
}

/// Read an array field, treating absence and non-arrays as empty.
#[must_use]
pub fn items<'v>(obj: &'v Value, key: &str) -> &'v [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Read a nested object field, if present.
#[must_use]
pub fn object<'v>(obj: &'v Value, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| v.is_object())
}

/// Parse one JSON value as a decimal.
///
/// `Ok(None)` means "no value here" (null or empty string); `Err(())` means
/// "a value is here but it is not a number".
fn as_decimal(v: &Value) -> Result<Option<Decimal>, ()> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<Decimal>().map(Some).map_err(|_| ()),
        Value::Number(n) => n.to_string().parse::<Decimal>().map(Some).map_err(|_| ()),
        _ => Err(()),
    }
}

/// A short printable form of a value for error messages.
fn snippet(v: &Value) -> String {
    let rendered = v.to_string();
    if rendered.chars().count() > 48 {
        let mut out: String = rendered.chars().take(48).collect();
        out.push('…');
        out
    } else {
        rendered
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_passes_through_and_stringifies_scalars() {
        let obj = json!({"tags": "vip, repeat", "order_number": 1001, "flag": true});
        assert_eq!(string(&obj, "tags").unwrap(), "vip, repeat");
        assert_eq!(string(&obj, "order_number").unwrap(), "1001");
        assert_eq!(string(&obj, "flag").unwrap(), "true");
        assert_eq!(string(&obj, "missing"), None);
        assert_eq!(string(&json!({"tags": null}), "tags"), None);
        assert_eq!(string(&json!({"tags": [1]}), "tags"), None);
    }

    #[test]
    fn test_remote_id_accepts_numbers_and_numeric_strings() {
        let obj = json!({"id": 450789469, "alt": "450789469", "bad": "abc"});
        assert_eq!(remote_id(&obj, "id").unwrap().as_i64(), 450_789_469);
        assert_eq!(remote_id(&obj, "alt").unwrap().as_i64(), 450_789_469);
        assert_eq!(remote_id(&obj, "bad"), None);
        assert_eq!(remote_id(&obj, "missing"), None);
    }

    #[test]
    fn test_decimal_or_zero_coerces_everything_unusable_to_zero() {
        let obj = json!({
            "a": "199.65",
            "b": 12.5,
            "c": null,
            "d": "not-a-number",
            "e": "",
            "f": {"amount": "3"}
        });
        assert_eq!(decimal_or_zero(&obj, "a"), "199.65".parse().unwrap());
        assert_eq!(decimal_or_zero(&obj, "b"), "12.5".parse().unwrap());
        assert_eq!(decimal_or_zero(&obj, "c"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&obj, "d"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&obj, "e"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&obj, "f"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&obj, "missing"), Decimal::ZERO);
    }

    #[test]
    fn test_optional_decimal_distinguishes_absent_from_garbage() {
        let obj = json!({"price": "49.99", "zero": "0.00", "empty": "", "bad": "free"});
        assert_eq!(
            optional_decimal(&obj, "price").unwrap(),
            Some("49.99".parse().unwrap())
        );
        // A parseable zero is a real price, not a missing one
        assert_eq!(
            optional_decimal(&obj, "zero").unwrap(),
            Some(Decimal::ZERO)
        );
        assert_eq!(optional_decimal(&obj, "empty").unwrap(), None);
        assert_eq!(optional_decimal(&obj, "missing").unwrap(), None);
        assert!(matches!(
            optional_decimal(&obj, "bad"),
            Err(RawFieldError::NotNumeric("bad", _))
        ));
    }

    #[test]
    fn test_required_decimal() {
        let obj = json!({"total_price": "409.94", "null_total": null, "bad": []});
        assert_eq!(
            required_decimal(&obj, "total_price").unwrap(),
            "409.94".parse().unwrap()
        );
        assert!(matches!(
            required_decimal(&obj, "missing"),
            Err(RawFieldError::Missing("missing"))
        ));
        assert!(matches!(
            required_decimal(&obj, "null_total"),
            Err(RawFieldError::Missing("null_total"))
        ));
        assert!(matches!(
            required_decimal(&obj, "bad"),
            Err(RawFieldError::NotNumeric("bad", _))
        ));
    }

    #[test]
    fn test_int_or_and_bool_or() {
        let obj = json!({"orders_count": 5, "as_string": "7", "bad": "many", "accepts": true});
        assert_eq!(int_or(&obj, "orders_count", 0), 5);
        assert_eq!(int_or(&obj, "as_string", 0), 7);
        assert_eq!(int_or(&obj, "bad", 0), 0);
        assert_eq!(int_or(&obj, "missing", 1), 1);
        assert!(bool_or(&obj, "accepts", false));
        assert!(!bool_or(&obj, "missing", false));
    }

    #[test]
    fn test_timestamp_parses_rfc3339_with_offset() {
        let obj = json!({"created_at": "2024-03-01T10:30:00-05:00", "bad": "yesterday"});
        let dt = timestamp(&obj, "created_at").unwrap().unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T15:30:00+00:00");
        assert_eq!(timestamp(&obj, "missing").unwrap(), None);
        assert!(matches!(
            timestamp(&obj, "bad"),
            Err(RawFieldError::NotTimestamp("bad", _))
        ));
    }

    #[test]
    fn test_items_treats_absence_as_empty() {
        let obj = json!({"variants": [{"id": 1}], "not_array": 3});
        assert_eq!(items(&obj, "variants").len(), 1);
        assert!(items(&obj, "not_array").is_empty());
        assert!(items(&obj, "missing").is_empty());
    }

    #[test]
    fn test_object_field() {
        let obj = json!({"image": {"src": "https://cdn.example.com/p.png"}, "flat": "x"});
        assert!(object(&obj, "image").is_some());
        assert!(object(&obj, "flat").is_none());
        assert!(object(&obj, "missing").is_none());
    }
}
