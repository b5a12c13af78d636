use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Decimal(Decimal),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    Json(serde_json::Value),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the value as an `i64` if it is an integer of any width that fits
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(value) => Some(i64::from(*value)),
            Value::I16(value) => Some(i64::from(*value)),
            Value::I32(value) => Some(i64::from(*value)),
            Value::I64(value) => Some(*value),
            Value::U8(value) => Some(i64::from(*value)),
            Value::U16(value) => Some(i64::from(*value)),
            Value::U32(value) => Some(i64::from(*value)),
            Value::U64(value) => i64::try_from(*value).ok(),
            Value::Decimal(value) if value.fract().is_zero() => value.to_i64(),
            _ => None,
        }
    }

    /// Get the value as an `f64` if it is numeric
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(value) => Some(f64::from(*value)),
            Value::F64(value) => Some(*value),
            Value::Decimal(value) => value.to_f64(),
            other => other.as_i64().map(|value| value as f64),
        }
    }

    /// Get the value as a string slice if it is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let string_value = match self {
            Value::Null => "null".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Bytes(bytes) => STANDARD.encode(bytes),
            Value::I8(value) => value.to_string(),
            Value::I16(value) => value.to_string(),
            Value::I32(value) => value.to_string(),
            Value::I64(value) => value.to_string(),
            Value::U8(value) => value.to_string(),
            Value::U16(value) => value.to_string(),
            Value::U32(value) => value.to_string(),
            Value::U64(value) => value.to_string(),
            Value::F32(value) => value.to_string(),
            Value::F64(value) => value.to_string(),
            Value::String(value) => value.to_string(),
            Value::Decimal(value) => value.to_string(),
            Value::Date(value) => value.to_string(),
            Value::Time(value) => value.to_string(),
            Value::DateTime(value) => value.to_string(),
            Value::Json(value) => value.to_string(),
        };
        write!(f, "{string_value}")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(value) => serializer.serialize_bool(value),
            Value::Bytes(ref value) => serializer.serialize_str(&STANDARD.encode(value)),
            Value::I8(value) => serializer.serialize_i8(value),
            Value::I16(value) => serializer.serialize_i16(value),
            Value::I32(value) => serializer.serialize_i32(value),
            Value::I64(value) => serializer.serialize_i64(value),
            Value::U8(value) => serializer.serialize_u8(value),
            Value::U16(value) => serializer.serialize_u16(value),
            Value::U32(value) => serializer.serialize_u32(value),
            Value::U64(value) => serializer.serialize_u64(value),
            Value::F32(value) => serializer.serialize_f32(value),
            Value::F64(value) => serializer.serialize_f64(value),
            Value::String(ref value) => serializer.serialize_str(value),
            Value::Decimal(ref value) => Serialize::serialize(value, serializer),
            Value::Date(value) => serializer.serialize_str(&value.to_string()),
            Value::Time(value) => serializer.serialize_str(&value.to_string()),
            Value::DateTime(value) => serializer.serialize_str(&value.to_string()),
            Value::Json(ref value) => value.serialize(serializer),
        }
    }
}

impl From<Option<Value>> for Value {
    fn from(value: Option<Value>) -> Self {
        value.unwrap_or(Value::Null)
    }
}

macro_rules! value_from {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value)
                }
            }
        )+
    };
}

value_from! {
    bool => Bool,
    Vec<u8> => Bytes,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Decimal => Decimal,
    chrono::NaiveDate => Date,
    chrono::NaiveTime => Time,
    chrono::NaiveDateTime => DateTime,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_null() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(json!(Value::Null), json!(serde_json::Value::Null));
        assert_eq!(Value::from(None::<Value>), Value::Null);
    }

    #[test]
    fn test_bool() {
        assert!(!Value::Bool(true).is_null());
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(json!(Value::Bool(true)), json!(true));
    }

    #[test]
    fn test_bytes() {
        let value = Value::Bytes(vec![114, 117, 115, 116]);
        assert_eq!(value.to_string(), "cnVzdA==");
        assert_eq!(json!(value), json!("cnVzdA=="));
    }

    #[test]
    fn test_integers() {
        assert_eq!(Value::I16(i16::MAX).to_string(), "32767");
        assert_eq!(json!(Value::I32(i32::MIN)), json!(i32::MIN));
        assert_eq!(json!(Value::I64(i64::MAX)), json!(i64::MAX));
        assert_eq!(json!(Value::U64(u64::MAX)), json!(u64::MAX));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::I8(-1).as_i64(), Some(-1));
        assert_eq!(Value::I16(2).as_i64(), Some(2));
        assert_eq!(Value::I32(3).as_i64(), Some(3));
        assert_eq!(Value::I64(4).as_i64(), Some(4));
        assert_eq!(Value::U32(5).as_i64(), Some(5));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Decimal(Decimal::new(700, 2)).as_i64(), Some(7));
        assert_eq!(Value::Decimal(Decimal::new(701, 2)).as_i64(), None);
        assert_eq!(Value::String("1".to_string()).as_i64(), None);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::F64(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::F32(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Decimal(Decimal::new(150, 2)).as_f64(), Some(1.5));
        assert_eq!(Value::I64(3).as_f64(), Some(3.0));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Value::String("foo".to_string()).as_str(), Some("foo"));
        assert_eq!(Value::I64(1).as_str(), None);
    }

    #[test]
    fn test_floats() {
        assert_eq!(Value::F64(12_345.678).to_string(), "12345.678");
        assert_eq!(json!(Value::F64(1.5)), json!(1.5));
    }

    #[test]
    fn test_string() {
        let value = Value::from("foo");
        assert_eq!(value.to_string(), "foo");
        assert_eq!(json!(value), json!("foo"));
    }

    #[test]
    fn test_decimal() -> Result<()> {
        let value = Value::from(Decimal::from_str("19.99")?);
        assert_eq!(value.to_string(), "19.99");
        assert_eq!(json!(value), json!("19.99"));
        Ok(())
    }

    #[test]
    fn test_date() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2000, 12, 31).expect("invalid date");
        let value = Value::from(date);
        assert_eq!(value.to_string(), "2000-12-31");
        assert_eq!(json!(value), json!("2000-12-31"));
        Ok(())
    }

    #[test]
    fn test_time() -> Result<()> {
        let time = NaiveTime::from_hms_opt(12, 13, 14).expect("invalid time");
        let value = Value::from(time);
        assert_eq!(value.to_string(), "12:13:14");
        assert_eq!(json!(value), json!("12:13:14"));
        Ok(())
    }

    #[test]
    fn test_date_time() -> Result<()> {
        let date_time = NaiveDateTime::parse_from_str("2000-12-31 12:13:14", "%Y-%m-%d %H:%M:%S")?;
        let value = Value::from(date_time);
        assert_eq!(value.to_string(), "2000-12-31 12:13:14");
        assert_eq!(json!(value), json!("2000-12-31 12:13:14"));
        Ok(())
    }

    #[test]
    fn test_json() {
        let value = Value::from(json!({"key": "value"}));
        assert_eq!(value.to_string(), r#"{"key":"value"}"#);
        assert_eq!(json!(value), json!({"key": "value"}));
    }

    #[test]
    fn test_mismatched_variants_are_not_equal() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(Value::String("1".to_string()), Value::I64(1));
    }
}
