use crate::Value;
use rust_decimal::Decimal;

/// Trait for types that can be bound as a SQL parameter.
pub trait ToSql: Send + Sync {
    /// Convert this value to a [`Value`] for use as a SQL parameter.
    fn to_value(&self) -> Value;
}

/// Convert a slice of [`ToSql`] references into the owned [`Value`]s handed to a
/// [`Connection`](crate::Connection).
pub fn to_values(params: &[&dyn ToSql]) -> Vec<Value> {
    params.iter().map(|p| p.to_value()).collect()
}

impl ToSql for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

macro_rules! to_sql_copy {
    ($($source:ty),+ $(,)?) => {
        $(
            impl ToSql for $source {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )+
    };
}

to_sql_copy!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Decimal, chrono::NaiveDateTime);

impl ToSql for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToSql for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToSql for [u8] {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl ToSql for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToSql::to_value)
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_value() {
        let value = Value::I32(42);
        assert_eq!(value.to_value(), Value::I32(42));
        assert_eq!(Value::Null.to_value(), Value::Null);
    }

    #[test]
    fn test_to_sql_bool() {
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(false.to_value(), Value::Bool(false));
    }

    #[test]
    fn test_to_sql_signed() {
        assert_eq!(i8::MIN.to_value(), Value::I8(i8::MIN));
        assert_eq!(i16::MAX.to_value(), Value::I16(i16::MAX));
        assert_eq!(42i32.to_value(), Value::I32(42));
        assert_eq!(i64::MAX.to_value(), Value::I64(i64::MAX));
    }

    #[test]
    fn test_to_sql_unsigned() {
        assert_eq!(u8::MAX.to_value(), Value::U8(u8::MAX));
        assert_eq!(42u16.to_value(), Value::U16(42));
        assert_eq!(42u32.to_value(), Value::U32(42));
        assert_eq!(u64::MAX.to_value(), Value::U64(u64::MAX));
    }

    #[test]
    fn test_to_sql_floats() {
        assert_eq!(1.5f32.to_value(), Value::F32(1.5));
        assert_eq!(2.5f64.to_value(), Value::F64(2.5));
    }

    #[test]
    fn test_to_sql_strings() {
        assert_eq!("hello".to_value(), Value::String("hello".to_string()));
        assert_eq!(
            String::from("world").to_value(),
            Value::String("world".to_string())
        );
    }

    #[test]
    fn test_to_sql_bytes() {
        let bytes: &[u8] = &[1, 2, 3];
        assert_eq!(bytes.to_value(), Value::Bytes(vec![1, 2, 3]));
        assert_eq!(vec![4u8, 5].to_value(), Value::Bytes(vec![4, 5]));
    }

    #[test]
    fn test_to_sql_decimal() {
        let price = Decimal::new(1999, 2);
        assert_eq!(price.to_value(), Value::Decimal(price));
    }

    #[test]
    fn test_to_sql_option() {
        assert_eq!(Some(42i64).to_value(), Value::I64(42));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(None::<String>.to_value(), Value::Null);
    }

    #[test]
    fn test_to_values() {
        let name = "widget".to_string();
        let quantity = 3i32;
        let description: Option<String> = None;
        let params: Vec<&dyn ToSql> = vec![&name, &quantity, &description];

        assert_eq!(
            to_values(&params),
            vec![
                Value::String("widget".to_string()),
                Value::I32(3),
                Value::Null
            ]
        );
    }
}
