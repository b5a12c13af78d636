use chrono::{DateTime, Utc};
use sqlx::postgres::{PgColumn, PgRow, Postgres};
use sqlx::{Column, Decode, Row as _, Type};
use ucrud_driver::Error::{ConversionError, UnsupportedColumnType};
use ucrud_driver::{Result, Row, Value};

/// Convert PostgreSQL rows into column names and values
pub(crate) fn convert_rows(rows: &[PgRow]) -> Result<(Vec<String>, Vec<Row>)> {
    let columns: Vec<String> = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut converted_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let values = row
            .columns()
            .iter()
            .map(|column| convert_to_value(row, column))
            .collect::<Result<Row>>()?;
        converted_rows.push(values);
    }
    Ok((columns, converted_rows))
}

pub(crate) fn convert_to_value(row: &PgRow, column: &PgColumn) -> Result<Value> {
    let column_type = column.type_info();
    let postgresql_type = &**column_type;
    let column_type = format!("{postgresql_type:?}");
    let column_type_name = column_type.split('(').next().unwrap_or_default();
    let index = column.ordinal();

    let value = match column_type_name {
        "Bool" => get_value(row, index, Value::Bool)?,
        "Bpchar" | "Char" | "Name" | "Text" | "Varchar" => get_value(row, index, Value::String)?,
        "Bytea" => get_value(row, index, Value::Bytes)?,
        "Int2" => get_value(row, index, Value::I16)?,
        "Int4" => get_value(row, index, Value::I32)?,
        "Int8" => get_value(row, index, Value::I64)?,
        "Oid" => get_value(row, index, |v: sqlx::postgres::types::Oid| Value::U32(v.0))?,
        "Float4" => get_value(row, index, Value::F32)?,
        "Float8" => get_value(row, index, Value::F64)?,
        "Numeric" => get_value(row, index, Value::Decimal)?,
        "Json" | "Jsonb" => get_value(row, index, Value::Json)?,
        "Date" => get_value(row, index, Value::Date)?,
        "Time" => get_value(row, index, Value::Time)?,
        "Timestamp" => get_value(row, index, Value::DateTime)?,
        "Timestamptz" => get_value(row, index, |v: DateTime<Utc>| {
            Value::DateTime(v.naive_utc())
        })?,
        "Void" => Value::Null, // pg_sleep() returns void
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column.name().to_string(),
                column_type: column_type.clone(),
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T>(row: &'r PgRow, index: usize, to_value: impl Fn(T) -> Value) -> Result<Value>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    match row
        .try_get::<Option<T>, usize>(index)
        .map_err(|error| ConversionError(error.to_string()))?
    {
        Some(value) => Ok(to_value(value)),
        None => Ok(Value::Null),
    }
}
