use chrono::{DateTime, Utc};
use sqlx::mysql::{MySql, MySqlColumn, MySqlRow};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};
use ucrud_driver::Error::{ConversionError, UnsupportedColumnType};
use ucrud_driver::{Result, Row, Value};

/// Convert MySQL rows into column names and values
pub(crate) fn convert_rows(rows: &[MySqlRow]) -> Result<(Vec<String>, Vec<Row>)> {
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

pub(crate) fn convert_to_value(row: &MySqlRow, column: &MySqlColumn) -> Result<Value> {
    let index = column.ordinal();
    let column_type = column.type_info().name();

    let value = match column_type {
        "NULL" => Value::Null,
        "BOOLEAN" => get_value(row, index, Value::Bool)?,
        "TINYINT" => get_value(row, index, Value::I8)?,
        "SMALLINT" => get_value(row, index, Value::I16)?,
        "MEDIUMINT" | "INT" => get_value(row, index, Value::I32)?,
        "BIGINT" => get_value(row, index, Value::I64)?,
        "TINYINT UNSIGNED" => get_value(row, index, Value::U8)?,
        "SMALLINT UNSIGNED" | "YEAR" => get_value(row, index, Value::U16)?,
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => get_value(row, index, Value::U32)?,
        "BIGINT UNSIGNED" => get_value(row, index, Value::U64)?,
        "FLOAT" => get_value(row, index, Value::F32)?,
        "DOUBLE" => get_value(row, index, Value::F64)?,
        "DECIMAL" => get_value(row, index, Value::Decimal)?,
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            get_value(row, index, Value::String)?
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            get_value(row, index, Value::Bytes)?
        }
        "DATE" => get_value(row, index, Value::Date)?,
        "TIME" => get_value(row, index, Value::Time)?,
        "DATETIME" => get_value(row, index, Value::DateTime)?,
        "TIMESTAMP" => get_value(row, index, |v: DateTime<Utc>| {
            Value::DateTime(v.naive_utc())
        })?,
        "JSON" => get_value(row, index, Value::Json)?,
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column.name().to_string(),
                column_type: column_type.to_string(),
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T>(row: &'r MySqlRow, index: usize, to_value: impl Fn(T) -> Value) -> Result<Value>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    match row
        .try_get::<Option<T>, usize>(index)
        .map_err(|error| ConversionError(error.to_string()))?
    {
        Some(value) => Ok(to_value(value)),
        None => Ok(Value::Null),
    }
}
