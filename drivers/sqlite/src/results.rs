use sqlx::sqlite::{SqliteColumn, SqliteRow};
use sqlx::{Column, Decode, Row as _, Sqlite, Type, TypeInfo, ValueRef};
use ucrud_driver::Error::{ConversionError, UnsupportedColumnType};
use ucrud_driver::{Result, Row, Value};

/// Convert SQLite rows into column names and values
pub(crate) fn convert_rows(rows: &[SqliteRow]) -> Result<(Vec<String>, Vec<Row>)> {
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

/// SQLite is dynamically typed, so values are decoded by their storage class rather than the
/// declared column type.
///
/// Reference: <https://www.sqlite.org/datatype3.html>
pub(crate) fn convert_to_value(row: &SqliteRow, column: &SqliteColumn) -> Result<Value> {
    let index = column.ordinal();
    let raw_value = row
        .try_get_raw(index)
        .map_err(|error| ConversionError(error.to_string()))?;
    if raw_value.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw_value.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::I64(get_value(row, index)?),
        "REAL" => Value::F64(get_value(row, index)?),
        "TEXT" | "DATE" | "TIME" | "DATETIME" => Value::String(get_value(row, index)?),
        "BLOB" => Value::Bytes(get_value(row, index)?),
        "NUMERIC" => match get_value::<i64>(row, index) {
            Ok(value) => Value::I64(value),
            Err(_) => Value::F64(get_value(row, index)?),
        },
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column.name().to_string(),
                column_type: storage_class,
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T>(row: &'r SqliteRow, index: usize) -> Result<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get::<T, usize>(index)
        .map_err(|error| ConversionError(error.to_string()))
}
