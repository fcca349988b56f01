//! Dataset store: loads the stroke CSV once at startup and cleans it.
//!
//! Cleaning is limited to two rules: missing `bmi` values are set to the
//! column median (computed over the non-missing values), and missing
//! `smoking_status` values are set to the literal label "Unknown". No other
//! validation happens; out-of-range values pass through unchanged. The
//! resulting DataFrame is immutable for the process lifetime.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Columns the source file must provide, in schema order.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "ever_married",
    "work_type",
    "Residence_type",
    "avg_glucose_level",
    "bmi",
    "smoking_status",
    "stroke",
];

/// Reads and cleans the stroke dataset. Any failure here is fatal at
/// startup; the server must not serve traffic without a loaded table.
pub fn load(path: &Path) -> Result<DataFrame> {
    let read_options = CsvReadOptions::default().map_parse_options(|opts| {
        opts.with_null_values(Some(NullValues::AllColumnsSingle(PlSmallStr::from("N/A"))))
    });
    let df = read_options
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    check_schema(&df)?;

    let bmi_median = column_median(&df, "bmi")?
        .ok_or_else(|| eyre!("bmi column has no non-missing values to impute from"))?;

    let cleaned = df
        .lazy()
        .with_columns([
            col("id").cast(DataType::Int64),
            col("age").cast(DataType::Float64),
            col("avg_glucose_level").cast(DataType::Float64),
            col("hypertension").cast(DataType::Int64),
            col("heart_disease").cast(DataType::Int64),
            col("stroke").cast(DataType::Int64),
            col("bmi").cast(DataType::Float64).fill_null(lit(bmi_median)),
            col("smoking_status")
                .cast(DataType::String)
                .fill_null(lit("Unknown")),
        ])
        .collect()?;

    Ok(cleaned)
}

fn check_schema(df: &DataFrame) -> Result<()> {
    let names = df.get_column_names();
    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|n| n.as_str() == required) {
            return Err(eyre!("source file is missing required column {required}"));
        }
    }
    Ok(())
}

/// Median of the non-missing values of a numeric column, with linear
/// interpolation between the two middle values for even counts (the same
/// convention the original dataset tooling used). None when the column is
/// entirely missing.
fn column_median(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    let mut values = non_null_f64(df, name)?;
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    Ok(Some(median))
}

/// Non-null values of a numeric column as f64, accepting the integer and
/// float types the CSV reader infers.
pub(crate) fn non_null_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?;
    let series = column.as_materialized_series();
    let values = if let Ok(f64_values) = series.f64() {
        f64_values.iter().flatten().collect()
    } else if let Ok(i64_values) = series.i64() {
        i64_values.iter().flatten().map(|v| v as f64).collect()
    } else {
        let cast = series.cast(&DataType::Float64)?;
        cast.f64()?.iter().flatten().collect()
    };
    Ok(values)
}

/// Serializes every row for the full-dataset export. Field names are kept
/// verbatim from the source schema; any residual missing or non-finite
/// value becomes JSON null.
pub fn records(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    enum ColumnValues<'a> {
        Int(&'a Int64Chunked),
        Float(&'a Float64Chunked),
        Str(&'a StringChunked),
    }

    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        let values = match series.dtype() {
            DataType::Int64 => ColumnValues::Int(series.i64()?),
            DataType::Float64 => ColumnValues::Float(series.f64()?),
            _ => ColumnValues::Str(series.str()?),
        };
        columns.push((column.name().to_string(), values));
    }

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut row = Map::with_capacity(columns.len());
        for (name, values) in &columns {
            let value = match values {
                ColumnValues::Int(ca) => ca
                    .get(i)
                    .map(|v| Value::Number(Number::from(v)))
                    .unwrap_or(Value::Null),
                ColumnValues::Float(ca) => ca
                    .get(i)
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                ColumnValues::Str(ca) => ca
                    .get(i)
                    .map(|v| Value::String(v.to_string()))
                    .unwrap_or(Value::Null),
            };
            row.insert(name.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}
