//! Polars helpers shared by the loaders and writers.
//!
//! Tables are read with every column as a string so that stock codes keep
//! their leading zeros; numeric columns are cast on access.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;
use tracing::debug;
use valueup_traits::{Result, ValueUpError, normalize_stock_code};

/// Read a CSV file with a header row, all columns as strings.
///
/// # Errors
///
/// Returns [`ValueUpError::MissingInputFile`] if `path` does not exist and
/// a Polars error if it cannot be parsed.
pub(crate) fn read_table(path: &Path, year: Option<i32>) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(ValueUpError::MissingInputFile {
            path: path.to_path_buf(),
            year,
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(path = %path.display(), rows = df.height(), "loaded table");
    Ok(df)
}

/// Write `df` as CSV with a header row, creating parent directories.
pub(crate) fn write_table(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}

// Headers written by Excel-friendly exports start with a byte-order mark.
fn header_matches(header: &str, name: &str) -> bool {
    header.trim_start_matches('\u{feff}').trim() == name
}

/// Whether `df` has a column called `name`.
pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_columns()
        .iter()
        .any(|c| header_matches(c.name().as_str(), name))
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.get_columns()
        .iter()
        .find(|c| header_matches(c.name().as_str(), name))
        .ok_or_else(|| ValueUpError::MissingColumn(name.to_string()))
}

/// Trimmed string values; blanks become `None`.
pub(crate) fn strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column(df, name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Finite floating-point values; anything unparsable becomes `None`.
pub(crate) fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Boolean flags written as `True`/`False`; blanks and `NaN` are false.
pub(crate) fn flags(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    Ok(strings(df, name)?
        .into_iter()
        .map(|v| v.is_some_and(|s| parse_flag(&s)))
        .collect())
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "1.0" | "y" | "yes"
    )
}

/// Normalized stock codes from the `stockcode` column.
pub(crate) fn stock_codes(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(strings(df, name)?
        .into_iter()
        .map(|v| v.and_then(|s| normalize_stock_code(&s)))
        .collect())
}
