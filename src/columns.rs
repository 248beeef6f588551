//! Row to column reshaping and typed column extraction.
//!
//! Quandl returns data row by row (`[[date, open, close], ...]`). Analysis
//! usually wants one sequence per column; [`to_columns`] and
//! [`to_named_columns`] transpose a matrix, and the `*_column` helpers turn
//! a column of [`CellValue`]s into a homogeneous `Vec`.

use crate::error::{Error, Result};
use crate::types::{CellValue, Rows, SymbolResponse, SymbolsResponse};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Date pattern used by Quandl for date cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Transpose a row-major matrix: `out[j][i] == rows[i][j]`.
///
/// The width is taken from the first row; a row of any other width is an
/// error. Row order is preserved within each column.
pub fn to_columns(rows: &[Vec<CellValue>]) -> Result<Rows> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let width = first.len();

    let mut out: Rows = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(Error::Shape(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                width
            )));
        }
        for (column, cell) in out.iter_mut().zip(row) {
            column.push(cell.clone());
        }
    }
    Ok(out)
}

/// Transpose a row-major matrix into columns keyed by `keys[j]`.
///
/// `keys` must be distinct and have one entry per cell of each row.
pub fn to_named_columns<K: AsRef<str>>(
    rows: &[Vec<CellValue>],
    keys: &[K],
) -> Result<HashMap<String, Vec<CellValue>>> {
    if let Some(first) = rows.first() {
        if first.len() != keys.len() {
            return Err(Error::Shape(format!(
                "{} keys given for rows of {} cells",
                keys.len(),
                first.len()
            )));
        }
    }

    let columns = to_columns(rows)?;
    let mut out = HashMap::with_capacity(keys.len());
    let mut columns = columns.into_iter();
    for key in keys {
        let column = columns.next().unwrap_or_default();
        if out.insert(key.as_ref().to_string(), column).is_some() {
            return Err(Error::Shape(format!("duplicate column key {:?}", key.as_ref())));
        }
    }
    Ok(out)
}

/// Convert a column of number cells to `f64`s.
pub fn float_column(column: &[CellValue]) -> Result<Vec<f64>> {
    column
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            CellValue::Number(n) => Ok(*n),
            other => Err(mismatch(index, "number", other)),
        })
        .collect()
}

/// Convert a column of `YYYY-MM-DD` text cells to dates.
pub fn time_column(column: &[CellValue]) -> Result<Vec<NaiveDate>> {
    column
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            CellValue::Text(s) => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|source| Error::InvalidDate {
                    index,
                    value: s.clone(),
                    source,
                })
            }
            other => Err(mismatch(index, "text", other)),
        })
        .collect()
}

/// Convert a column of text cells to `String`s.
pub fn string_column(column: &[CellValue]) -> Result<Vec<String>> {
    column
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            CellValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch(index, "text", other)),
        })
        .collect()
}

fn mismatch(index: usize, expected: &'static str, found: &CellValue) -> Error {
    Error::TypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

impl SymbolResponse {
    /// The data as columns, see [`to_columns`].
    pub fn to_columns(&self) -> Result<Rows> {
        to_columns(&self.data)
    }

    /// The data as named columns.
    ///
    /// Without `keys`, the response's own column names are used.
    pub fn to_named_columns(&self, keys: Option<&[&str]>) -> Result<HashMap<String, Vec<CellValue>>> {
        match keys {
            Some(keys) => to_named_columns(&self.data, keys),
            None => to_named_columns(&self.data, self.column_names()),
        }
    }
}

impl SymbolsResponse {
    /// The joined data as columns, see [`to_columns`].
    pub fn to_columns(&self) -> Result<Rows> {
        to_columns(&self.data)
    }

    /// The joined data as named columns.
    ///
    /// Without `keys`, the response's own column names are used.
    pub fn to_named_columns(&self, keys: Option<&[&str]>) -> Result<HashMap<String, Vec<CellValue>>> {
        match keys {
            Some(keys) => to_named_columns(&self.data, keys),
            None => to_named_columns(&self.data, &self.column_names),
        }
    }
}
