use std::fs::File;
use std::path::Path;

use log::debug;

use crate::error::{Result, SmoothError};
use crate::sequence::{Index, LabelValue, LabeledSequence};

/// Field spellings read as a missing value.
const MISSING_MARKERS: [&str; 6] = ["", "nan", "NaN", "NA", "null", "None"];

fn parse_value(field: &str) -> Option<f64> {
    let field = field.trim();
    if MISSING_MARKERS.contains(&field) {
        return Some(f64::NAN);
    }
    field.parse::<f64>().ok()
}

fn column_position(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SmoothError::UnknownColumn(column.to_string()))
}

/// Reads a long-format CSV table into a labeled sequence.
///
/// Each of `index_columns` becomes one index tier, outermost first; its fields
/// are parsed as integers, then floats, then text (empty fields are `Null`).
/// `value_column` holds the values; empty fields and the usual `NaN`/`NA`/`null`
/// spellings become missing values. Row order is kept.
///
/// # Errors
///
/// A value field that is neither a number nor a missing marker fails with
/// [`SmoothError::InvalidValue`], naming its line in the file.
pub fn read_csv_sequence<P: AsRef<Path>>(
    path: P,
    index_columns: &[&str],
    value_column: &str,
) -> Result<LabeledSequence> {
    let file = File::open(path.as_ref())?;
    let mut rdr = csv::Reader::from_reader(file);

    // Read headers once and get the column indices
    let headers = rdr.headers()?.clone();
    let tier_cols = index_columns
        .iter()
        .map(|c| column_position(&headers, c))
        .collect::<Result<Vec<_>>>()?;
    let value_col = column_position(&headers, value_column)?;

    let mut tiers: Vec<Vec<LabelValue>> = vec![Vec::new(); tier_cols.len()];
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        for (tier, &col) in tiers.iter_mut().zip(&tier_cols) {
            tier.push(LabelValue::parse(record.get(col).unwrap_or("")));
        }
        let field = record.get(value_col).unwrap_or("");
        let value = parse_value(field).ok_or_else(|| SmoothError::InvalidValue {
            line: record.position().map_or(0, |p| p.line()),
            column: value_column.to_string(),
            field: field.to_string(),
        })?;
        values.push(value);
    }
    debug!(
        "read {} rows from {} with {} index column(s)",
        values.len(),
        path.as_ref().display(),
        tier_cols.len()
    );

    let index = if tiers.is_empty() {
        Index::positional(values.len())
    } else {
        Index::from_tiers(tiers)?
    };
    LabeledSequence::new(values, index)
}

/// Writes a labeled sequence as CSV: one column per index tier, then the values.
///
/// `index_names` must name every tier. Missing values are written as empty fields.
pub fn write_csv_sequence<P: AsRef<Path>>(
    path: P,
    seq: &LabeledSequence,
    index_names: &[&str],
    value_name: &str,
) -> Result<()> {
    let nlevels = seq.index().nlevels();
    if index_names.len() != nlevels {
        return Err(SmoothError::LengthMismatch {
            expected: nlevels,
            actual: index_names.len(),
        });
    }
    let tiers = (0..nlevels as isize)
        .map(|level| seq.index().level(level))
        .collect::<Result<Vec<_>>>()?;

    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    let mut header: Vec<&str> = index_names.to_vec();
    header.push(value_name);
    wtr.write_record(&header)?;

    for (row, value) in seq.values().iter().enumerate() {
        let mut record: Vec<String> = tiers.iter().map(|t| t[row].to_string()).collect();
        record.push(if value.is_nan() {
            String::new()
        } else {
            value.to_string()
        });
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
