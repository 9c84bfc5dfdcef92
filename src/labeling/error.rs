use thiserror::Error;

use super::label::LabelType;
use super::oracle::OracleError;
use crate::table::RowId;

/// Errors surfaced to the operator by a labeling session.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The operator declared a label type outside the supported set.
    #[error("{given:?} is not a supported label type; please provide one of: {}", allowed.join(", "))]
    InvalidLabelType {
        /// Raw operator response.
        given: String,
        /// Accepted type names.
        allowed: Vec<&'static str>,
    },
    /// The consistency sample would contain no rows.
    #[error(
        "consistency sample is empty: {fraction} of {labeled} labeled row(s) rounds to zero; \
         raise the sample fraction or label more rows"
    )]
    ZeroSampleSize {
        /// Number of labeled rows available for sampling.
        labeled: usize,
        /// Requested sample fraction.
        fraction: f64,
    },
    /// A label or feature column is not present in the table.
    #[error("column {column:?} not found; available columns: {}", available.join(", "))]
    MissingColumn {
        /// Requested column name.
        column: String,
        /// Columns present in the table.
        available: Vec<String>,
    },
    /// An operator response could not be coerced to the declared label type.
    #[error("row {row}: {response:?} is not a valid {label_type} label")]
    InvalidLabelValue {
        row: RowId,
        response: String,
        label_type: LabelType,
    },
    /// The consistency sample fraction is outside `(0, 1]`.
    #[error("sample fraction must be within (0, 1], got {0}")]
    InvalidSampleFraction(f64),
    /// Labels and row identities do not line up one-to-one.
    #[error("{labels} label(s) supplied for {rows} row(s)")]
    LabelCountMismatch { rows: usize, labels: usize },
    /// A row identity does not exist in the table.
    #[error("row {row} is out of range for a table of {row_count} row(s)")]
    RowOutOfRange { row: RowId, row_count: usize },
    /// The oracle failed to answer.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}
