use crate::classify::ColumnRole;
use thiserror::Error;

/// Failures while deriving chart specifications from a dataset.
///
/// None of these are recovered: the dashboard is either fully built or not
/// built at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("dataset is empty, no first record to classify")]
    EmptyDataset,

    #[error("need at least {required} categorical field(s), found {found}")]
    MissingCategorical { required: usize, found: usize },

    #[error("need at least 1 numeric field, found none")]
    MissingNumeric,

    #[error("field '{0}' is not present in the first record")]
    UnknownField(String),

    #[error("field '{field}' is not {expected}")]
    RoleMismatch { field: String, expected: ColumnRole },

    #[error("record {row}: field '{field}' should be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        row: usize,
        expected: ColumnRole,
        found: &'static str,
    },
}
