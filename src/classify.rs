use crate::data::Dataset;
use crate::error::BindError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Role of a field, decided from its value in the first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl ColumnRole {
    /// Role of a single value, `None` for booleans, nulls and nested values.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) => Some(ColumnRole::Numeric),
            Value::String(_) => Some(ColumnRole::Categorical),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Numeric => write!(f, "numeric"),
            ColumnRole::Categorical => write!(f, "categorical"),
        }
    }
}

/// Field names grouped by role, in first-record order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Columns {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Columns {
    pub fn role_of(&self, field: &str) -> Option<ColumnRole> {
        if self.numeric.iter().any(|f| f == field) {
            Some(ColumnRole::Numeric)
        } else if self.categorical.iter().any(|f| f == field) {
            Some(ColumnRole::Categorical)
        } else {
            None
        }
    }
}

/// Classify the fields of the first record. Later records are not inspected.
pub fn classify_columns(dataset: &Dataset) -> Result<Columns, BindError> {
    let first = dataset.first().ok_or(BindError::EmptyDataset)?;

    let mut columns = Columns::default();
    for (field, value) in first {
        match ColumnRole::of(value) {
            Some(ColumnRole::Numeric) => columns.numeric.push(field.clone()),
            Some(ColumnRole::Categorical) => columns.categorical.push(field.clone()),
            None => {}
        }
    }

    log::debug!(
        "classified columns: numeric={:?} categorical={:?}",
        columns.numeric,
        columns.categorical
    );

    Ok(columns)
}
