// Derives the three dashboard charts from a dataset

use crate::chart::{ChartData, ChartKind, ChartSpec, Dashboard, Slice};
use crate::classify::{classify_columns, ColumnRole, Columns};
use crate::data::{value_kind, Dataset};
use crate::error::BindError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Explicit field choices. Unset entries fall back to detection order:
/// first categorical, second categorical, first numeric.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Binding {
    pub primary_category: Option<String>,
    pub secondary_category: Option<String>,
    pub primary_numeric: Option<String>,
}

/// Field names actually bound to the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBinding {
    pub primary_category: String,
    pub secondary_category: String,
    pub primary_numeric: String,
}

impl Binding {
    pub fn resolve(&self, columns: &Columns) -> Result<ResolvedBinding, BindError> {
        let primary_category = match &self.primary_category {
            Some(field) => check_role(columns, field, ColumnRole::Categorical)?,
            None => positional(&columns.categorical, 0).ok_or(BindError::MissingCategorical {
                required: 1,
                found: columns.categorical.len(),
            })?,
        };

        let secondary_category = match &self.secondary_category {
            Some(field) => check_role(columns, field, ColumnRole::Categorical)?,
            None => positional(&columns.categorical, 1).ok_or(BindError::MissingCategorical {
                required: 2,
                found: columns.categorical.len(),
            })?,
        };

        let primary_numeric = match &self.primary_numeric {
            Some(field) => check_role(columns, field, ColumnRole::Numeric)?,
            None => positional(&columns.numeric, 0).ok_or(BindError::MissingNumeric)?,
        };

        Ok(ResolvedBinding {
            primary_category,
            secondary_category,
            primary_numeric,
        })
    }
}

fn positional(fields: &[String], idx: usize) -> Option<String> {
    fields.get(idx).cloned()
}

fn check_role(columns: &Columns, field: &str, expected: ColumnRole) -> Result<String, BindError> {
    match columns.role_of(field) {
        Some(role) if role == expected => Ok(field.to_string()),
        Some(_) => Err(BindError::RoleMismatch {
            field: field.to_string(),
            expected,
        }),
        None => Err(BindError::UnknownField(field.to_string())),
    }
}

/// Classify, resolve the binding and build all three charts.
pub fn bind_dashboard(dataset: &Dataset, binding: &Binding) -> Result<Dashboard, BindError> {
    let columns = classify_columns(dataset)?;
    let resolved = binding.resolve(&columns)?;

    log::info!(
        "binding category='{}' grouping='{}' value='{}'",
        resolved.primary_category,
        resolved.secondary_category,
        resolved.primary_numeric
    );

    Ok(Dashboard {
        chart1: build_bar_spec(dataset, &resolved.primary_category, &resolved.primary_numeric)?,
        chart2: build_pie_spec(dataset, &resolved.secondary_category)?,
        chart3: build_line_spec(dataset, &resolved.primary_category, &resolved.primary_numeric)?,
    })
}

pub fn build_bar_spec(
    dataset: &Dataset,
    category_field: &str,
    numeric_field: &str,
) -> Result<ChartSpec, BindError> {
    Ok(ChartSpec {
        kind: ChartKind::Bar,
        title: format!("{} by {}", numeric_field, category_field),
        data: extract_series(dataset, category_field, numeric_field)?,
    })
}

pub fn build_line_spec(
    dataset: &Dataset,
    category_field: &str,
    numeric_field: &str,
) -> Result<ChartSpec, BindError> {
    Ok(ChartSpec {
        kind: ChartKind::Line,
        title: format!("{} Trend", numeric_field),
        data: extract_series(dataset, category_field, numeric_field)?,
    })
}

/// Count occurrences of each distinct value of `field`, first-seen order.
pub fn build_pie_spec(dataset: &Dataset, field: &str) -> Result<ChartSpec, BindError> {
    let mut slices: Vec<Slice> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, record) in dataset.records().iter().enumerate() {
        let name = text_at(record.get(field), field, row)?;
        match index.get(name) {
            Some(&i) => slices[i].value += 1,
            None => {
                index.insert(name.to_string(), slices.len());
                slices.push(Slice {
                    name: name.to_string(),
                    value: 1,
                });
            }
        }
    }

    Ok(ChartSpec {
        kind: ChartKind::Pie,
        title: format!("Distribution of {}", field),
        data: ChartData::Grouped(slices),
    })
}

fn extract_series(
    dataset: &Dataset,
    category_field: &str,
    numeric_field: &str,
) -> Result<ChartData, BindError> {
    let mut categories = Vec::with_capacity(dataset.len());
    let mut values = Vec::with_capacity(dataset.len());

    for (row, record) in dataset.records().iter().enumerate() {
        categories.push(text_at(record.get(category_field), category_field, row)?.to_string());
        values.push(number_at(record.get(numeric_field), numeric_field, row)?);
    }

    Ok(ChartData::Series { categories, values })
}

fn text_at<'a>(value: Option<&'a Value>, field: &str, row: usize) -> Result<&'a str, BindError> {
    match value {
        Some(Value::String(s)) => Ok(s.as_str()),
        other => Err(mismatch(other, field, row, ColumnRole::Categorical)),
    }
}

fn number_at(value: Option<&Value>, field: &str, row: usize) -> Result<f64, BindError> {
    match value.and_then(Value::as_f64) {
        Some(n) => Ok(n),
        None => Err(mismatch(value, field, row, ColumnRole::Numeric)),
    }
}

fn mismatch(value: Option<&Value>, field: &str, row: usize, expected: ColumnRole) -> BindError {
    BindError::TypeMismatch {
        field: field.to_string(),
        row,
        expected,
        found: value.map(value_kind).unwrap_or("missing"),
    }
}
