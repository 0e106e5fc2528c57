use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::io::Read;

/// One flat data item. Field order follows the decoded source.
pub type Record = Map<String, Value>;

/// Ordered sequence of records as returned by the data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Create a Dataset from a JSON Array of Objects
    pub fn from_json(value: Value) -> Result<Self> {
        let array = match value {
            Value::Array(items) => items,
            _ => return Err(anyhow!("Input data must be a JSON array of objects")),
        };

        let mut records = Vec::with_capacity(array.len());
        for (idx, item) in array.into_iter().enumerate() {
            match item {
                Value::Object(obj) => records.push(obj),
                other => {
                    return Err(anyhow!(
                        "Item {} in array must be an object, found {}",
                        idx,
                        value_kind(&other)
                    ))
                }
            }
        }

        Ok(Self { records })
    }

    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).context("Malformed JSON body")?;
        Self::from_json(value)
    }

    /// Create a Dataset from CSV text. Cells that parse as finite numbers
    /// become numbers unless zero-padded, empty cells become null.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            anyhow::bail!("CSV has no header row");
        }

        let mut records = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let row = result.with_context(|| format!("Failed to read CSV row {}", line + 1))?;
            let mut record = Record::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                record.insert(header.clone(), coerce_cell(cell));
            }
            records.push(record);
        }

        Ok(Self { records })
    }
}

fn coerce_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    if has_leading_zero(cell) {
        return Value::String(cell.to_string());
    }

    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Value::from(v as i64)
            } else {
                Number::from_f64(v)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(cell.to_string()))
            }
        }
        _ => Value::String(cell.to_string()),
    }
}

/// Codes such as `007` or `-01` would not survive a round trip through a number.
fn has_leading_zero(cell: &str) -> bool {
    let digits = cell.strip_prefix(['+', '-']).unwrap_or(cell);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().map_or(false, |c| c.is_ascii_digit())
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_field_order() {
        let ds = Dataset::from_json_str(r#"[{"zeta": 1, "alpha": "a", "mid": 2.5}]"#).unwrap();
        let keys: Vec<&String> = ds.first().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let err = Dataset::from_json(json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_from_json_rejects_scalar_items() {
        let err = Dataset::from_json(json!([{"a": 1}, 5])).unwrap_err();
        assert!(err.to_string().contains("Item 1"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(Dataset::from_json_str("[{\"a\": ").is_err());
    }

    #[test]
    fn test_empty_array_is_a_dataset() {
        let ds = Dataset::from_json_str("[]").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_from_csv_coerces_numbers() {
        let csv = "region, sales, ratio, note\neast, 10, 0.5, \nwest, 20, 1.25, late\n";
        let ds = Dataset::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records()[0];
        assert_eq!(first["region"], json!("east"));
        assert_eq!(first["sales"], json!(10));
        assert_eq!(first["ratio"], json!(0.5));
        assert_eq!(first["note"], Value::Null);
        assert_eq!(ds.records()[1]["note"], json!("late"));

        let keys: Vec<&String> = first.keys().collect();
        assert_eq!(keys, vec!["region", "sales", "ratio", "note"]);
    }

    #[test]
    fn test_from_csv_keeps_zero_padded_codes_as_text() {
        let ds = Dataset::from_csv("code,zip,ratio,zero,region\n007,02134,0.5,0,east\n".as_bytes()).unwrap();
        let record = &ds.records()[0];
        assert_eq!(record["code"], json!("007"));
        assert_eq!(record["zip"], json!("02134"));
        assert_eq!(record["ratio"], json!(0.5));
        assert_eq!(record["zero"], json!(0));

        let cols = crate::classify::classify_columns(&ds).unwrap();
        assert_eq!(cols.numeric, vec!["ratio", "zero"]);
        assert_eq!(cols.categorical, vec!["code", "zip", "region"]);
    }

    #[test]
    fn test_from_csv_keeps_nan_as_text() {
        let ds = Dataset::from_csv("a\nNaN\n".as_bytes()).unwrap();
        assert_eq!(ds.records()[0]["a"], json!("NaN"));
    }
}
