use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;

/// One raw cell of a candidate row, as handed over by the search oracle.
///
/// Values stay in this shape until the normalizer, so an unknown field is
/// never confused with a known zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<serde_json::Value>),
    Other(serde_json::Value),
}

const UNKNOWN_MARKERS: &[&str] = &["nan", "<na>", "none", "null", "nat"];

static MISSING: FieldValue = FieldValue::Missing;

impl FieldValue {
    /// True for absent values, NaN numbers and textual NaN/null markers.
    pub fn is_unknown(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Number(n) => n.is_nan(),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty()
                    || UNKNOWN_MARKERS
                        .iter()
                        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
            }
            FieldValue::Other(value) => value.is_null(),
            FieldValue::Bool(_) | FieldValue::List(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if self.is_unknown() {
            return None;
        }
        let value = match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Other(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        value.filter(|n| n.is_finite())
    }

    /// Integer view of the value; fractional numbers are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n.trunc() as i64)
    }

    pub fn as_text(&self) -> Option<String> {
        if self.is_unknown() {
            return None;
        }
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::List(items) => serde_json::to_string(items).ok(),
            FieldValue::Other(value) => Some(value.to_string()),
            FieldValue::Missing => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value.into_iter().map(serde_json::Value::String).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Missing)
    }
}

/// A single row returned by the external listing search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRow {
    fields: BTreeMap<String, FieldValue>,
}

impl CandidateRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Field lookup; absent keys read as [`FieldValue::Missing`].
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&MISSING)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).as_text()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).as_f64()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a row from one CSV record. Cells stay textual so values such as
    /// zip codes keep their leading zeros; coercion happens later.
    pub fn from_csv_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let mut row = Self::new();
        for (name, cell) in headers.iter().zip(record.iter()) {
            let value = if cell.is_empty() {
                FieldValue::Missing
            } else if cell.starts_with('[') {
                serde_json::from_str::<Vec<serde_json::Value>>(cell)
                    .map(FieldValue::List)
                    .unwrap_or_else(|_| FieldValue::Text(cell.to_string()))
            } else {
                FieldValue::Text(cell.to_string())
            };
            row.insert(name, value);
        }
        row
    }
}

/// Reads every record of a CSV export (header row = field names).
pub fn read_csv_rows<R: io::Read>(reader: R) -> Result<Vec<CandidateRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(CandidateRow::from_csv_record(&headers, &record?));
    }
    Ok(rows)
}
