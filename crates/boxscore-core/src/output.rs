//! Column layout shared by every sink, so database rows and extract lines carry the same
//! fields in the same order.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A single output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Count(i32),
    Decimal(Decimal),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Text form used by the delimited extract.
    pub fn to_field(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Count(value) => value.to_string(),
            FieldValue::Decimal(value) => value.to_string(),
            FieldValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Count(i32::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Count(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// An enriched row that can be delivered to a sink.
pub trait OutputRecord {
    /// Target table of the database sink.
    const TABLE: &'static str;
    /// File name used by the file sink inside the extract directory.
    const EXTRACT_FILE: &'static str;

    fn columns() -> &'static [String];

    /// Cell values, aligned one-to-one with [`OutputRecord::columns`].
    fn values(&self) -> Vec<FieldValue>;
}

pub(crate) fn prefixed<'a>(
    prefix: &'a str,
    names: &'a [&'a str],
) -> impl Iterator<Item = String> + 'a {
    names.iter().map(move |name| format!("{prefix}_{name}"))
}
