//! Domain models for the inventory reader.
//!
//! - [`FieldValue`] - a single cell, either text or a number
//! - [`Record`] - one spreadsheet row keyed by normalized header
//! - [`RecordSet`] - the rows produced by one parse call
//! - [`InventoryItem`] - typed view of an inventory row

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Field Value
// =============================================================================

/// Value of one cell after coercion.
///
/// Columns listed as numeric always hold [`FieldValue::Number`]; every other
/// column holds [`FieldValue::Text`], possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Numeric content, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Carries no usable value: empty text, zero or NaN.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One parsed row, keyed by normalized header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing value under the same key is replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text under `key`, or `""` when absent or numeric.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Number under `key`, or `0.0` when absent or textual.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(FieldValue::as_number).unwrap_or(0.0)
    }

    /// True when `key` holds a non-blank value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_blank())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

// =============================================================================
// Record Set
// =============================================================================

/// Rows produced by one parse call, in input line order.
///
/// `keys` lists the normalized header keys in column order, without
/// duplicates. Every record carries exactly these keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub keys: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(keys: Vec<String>, records: Vec<Record>) -> Self {
        Self { keys, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Typed inventory view of every record.
    pub fn items(&self) -> Vec<InventoryItem> {
        self.records.iter().map(InventoryItem::from).collect()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A row of the inventory sheet with its well-known columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_name: String,
    pub category: String,
    pub default_supplier: String,
    pub supplier_alternative: String,
    pub order_quantity: f64,
    pub measure_unit: String,
    pub default_quantity: f64,
    pub brand_tag: String,
}

impl From<&Record> for InventoryItem {
    fn from(record: &Record) -> Self {
        Self {
            item_name: record.text("item_name").to_string(),
            category: record.text("category").to_string(),
            default_supplier: record.text("default_supplier").to_string(),
            supplier_alternative: record.text("supplier_alternative").to_string(),
            order_quantity: record.number("order_quantity"),
            measure_unit: record.text("measure_unit").to_string(),
            default_quantity: record.number("default_quantity"),
            brand_tag: record.text("brand_tag").to_string(),
        }
    }
}
