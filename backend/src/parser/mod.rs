//! CSV text to typed records.
//!
//! Handles the spreadsheet "publish as CSV" dialect: comma separated, one
//! record per line, optional double-quote field quoting, header row first.
//! Doubled quotes and newlines inside quoted fields are not supported.
//!
//! Parsing never fails. Bad numbers become `0`, short rows are padded with
//! empty strings, an unterminated quote runs to the end of its line, and rows
//! without an identifying value are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::{FieldValue, Record, RecordSet};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid regex")
});

/// Options controlling coercion and row filtering.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Normalized keys whose values are stored as numbers.
    pub numeric_keys: HashSet<String>,
    /// Key whose value must be present for a row to be kept: non-empty
    /// text, or a number other than zero.
    /// `None` uses the first header column.
    pub required_key: Option<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_required_key(mut self, key: impl Into<String>) -> Self {
        self.required_key = Some(key.into());
        self
    }
}

/// Parse outcome with the bookkeeping callers may want to report.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Surviving records.
    pub records: RecordSet,
    /// Header tokens as they appeared, trimmed.
    pub headers: Vec<String>,
    /// Key used to decide whether a row is kept.
    pub required_key: Option<String>,
    /// Number of data lines read (header excluded).
    pub data_lines: usize,
    /// Rows dropped for lacking the identifying value.
    pub dropped_rows: usize,
    /// Normalized keys produced by more than one header column.
    pub duplicate_keys: Vec<String>,
}

/// Lowercase a header and collapse whitespace runs into `_`.
///
/// # Example
/// ```
/// use inventory::parser::normalize_key;
///
/// assert_eq!(normalize_key("Item Name"), "item_name");
/// assert_eq!(normalize_key("Default   Supplier"), "default_supplier");
/// ```
pub fn normalize_key(header: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&header.to_lowercase(), "_")
        .into_owned()
}

/// Split one line on commas that are outside double quotes.
///
/// Quote characters toggle the quoted state and are dropped from the output.
/// An unterminated quote simply lasts until the end of the line.
///
/// # Example
/// ```
/// use inventory::parser::split_fields;
///
/// assert_eq!(split_fields(r#""a,b",c"#), vec!["a,b", "c"]);
/// ```
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Read the leading number of `value`, or `0` when there is none.
///
/// Trailing text after the number is ignored, so `"12 kg"` reads as `12`.
pub fn parse_number(value: &str) -> f64 {
    NUMBER_PREFIX
        .find(value.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse CSV text into records.
///
/// # Example
/// ```
/// use inventory::parser::{parse, ParseOptions};
///
/// let options = ParseOptions::new().with_numeric_keys(["order_quantity"]);
/// let set = parse("Item Name,Order Quantity\nWidget,12.5", &options);
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.records[0].text("item_name"), "Widget");
/// assert_eq!(set.records[0].number("order_quantity"), 12.5);
/// ```
pub fn parse(raw_text: &str, options: &ParseOptions) -> RecordSet {
    parse_with_report(raw_text, options).records
}

/// Parse CSV text and report what was dropped along the way.
pub fn parse_with_report(raw_text: &str, options: &ParseOptions) -> ParseResult {
    let content = raw_text.trim();
    if content.is_empty() {
        return ParseResult::default();
    }

    let mut lines = content.split('\n');
    let header_line = lines.next().unwrap_or_default();

    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();
    let header_keys: Vec<String> = headers.iter().map(|h| normalize_key(h)).collect();

    let mut keys: Vec<String> = Vec::with_capacity(header_keys.len());
    let mut duplicate_keys = Vec::new();
    for key in &header_keys {
        if keys.contains(key) {
            if !duplicate_keys.contains(key) {
                duplicate_keys.push(key.clone());
            }
        } else {
            keys.push(key.clone());
        }
    }

    let required_key = options
        .required_key
        .clone()
        .or_else(|| header_keys.first().cloned());

    let mut records = Vec::new();
    let mut data_lines = 0;

    for line in lines {
        data_lines += 1;
        let record = build_record(line, &header_keys, &options.numeric_keys);

        let keep = match required_key.as_deref() {
            Some(key) => record.has_value(key),
            None => false,
        };
        if keep {
            records.push(record);
        }
    }

    let dropped_rows = data_lines - records.len();

    ParseResult {
        records: RecordSet::new(keys, records),
        headers,
        required_key,
        data_lines,
        dropped_rows,
        duplicate_keys,
    }
}

/// Zip one data line with the header keys, coercing numeric columns.
fn build_record(line: &str, header_keys: &[String], numeric_keys: &HashSet<String>) -> Record {
    let values = split_fields(line);
    let mut record = Record::new();

    for (i, key) in header_keys.iter().enumerate() {
        let value = values.get(i).map(|v| v.trim()).unwrap_or("");

        let field = if numeric_keys.contains(key) {
            FieldValue::Number(parse_number(value))
        } else {
            FieldValue::Text(value.to_string())
        };
        record.insert(key.clone(), field);
    }

    record
}

// =============================================================================
// Text decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the given encoding, falling back to lossy UTF-8.
///
/// Latin-1 labels decode as Windows-1252, its superset.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode bytes: a byte-order mark wins, then valid UTF-8, then chardet.
///
/// The BOM itself is never part of the returned text.
pub fn decode_auto(bytes: &[u8]) -> String {
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(bytes) {
        return encoding.decode(bytes).0.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_content(bytes, &detect_encoding(bytes)),
    }
}

/// Decode bytes with a declared charset label (e.g. from `Content-Type`).
///
/// Unknown or missing labels fall back to [`decode_auto`]. A BOM still
/// overrides the label and is stripped.
pub fn decode_with_charset(bytes: &[u8], charset: Option<&str>) -> String {
    match charset.and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes())) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => decode_auto(bytes),
    }
}
