//! Write records back out as CSV.
//!
//! Columns follow the key order of the source [`RecordSet`]. Numbers are
//! written in their shortest form (`12`, not `12.0`).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportResult;
use crate::models::{Record, RecordSet};

/// Write `records` with a header row made of `keys`.
pub fn write_csv<'a, W, I>(writer: W, keys: &[String], records: I) -> ExportResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(keys)?;

    let mut written = 0;
    for record in records {
        let row = keys
            .iter()
            .map(|k| record.get(k).map(|v| v.to_string()).unwrap_or_default());
        csv_writer.write_record(row)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Write a whole record set to a file.
pub fn write_csv_file(path: &Path, set: &RecordSet) -> ExportResult<usize> {
    write_records_file(path, &set.keys, set.iter())
}

/// Write a subset of records (e.g. a query result) to a file.
pub fn write_records_file<'a, I>(path: &Path, keys: &[String], records: I) -> ExportResult<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let file = File::create(path)?;
    write_csv(file, keys, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    fn options() -> ParseOptions {
        ParseOptions::new().with_numeric_keys(["order_quantity"])
    }

    #[test]
    fn test_write_in_header_order() {
        let set = parse("Item Name,Order Quantity,Category\nMilk,4,Dairy\nFlour,2.5,Dry", &options());

        let mut out = Vec::new();
        let written = write_csv(&mut out, &set.keys, set.iter()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            text,
            "item_name,order_quantity,category\nMilk,4,Dairy\nFlour,2.5,Dry\n"
        );
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        let set = parse("Item Name\n\"Oil, Olive\"", &options());

        let mut out = Vec::new();
        write_csv(&mut out, &set.keys, set.iter()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("\"Oil, Olive\"\n"));
        let reparsed = parse(&text, &options());
        assert_eq!(reparsed.records[0].text("item_name"), "Oil, Olive");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let set = parse("Item Name,Order Quantity\nMilk,abc", &options());

        assert_eq!(write_csv_file(&path, &set).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "item_name,order_quantity\nMilk,0\n");
    }

    #[test]
    fn test_write_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subset.csv");
        let set = parse("Item Name\nA\nB\nC", &options());
        let subset: Vec<&Record> = set.iter().filter(|r| r.text("item_name") != "B").collect();

        assert_eq!(write_records_file(&path, &set.keys, subset).unwrap(), 2);
    }
}
