//! Search and filter helpers over parsed records.
//!
//! All helpers borrow the records and return references in input order.
//! Empty queries and empty filter values match everything.

use std::collections::BTreeSet;

use crate::models::Record;

/// Keys of the columns the helpers look at.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFields {
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub supplier_alternative: String,
}

impl Default for QueryFields {
    fn default() -> Self {
        Self {
            name: "item_name".to_string(),
            category: "category".to_string(),
            supplier: "default_supplier".to_string(),
            supplier_alternative: "supplier_alternative".to_string(),
        }
    }
}

/// Distinct non-empty categories, sorted.
pub fn categories(records: &[Record], fields: &QueryFields) -> Vec<String> {
    distinct_sorted(records.iter().map(|r| r.text(&fields.category)))
}

/// Distinct non-empty suppliers from both supplier columns, sorted.
pub fn suppliers(records: &[Record], fields: &QueryFields) -> Vec<String> {
    distinct_sorted(records.iter().flat_map(|r| {
        [
            r.text(&fields.supplier),
            r.text(&fields.supplier_alternative),
        ]
    }))
}

/// Case-insensitive substring search over name, category and default supplier.
///
/// A blank query returns every record.
pub fn search<'a>(records: &'a [Record], query: &str, fields: &QueryFields) -> Vec<&'a Record> {
    if query.trim().is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_search(r, &needle, fields))
        .collect()
}

/// Records whose category equals `category` exactly.
pub fn filter_by_category<'a>(
    records: &'a [Record],
    category: &str,
    fields: &QueryFields,
) -> Vec<&'a Record> {
    if category.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| matches_category(r, category, fields))
        .collect()
}

/// Records where either supplier column equals `supplier` exactly.
pub fn filter_by_supplier<'a>(
    records: &'a [Record],
    supplier: &str,
    fields: &QueryFields,
) -> Vec<&'a Record> {
    if supplier.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| matches_supplier(r, supplier, fields))
        .collect()
}

/// Combined criteria, as used by the CLI and the HTTP API.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

impl ItemQuery {
    /// Keep records matching search, category and supplier at once.
    ///
    /// Absent or blank criteria match everything.
    pub fn apply<'a>(&self, records: &'a [Record], fields: &QueryFields) -> Vec<&'a Record> {
        let needle = self
            .search
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(str::to_lowercase);
        let category = self.category.as_deref().filter(|c| !c.is_empty());
        let supplier = self.supplier.as_deref().filter(|s| !s.is_empty());

        records
            .iter()
            .filter(|r| {
                needle.as_deref().map_or(true, |q| matches_search(r, q, fields))
                    && category.map_or(true, |c| matches_category(r, c, fields))
                    && supplier.map_or(true, |s| matches_supplier(r, s, fields))
            })
            .collect()
    }
}

/// `needle` must already be lowercase.
fn matches_search(record: &Record, needle: &str, fields: &QueryFields) -> bool {
    [&fields.name, &fields.category, &fields.supplier]
        .iter()
        .any(|key| record.text(key).to_lowercase().contains(needle))
}

fn matches_category(record: &Record, category: &str, fields: &QueryFields) -> bool {
    record.text(&fields.category) == category
}

fn matches_supplier(record: &Record, supplier: &str, fields: &QueryFields) -> bool {
    record.text(&fields.supplier) == supplier
        || record.text(&fields.supplier_alternative) == supplier
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    fn sample() -> Vec<Record> {
        let csv = "\
Item Name,Category,Default Supplier,Supplier Alternative,Order Quantity
Whole Milk,Dairy,Metro,Costco,4
Cheddar,Dairy,Costco,,2
Sourdough,Bakery,Local Bakery,Metro,10
Napkins,,Costco,Amazon,1";
        let options = ParseOptions::new().with_numeric_keys(["order_quantity"]);
        parse(csv, &options).records
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.text("item_name").to_string()).collect()
    }

    #[test]
    fn test_categories_distinct_sorted_non_empty() {
        let records = sample();
        assert_eq!(categories(&records, &QueryFields::default()), vec!["Bakery", "Dairy"]);
    }

    #[test]
    fn test_suppliers_from_both_columns() {
        let records = sample();
        assert_eq!(
            suppliers(&records, &QueryFields::default()),
            vec!["Amazon", "Costco", "Local Bakery", "Metro"]
        );
    }

    #[test]
    fn test_search_case_insensitive() {
        let records = sample();
        let fields = QueryFields::default();

        assert_eq!(names(&search(&records, "MILK", &fields)), vec!["Whole Milk"]);
        assert_eq!(names(&search(&records, "dairy", &fields)), vec!["Whole Milk", "Cheddar"]);
    }

    #[test]
    fn test_search_ignores_alternative_supplier() {
        let records = sample();
        let found = search(&records, "amazon", &QueryFields::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_blank_search_returns_all() {
        let records = sample();
        assert_eq!(search(&records, "   ", &QueryFields::default()).len(), 4);
    }

    #[test]
    fn test_filter_by_category_exact() {
        let records = sample();
        let fields = QueryFields::default();

        assert_eq!(names(&filter_by_category(&records, "Bakery", &fields)), vec!["Sourdough"]);
        assert!(filter_by_category(&records, "bakery", &fields).is_empty());
        assert_eq!(filter_by_category(&records, "", &fields).len(), 4);
    }

    #[test]
    fn test_filter_by_supplier_either_column() {
        let records = sample();
        let found = filter_by_supplier(&records, "Metro", &QueryFields::default());
        assert_eq!(names(&found), vec!["Whole Milk", "Sourdough"]);
    }

    #[test]
    fn test_item_query_combines_criteria() {
        let records = sample();
        let query = ItemQuery {
            search: None,
            category: Some("Dairy".into()),
            supplier: Some("Costco".into()),
        };

        let found = query.apply(&records, &QueryFields::default());
        assert_eq!(names(&found), vec!["Whole Milk", "Cheddar"]);
    }

    #[test]
    fn test_item_query_search_and_blank_filters() {
        let records = sample();
        let query = ItemQuery {
            search: Some("METRO".into()),
            category: Some(String::new()),
            supplier: Some("Costco".into()),
        };

        let found = query.apply(&records, &QueryFields::default());
        assert_eq!(names(&found), vec!["Whole Milk"]);
        assert_eq!(ItemQuery::default().apply(&records, &QueryFields::default()).len(), 4);
    }

    #[test]
    fn test_custom_fields() {
        let csv = "Product,Group\nA,x\nB,y\nC,x";
        let records = parse(csv, &ParseOptions::new()).records;
        let fields = QueryFields {
            name: "product".into(),
            category: "group".into(),
            ..QueryFields::default()
        };

        assert_eq!(categories(&records, &fields), vec!["x", "y"]);
        assert_eq!(search(&records, "b", &fields).len(), 1);
    }
}
