//! Product records and per-cycle inventory snapshots

use std::collections::HashSet;
use std::fmt;

/// Size assumed when the listing does not state one
pub const DEFAULT_SIZE: &str = "750ML";

/// One whiskey listing as observed on the page.
///
/// Identity for diffing is the `name`; every other field is payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    pub price: Option<String>,
    pub size: String,
    pub stock_count: Option<u32>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            size: DEFAULT_SIZE.to_string(),
            stock_count: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_stock(mut self, count: u32) -> Self {
        self.stock_count = Some(count);
        self
    }

    /// Availability phrase: "12 In Stock" when a count is known, otherwise "In Stock"
    pub fn availability(&self) -> String {
        match self.stock_count {
            Some(count) => format!("{count} In Stock"),
            None => "In Stock".to_string(),
        }
    }

    /// Full pipe-separated listing string, used as the sort key for extractor output
    pub fn listing_key(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.price.as_deref().unwrap_or(""),
            self.size,
            self.availability()
        )
    }
}

impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.listing_key())
    }
}

/// Ordered set of records observed in one scan cycle, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<ProductRecord>,
}

impl Snapshot {
    /// Build a snapshot preserving input order; a later duplicate name is discarded
    pub fn from_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|record| seen.insert(record.name.clone()))
            .collect();
        Self { records }
    }

    pub fn get(&self, name: &str) -> Option<&ProductRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_wins_on_duplicate_name() {
        let snapshot = Snapshot::from_records(vec![
            ProductRecord::new("Blanton's Bourbon").with_price("$64.99"),
            ProductRecord::new("Weller Bourbon").with_price("$29.99"),
            ProductRecord::new("Blanton's Bourbon").with_price("$99.99"),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get("Blanton's Bourbon").unwrap().price.as_deref(),
            Some("$64.99")
        );
        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(names, vec!["Blanton's Bourbon", "Weller Bourbon"]);
    }

    #[test]
    fn availability_reflects_stock_count() {
        let counted = ProductRecord::new("Stagg Bourbon").with_stock(12);
        let uncounted = ProductRecord::new("Stagg Bourbon");

        assert_eq!(counted.availability(), "12 In Stock");
        assert_eq!(uncounted.availability(), "In Stock");
    }

    #[test]
    fn listing_key_joins_all_fields() {
        let record = ProductRecord::new("Eagle Rare Bourbon")
            .with_price("$39.99")
            .with_size("1.75L")
            .with_stock(3);

        assert_eq!(
            record.listing_key(),
            "Eagle Rare Bourbon | $39.99 | 1.75L | 3 In Stock"
        );
    }
}
