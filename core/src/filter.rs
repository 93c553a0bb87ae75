use crate::models::FoodRecord;

/// Narrows a list of records by a free-text query.
///
/// Implementations must not reorder the records they keep, and applying the
/// same query twice must give the same result as applying it once.
pub trait TextFilter: Send + Sync {
    fn filter(&self, query: &str, records: &[FoodRecord]) -> Vec<FoodRecord>;
}

/// Case-insensitive substring match on name and brand. Every whitespace
/// separated term has to match somewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringFilter;

impl SubstringFilter {
    fn matches(terms: &[String], record: &FoodRecord) -> bool {
        let name = record.name.to_lowercase();
        let brand = record.brand.as_deref().unwrap_or_default().to_lowercase();
        terms
            .iter()
            .all(|t| name.contains(t.as_str()) || brand.contains(t.as_str()))
    }
}

impl TextFilter for SubstringFilter {
    fn filter(&self, query: &str, records: &[FoodRecord]) -> Vec<FoodRecord> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|r| Self::matches(&terms, r))
            .cloned()
            .collect()
    }
}
