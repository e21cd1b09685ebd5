//! Category filtering and free-text search over a merged feed.

use crate::domain::{ActivityRecord, Category};

/// Records passing both the category and the search predicate, in input order.
pub fn visible<'a>(
    records: &'a [ActivityRecord],
    category: Category,
    query: &str,
) -> Vec<&'a ActivityRecord> {
    Filter::new(category, query).apply(records)
}

/// A category selector and a query, with the query lowercased once up front.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    category: Category,
    needle: String,
}

impl Filter {
    pub fn new(category: Category, query: &str) -> Self {
        Self {
            category,
            needle: query.to_lowercase(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.category.includes(record.source_type) && self.matches_text(record)
    }

    pub fn apply<'a>(&self, records: &'a [ActivityRecord]) -> Vec<&'a ActivityRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    // Absent fields never match a non-empty query.
    fn matches_text(&self, record: &ActivityRecord) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        };
        contains(&record.name) || contains(&record.details)
    }
}
