//! Visit statistics for the admin report

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::VisitRecord;

/// Totals over the whole visit log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
    pub total: usize,
    /// Visits per stored country value, sentinels included
    pub by_country: BTreeMap<String, u64>,
}

impl VisitSummary {
    /// Countries ordered by visit count, largest first, then by name
    pub fn countries_by_count(&self) -> Vec<(&str, u64)> {
        let mut countries: Vec<(&str, u64)> = self
            .by_country
            .iter()
            .map(|(country, count)| (country.as_str(), *count))
            .collect();
        countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        countries
    }
}

/// Count all records and group them by country
pub fn summarize(records: &[VisitRecord]) -> VisitSummary {
    let mut by_country = BTreeMap::new();
    for record in records {
        *by_country.entry(record.country.clone()).or_insert(0) += 1;
    }

    VisitSummary {
        total: records.len(),
        by_country,
    }
}
