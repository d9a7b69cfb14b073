//! Threshold filtering and frequency aggregation over search hits.

use super::frequency::FrequencyTable;
use super::patterns::category_of;
use super::scheme::AnnotationScheme;
use crate::config::HitFilterParams;
use crate::io::hits::HitRecord;

/// A retained hit with one extraction per identifier family.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedHit {
    pub record: HitRecord,
    /// Parallel to the scheme's families; `None` means unclassified.
    pub identifiers: Vec<Option<String>>,
    /// Class of the tier family's identifier, when the scheme has a tier.
    pub category: Option<String>,
}

/// Structured result of one summarizer run.
#[derive(Debug, Clone)]
pub struct HitSummary {
    pub scheme: &'static str,
    pub params: HitFilterParams,
    /// Hits read before filtering.
    pub total_hits: usize,
    /// Retained hits in input order.
    pub hits: Vec<AnnotatedHit>,
    /// Parallel to the scheme's families.
    pub family_counts: Vec<FrequencyTable>,
    pub category_counts: Option<FrequencyTable>,
}

impl HitSummary {
    /// Retained hits with at least one identifier.
    pub fn classified_hits(&self) -> usize {
        self.hits
            .iter()
            .filter(|hit| hit.identifiers.iter().any(Option::is_some))
            .count()
    }
}

/// Keep iff identity >= min and e-value <= max; missing values fail.
pub fn passes_filter(record: &HitRecord, params: &HitFilterParams) -> bool {
    match (record.percent_identity, record.evalue) {
        (Some(identity), Some(evalue)) => {
            identity >= params.min_identity && evalue <= params.max_evalue
        }
        _ => false,
    }
}

/// Filters hits, extracts identifiers and counts them.
///
/// Family counts and category counts are built by separate passes over the
/// retained hits.
pub fn summarize(
    records: Vec<HitRecord>,
    scheme: &AnnotationScheme,
    params: &HitFilterParams,
) -> HitSummary {
    let total_hits = records.len();
    let tier = scheme.category();

    let hits: Vec<AnnotatedHit> = records
        .into_iter()
        .filter(|record| passes_filter(record, params))
        .map(|record| {
            let identifiers: Vec<Option<String>> = scheme
                .families()
                .iter()
                .map(|family| family.extract(family.source.of(&record)))
                .collect();
            let category = tier
                .and_then(|t| identifiers.get(t.family))
                .and_then(|id| id.as_deref())
                .and_then(category_of)
                .map(str::to_string);
            AnnotatedHit {
                record,
                identifiers,
                category,
            }
        })
        .collect();

    let family_counts: Vec<FrequencyTable> = (0..scheme.families().len())
        .map(|i| {
            hits.iter()
                .filter_map(|hit| hit.identifiers[i].as_deref())
                .collect::<FrequencyTable>()
        })
        .collect();

    let category_counts: Option<FrequencyTable> = tier.map(|_| {
        hits.iter()
            .filter_map(|hit| hit.category.as_deref())
            .collect()
    });

    HitSummary {
        scheme: scheme.name,
        params: *params,
        total_hits,
        hits,
        family_counts,
        category_counts,
    }
}
