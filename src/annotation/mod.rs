//! Annotation aggregation for sequence-search hits.
//!
//! One engine serves every annotation database: an [`AnnotationScheme`]
//! registers the identifier families to extract and, optionally, a coarser
//! category tier with human-readable class descriptions.

pub mod frequency;
pub mod patterns;
pub mod scheme;
pub mod summarize;

pub use frequency::FrequencyTable;
pub use patterns::{category_of, IdentifierPattern, SourceField};
pub use scheme::{AnnotationScheme, CategoryTier, IdentifierFamily};
pub use summarize::{passes_filter, summarize, AnnotatedHit, HitSummary};
