//! Filtering, aggregation and merging of metagenomic annotation tables.
//!
//! The crate turns sequence-search hit tables (CAZy, KEGG), MetaPhlAn
//! abundance profiles and CheckM bin quality tables into summaries:
//! thresholded hit tables with identifier frequency counts, wide
//! sample-by-clade abundance tables, and filtered bin lists.

pub mod annotation;
pub mod bio;
pub mod cli;
pub mod config;
pub mod count_table;
pub mod io;
pub mod pipeline;
pub mod samplesheet;
