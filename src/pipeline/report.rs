//! Human-readable run summaries.
//!
//! The pipeline functions return structured results; these renderers turn
//! them into the text the CLI prints or writes.

use super::annotate::AnnotationRun;
use super::merge::MergeSummary;
use super::qc::BinFilterSummary;
use crate::annotation::AnnotationScheme;
use crate::bio::{taxonomy::DEFAULT_LEVEL, LevelRequest};

/// Number of identifiers listed in the annotation summary.
pub const TOP_IDENTIFIERS: usize = 10;

pub fn annotation_report(run: &AnnotationRun, scheme: &AnnotationScheme) -> String {
    let summary = &run.summary;
    let mut report = String::new();

    report.push_str(&format!("Total hits: {}\n", summary.total_hits));
    report.push_str(&format!(
        "Filtered hits (identity>={}%, evalue<={:e}): {}\n",
        summary.params.min_identity,
        summary.params.max_evalue,
        summary.hits.len()
    ));
    for path in &run.outputs {
        report.push_str(&format!("Written: {}\n", path.display()));
    }

    report.push_str("\nStatistics:\n");
    for (family, counts) in scheme.families().iter().zip(&summary.family_counts) {
        report.push_str(&format!("  Unique {}: {}\n", family.plural, counts.len()));
    }
    if let (Some(tier), Some(counts)) = (scheme.category(), &summary.category_counts) {
        report.push_str(&format!("  Unique {}: {}\n", tier.plural, counts.len()));
    }
    report.push_str(&format!("  Annotated genes: {}\n", summary.hits.len()));
    report.push_str(&format!(
        "  Classified genes: {}\n",
        summary.classified_hits()
    ));

    if let (Some(family), Some(counts)) = (scheme.families().first(), summary.family_counts.first()) {
        if !counts.is_empty() {
            report.push_str(&format!("\nTop {} {}:\n", TOP_IDENTIFIERS, family.plural));
            for (id, count) in counts.most_common().into_iter().take(TOP_IDENTIFIERS) {
                report.push_str(&format!("  {}: {}\n", id, count));
            }
        }
    }

    report
}

pub fn merge_report(summary: &MergeSummary) -> String {
    let mut report = String::new();
    let (rows, samples) = summary.merged_shape;

    report.push_str(&format!("Merged {} profiles\n", summary.inputs));
    report.push_str(&format!(
        "Merged table shape: ({}, {})\n",
        rows,
        samples + 1
    ));
    if let Some(name) = &summary.level.unrecognized {
        report.push_str(&format!(
            "Warning: Unknown level '{}', using '{}'\n",
            name,
            DEFAULT_LEVEL.as_str()
        ));
    }
    if let LevelRequest::Level(level) = summary.level.request {
        let (rows, samples) = summary.table.dimensions();
        report.push_str(&format!("Filtering to {} level...\n", level.as_str()));
        report.push_str(&format!(
            "Filtered table shape: ({}, {})\n",
            rows,
            samples + 1
        ));
    }
    report.push_str(&format!(
        "Merged table written to: {}\n",
        summary.output.display()
    ));

    let (taxa, samples) = summary.table.dimensions();
    report.push_str("\nSummary:\n");
    report.push_str(&format!("  Total taxa: {}\n", taxa));
    report.push_str(&format!("  Total samples: {}\n", samples));

    report.push_str(&format!(
        "\nTop {} most abundant taxa (average across samples):\n",
        summary.top_n
    ));
    for (clade, mean) in summary.table.top_by_mean(summary.top_n) {
        report.push_str(&format!("  {}: {:.2}%\n", clade, mean));
    }

    report
}

pub fn bin_filter_report(summary: &BinFilterSummary) -> String {
    let mut report = String::new();
    report.push_str(&format!("Total bins: {}\n", summary.total_bins));
    report.push_str(&format!("High-quality bins: {}\n", summary.kept.len()));
    report.push_str(&format!(
        "  Completeness >= {}%\n",
        summary.params.min_completeness
    ));
    report.push_str(&format!(
        "  Contamination <= {}%\n",
        summary.params.max_contamination
    ));
    report
}

/// Contents of the optional statistics file for a bin filter run.
pub fn bin_statistics(summary: &BinFilterSummary) -> String {
    let params = &summary.params;
    let mut report = String::new();

    report.push_str(&format!("Total bins: {}\n", summary.total_bins));
    report.push_str(&format!("High-quality bins: {}\n", summary.kept.len()));
    report.push_str("Filter criteria:\n");
    report.push_str(&format!("  Completeness >= {}%\n", params.min_completeness));
    report.push_str(&format!("  Contamination <= {}%\n", params.max_contamination));
    if let Some(min_length) = params.min_length {
        report.push_str(&format!("  Length >= {} bp\n", min_length));
    }

    report.push_str("\nQuality metrics (filtered bins):\n");
    report.push_str(&format!(
        "  Mean completeness: {:.2}%\n",
        summary.mean_completeness()
    ));
    report.push_str(&format!(
        "  Mean contamination: {:.2}%\n",
        summary.mean_contamination()
    ));
    report.push_str(&format!(
        "  Mean strain heterogeneity: {:.2}%\n",
        summary.mean_strain_heterogeneity()
    ));

    report
}
