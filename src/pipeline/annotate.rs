//! End-to-end hit annotation: read, summarize, write.

use crate::annotation::{summarize, AnnotationScheme, HitSummary};
use crate::config::HitFilterParams;
use crate::io::hits::{read_hit_table, write_detailed_annotations, write_frequency_summaries};
use crate::io::TableError;
use log::info;
use std::path::{Path, PathBuf};

/// What one annotation run produced.
#[derive(Debug, Clone)]
pub struct AnnotationRun {
    pub summary: HitSummary,
    /// The detailed table, then the frequency summaries in family order.
    pub outputs: Vec<PathBuf>,
}

pub fn detailed_output_path(output_prefix: &str) -> PathBuf {
    PathBuf::from(format!("{}_detailed_annotations.txt", output_prefix))
}

/// Annotates a hit table with `scheme` and writes every summary under `output_prefix`.
pub fn run_annotation(
    input: &Path,
    output_prefix: &str,
    scheme: &AnnotationScheme,
    params: &HitFilterParams,
) -> Result<AnnotationRun, TableError> {
    info!("Parsing {} hits from {}", scheme.name, input.display());
    let records = read_hit_table(input)?;

    let summary = summarize(records, scheme, params);
    info!(
        "{} of {} hits pass identity >= {}% and evalue <= {:e}",
        summary.hits.len(),
        summary.total_hits,
        params.min_identity,
        params.max_evalue
    );

    let detailed = detailed_output_path(output_prefix);
    write_detailed_annotations(&summary, scheme, &detailed)?;
    info!("Detailed annotations written to {}", detailed.display());
    let mut outputs = vec![detailed];
    outputs.extend(write_frequency_summaries(&summary, scheme, output_prefix)?);

    Ok(AnnotationRun { summary, outputs })
}
