pub mod annotate;
pub mod merge;
pub mod qc;
pub mod report;

use crate::count_table::MergeError;
use crate::io::TableError;
use thiserror::Error;

pub use annotate::{run_annotation, AnnotationRun};
pub use merge::{run_merge, MergeSummary};
pub use qc::{run_bin_filter, BinFilterSummary};
pub use report::{annotation_report, bin_filter_report, bin_statistics, merge_report};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}
