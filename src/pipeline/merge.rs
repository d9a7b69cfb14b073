//! End-to-end profile merging: read, merge, rank filter, write.

use super::PipelineError;
use crate::bio::{resolve_level, LevelRequest, ResolvedLevel};
use crate::config::MergeParams;
use crate::count_table::{merge_profiles, AbundanceTable};
use crate::io::profile::{read_profile, sample_names_for};
use crate::io::{write_abundance_table, TableError};
use log::info;
use std::path::{Path, PathBuf};

/// What one merge run produced.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub inputs: usize,
    /// (rows, samples) before the rank filter.
    pub merged_shape: (usize, usize),
    pub level: ResolvedLevel,
    /// The written table, after the rank filter.
    pub table: AbundanceTable,
    pub top_n: usize,
    pub output: PathBuf,
}

/// Merges abundance profiles into one table and writes it to `output`.
///
/// Every input is checked for existence before any is read.
pub fn run_merge(
    inputs: &[PathBuf],
    names: Option<&[String]>,
    output: &Path,
    params: &MergeParams,
) -> Result<MergeSummary, PipelineError> {
    if let Some(missing) = inputs.iter().find(|path| !path.is_file()) {
        return Err(TableError::MissingInput(missing.clone()).into());
    }
    info!("Merging {} abundance profiles", inputs.len());

    let labels = sample_names_for(inputs, names);
    let profiles = inputs
        .iter()
        .zip(&labels)
        .map(|(path, label)| {
            info!("Reading: {}", path.display());
            read_profile(path, label, params.abundance_column.as_deref())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge_profiles(profiles)?;
    let merged_shape = merged.dimensions();
    info!(
        "Merged table has {} clades x {} samples",
        merged_shape.0, merged_shape.1
    );

    let level = resolve_level(&params.level);
    let table = match level.request {
        LevelRequest::All => merged,
        LevelRequest::Level(rank) => {
            info!("Filtering to {} level", rank.as_str());
            merged.filter_by_level(rank)
        }
    };

    write_abundance_table(&table, output)?;
    info!("Merged table written to {}", output.display());

    Ok(MergeSummary {
        inputs: inputs.len(),
        merged_shape,
        level,
        table,
        top_n: params.top_n,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::TaxonomicLevel;
    use std::fs;
    use tempfile::tempdir;

    fn write_profile(dir: &Path, name: &str, rows: &[(&str, f64)]) -> PathBuf {
        let path = dir.join(name);
        let mut text = String::from("#mpa_v31\nclade_name\trelative_abundance\n");
        for (clade, value) in rows {
            text.push_str(&format!("{}\t{}\n", clade, value));
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_run_merge_species() {
        let dir = tempdir().unwrap();
        let a = write_profile(
            dir.path(),
            "A_profile.txt",
            &[
                ("k__Bacteria", 100.0),
                ("k__Bacteria|g__X|s__X_a", 60.0),
                ("k__Bacteria|g__X|s__X_a|t__SGB1", 60.0),
            ],
        );
        let b = write_profile(dir.path(), "B_profile.txt", &[("k__Bacteria|g__Y|s__Y_b", 20.0)]);
        let out = dir.path().join("merged.tsv");

        let params = MergeParams {
            level: "species".to_string(),
            ..MergeParams::default()
        };
        let summary = run_merge(&[a, b], None, &out, &params).unwrap();

        assert_eq!(summary.inputs, 2);
        assert_eq!(summary.merged_shape, (4, 2));
        assert_eq!(summary.level.request, LevelRequest::Level(TaxonomicLevel::Species));
        assert_eq!(summary.table.sample_names(), ["A", "B"]);
        assert_eq!(summary.table.feature_names(), ["k__Bacteria|g__X|s__X_a", "k__Bacteria|g__Y|s__Y_b"]);

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "clade_name\tA\tB\nk__Bacteria|g__X|s__X_a\t60.0\t0.0\nk__Bacteria|g__Y|s__Y_b\t0.0\t20.0\n"
        );
    }

    #[test]
    fn test_run_merge_unknown_level_falls_back() {
        let dir = tempdir().unwrap();
        let a = write_profile(dir.path(), "A.txt", &[("k__B|s__x", 1.0), ("k__B", 1.0)]);
        let out = dir.path().join("merged.tsv");
        let params = MergeParams {
            level: "superkingdom".to_string(),
            ..MergeParams::default()
        };
        let names = vec!["first".to_string(), "unused".to_string()];

        let summary = run_merge(&[a], Some(names.as_slice()), &out, &params).unwrap();
        assert_eq!(summary.level.unrecognized.as_deref(), Some("superkingdom"));
        assert_eq!(summary.table.feature_names(), ["k__B|s__x"]);
        assert_eq!(summary.table.sample_names(), ["first"]);
    }

    #[test]
    fn test_run_merge_missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let a = write_profile(dir.path(), "A.txt", &[("k__B", 1.0)]);
        let out = dir.path().join("merged.tsv");
        let result = run_merge(
            &[a, dir.path().join("B.txt")],
            None,
            &out,
            &MergeParams::default(),
        );
        assert!(matches!(
            result,
            Err(PipelineError::Table(TableError::MissingInput(_)))
        ));
        assert!(!out.exists());
    }
}
