//! Genome bin quality control on CheckM output.

use crate::config::BinFilterParams;
use crate::io::{open_input, write_tsv, TableError, DELIMITER};
use log::{debug, info};
use serde::Deserialize;
use statrs::statistics::Statistics;
use std::path::Path;

/// The CheckM columns this tool reads; other columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinQuality {
    #[serde(rename = "Bin Id")]
    pub bin_id: String,
    #[serde(rename = "Completeness")]
    pub completeness: f64,
    #[serde(rename = "Contamination")]
    pub contamination: f64,
    #[serde(rename = "Strain heterogeneity")]
    pub strain_heterogeneity: f64,
    #[serde(rename = "Genome size (bp)", default)]
    pub genome_size: Option<u64>,
}

/// Result of filtering one CheckM table.
#[derive(Debug, Clone)]
pub struct BinFilterSummary {
    pub params: BinFilterParams,
    pub total_bins: usize,
    /// Bins that passed, in input order.
    pub kept: Vec<BinQuality>,
}

impl BinFilterSummary {
    pub fn mean_completeness(&self) -> f64 {
        self.kept.iter().map(|b| b.completeness).mean()
    }

    pub fn mean_contamination(&self) -> f64 {
        self.kept.iter().map(|b| b.contamination).mean()
    }

    pub fn mean_strain_heterogeneity(&self) -> f64 {
        self.kept.iter().map(|b| b.strain_heterogeneity).mean()
    }
}

/// Reads a tab-separated CheckM quality table with header.
pub fn read_checkm_table(path: &Path) -> Result<Vec<BinQuality>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(open_input(path)?);

    let bins = reader
        .deserialize()
        .collect::<Result<Vec<BinQuality>, csv::Error>>()?;
    debug!("Read {} bins from {}", bins.len(), path.display());
    Ok(bins)
}

/// Completeness and contamination bounds are inclusive; with a length
/// threshold, bins without a genome size are rejected.
pub fn passes_quality(bin: &BinQuality, params: &BinFilterParams) -> bool {
    let length_ok = match params.min_length {
        Some(min) => bin.genome_size.map_or(false, |size| size >= min),
        None => true,
    };
    bin.completeness >= params.min_completeness
        && bin.contamination <= params.max_contamination
        && length_ok
}

pub fn filter_bins(bins: Vec<BinQuality>, params: &BinFilterParams) -> BinFilterSummary {
    let total_bins = bins.len();
    let kept = bins
        .into_iter()
        .filter(|bin| passes_quality(bin, params))
        .collect();
    BinFilterSummary {
        params: *params,
        total_bins,
        kept,
    }
}

/// Writes the retained bins with two-decimal metrics.
pub fn write_filtered_bins(summary: &BinFilterSummary, output_path: &Path) -> Result<(), TableError> {
    let header = [
        "Bin_Id",
        "Completeness",
        "Contamination",
        "Strain_heterogeneity",
    ]
    .map(String::from);
    let rows = summary.kept.iter().map(|bin| {
        vec![
            bin.bin_id.clone(),
            format!("{:.2}", bin.completeness),
            format!("{:.2}", bin.contamination),
            format!("{:.2}", bin.strain_heterogeneity),
        ]
    });
    write_tsv(output_path, &header, rows)
}

/// Reads, filters and writes one CheckM table.
pub fn run_bin_filter(
    input: &Path,
    output: &Path,
    params: &BinFilterParams,
) -> Result<BinFilterSummary, TableError> {
    info!("Reading CheckM results from {}", input.display());
    let bins = read_checkm_table(input)?;
    let summary = filter_bins(bins, params);
    info!(
        "{} of {} bins pass quality thresholds",
        summary.kept.len(),
        summary.total_bins
    );
    write_filtered_bins(&summary, output)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::tempdir;

    const CHECKM: &str = "\
Bin Id\tMarker lineage\tCompleteness\tContamination\tStrain heterogeneity\tGenome size (bp)
bin.1\tk__Bacteria (UID203)\t98.5\t1.2\t0.0\t2500000
bin.2\tk__Bacteria (UID203)\t50.0\t10.0\t25.0\t900000
bin.3\tk__Archaea (UID2)\t49.99\t0.5\t0.0\t1800000
bin.4\tk__Bacteria (UID203)\t75.0\t10.01\t50.0\t3100000
";

    fn bin(id: &str, completeness: f64, contamination: f64, size: Option<u64>) -> BinQuality {
        BinQuality {
            bin_id: id.to_string(),
            completeness,
            contamination,
            strain_heterogeneity: 0.0,
            genome_size: size,
        }
    }

    #[test]
    fn test_read_checkm_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checkm.tsv");
        fs::write(&path, CHECKM).unwrap();

        let bins = read_checkm_table(&path).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].bin_id, "bin.1");
        assert_eq!(bins[1].genome_size, Some(900_000));
    }

    #[test]
    fn test_filter_boundaries_inclusive() {
        let params = BinFilterParams::default();
        assert!(passes_quality(&bin("a", 50.0, 10.0, None), &params));
        assert!(!passes_quality(&bin("b", 49.99, 0.0, None), &params));
        assert!(!passes_quality(&bin("c", 90.0, 10.01, None), &params));

        let with_length = BinFilterParams {
            min_length: Some(1_000_000),
            ..params
        };
        assert!(passes_quality(&bin("d", 90.0, 1.0, Some(1_000_000)), &with_length));
        assert!(!passes_quality(&bin("e", 90.0, 1.0, Some(999_999)), &with_length));
        assert!(!passes_quality(&bin("f", 90.0, 1.0, None), &with_length));
    }

    #[test]
    fn test_filter_and_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checkm.tsv");
        fs::write(&path, CHECKM).unwrap();

        let summary = filter_bins(read_checkm_table(&path).unwrap(), &BinFilterParams::default());
        assert_eq!(summary.total_bins, 4);
        let kept: Vec<_> = summary.kept.iter().map(|b| b.bin_id.as_str()).collect();
        assert_eq!(kept, ["bin.1", "bin.2"]);
        assert_relative_eq!(summary.mean_completeness(), 74.25);

        let out = dir.path().join("hq_bins.tsv");
        write_filtered_bins(&summary, &out).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "Bin_Id\tCompleteness\tContamination\tStrain_heterogeneity\n\
bin.1\t98.50\t1.20\t0.00\n\
bin.2\t50.00\t10.00\t25.00\n"
        );
    }

    #[test]
    fn test_run_bin_filter_missing_input() {
        let dir = tempdir().unwrap();
        let result = run_bin_filter(
            &dir.path().join("absent.tsv"),
            &dir.path().join("out.tsv"),
            &BinFilterParams::default(),
        );
        assert!(matches!(result, Err(TableError::MissingInput(_))));
        assert!(!dir.path().join("out.tsv").exists());
    }
}
