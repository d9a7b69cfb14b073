//! Abundance profiles and the merged sample-by-clade table.
//!
//! A profile is one upstream run: clade key -> abundance (percent). Merging
//! aligns N profiles into one dense table with one column per sample, where
//! a clade missing from a sample is a real abundance of zero.

use crate::bio::TaxonomicLevel;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("No abundance profiles to merge")]
    NoProfiles,
}

/// A single abundance profile keyed by clade, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceProfile {
    key_column: String,
    sample_name: String,
    rows: IndexMap<String, f64>,
}

impl AbundanceProfile {
    pub fn new(key_column: &str, sample_name: &str, rows: IndexMap<String, f64>) -> Self {
        AbundanceProfile {
            key_column: key_column.to_string(),
            sample_name: sample_name.to_string(),
            rows,
        }
    }

    /// Builds a profile from literal pairs; later duplicates overwrite earlier ones.
    #[cfg(test)]
    pub(crate) fn from_pairs<K: Into<String>>(
        key_column: &str,
        sample_name: &str,
        pairs: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        let rows = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(key_column, sample_name, rows)
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn get(&self, clade: &str) -> Option<f64> {
        self.rows.get(clade).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows accumulated by the pairwise joins; `None` marks a cell not yet filled.
type JoinedRows = IndexMap<String, Vec<Option<f64>>>;

/// Full outer join of the accumulated rows with one more profile.
///
/// The joined rows come back sorted by clade, so a child clade string sits
/// right after its parent.
fn outer_join(mut left: JoinedRows, width: usize, right: AbundanceProfile) -> JoinedRows {
    for cells in left.values_mut() {
        cells.push(None);
    }
    for (clade, value) in right.rows {
        let cells = left.entry(clade).or_insert_with(|| vec![None; width + 1]);
        cells[width] = Some(value);
    }
    left.sort_keys();
    left
}

/// Merges profiles left to right into one table, filling absent cells with 0.0.
///
/// Column order follows the input order. A single profile keeps its file
/// order; any join sorts the rows by clade. The key column name is taken from
/// the first profile.
pub fn merge_profiles(profiles: Vec<AbundanceProfile>) -> Result<AbundanceTable, MergeError> {
    let mut profiles = profiles.into_iter();
    let first = profiles.next().ok_or(MergeError::NoProfiles)?;

    let key_column = first.key_column.clone();
    let mut sample_names = vec![first.sample_name.clone()];
    let mut joined: JoinedRows = first
        .rows
        .into_iter()
        .map(|(clade, value)| (clade, vec![Some(value)]))
        .collect();

    for profile in profiles {
        if profile.key_column != key_column {
            warn!(
                "Profile '{}' keys rows by '{}', merging on '{}' anyway",
                profile.sample_name, profile.key_column, key_column
            );
        }
        let name = profile.sample_name.clone();
        joined = outer_join(joined, sample_names.len(), profile);
        sample_names.push(name);
    }

    let n_samples = sample_names.len();
    let (feature_names, cells): (Vec<String>, Vec<Vec<Option<f64>>>) = joined.into_iter().unzip();
    let abundances = Array2::from_shape_fn((feature_names.len(), n_samples), |(r, c)| {
        cells[r][c].unwrap_or(0.0)
    });
    debug!(
        "Merged {} samples into {} clades",
        n_samples,
        feature_names.len()
    );

    Ok(AbundanceTable::from_parts(
        key_column,
        feature_names,
        sample_names,
        abundances,
    ))
}

/// Represents a merged abundance table.
///
/// Stores abundances (clades x samples) along with the row and column names.
#[derive(Debug, Clone)]
pub struct AbundanceTable {
    /// Header of the row-identity column (e.g. `clade_name`).
    key_column: String,

    /// The core abundance matrix (clades x samples).
    abundances: Array2<f64>,

    /// Mapping from row index to clade name.
    feature_names: Vec<String>,

    /// Mapping from column index to sample name.
    sample_names: Vec<String>,
}

impl AbundanceTable {
    fn from_parts(
        key_column: String,
        feature_names: Vec<String>,
        sample_names: Vec<String>,
        abundances: Array2<f64>,
    ) -> Self {
        AbundanceTable {
            key_column,
            abundances,
            feature_names,
            sample_names,
        }
    }

    /// Returns the dimensions of the table (clades, samples).
    pub fn dimensions(&self) -> (usize, usize) {
        self.abundances.dim()
    }

    pub fn abundance_matrix(&self) -> &Array2<f64> {
        &self.abundances
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Keeps the rows that sit at `level`.
    ///
    /// A row matches when one of its `|`-separated segments carries the level
    /// marker. Unless `level` is the strain level, rows that also carry a
    /// strain segment are dropped so a parent is not counted with its strains.
    pub fn filter_by_level(&self, level: TaxonomicLevel) -> AbundanceTable {
        let keep: Vec<usize> = self
            .feature_names
            .iter()
            .enumerate()
            .filter(|(_, clade)| level.matches(clade))
            .map(|(i, _)| i)
            .collect();

        let feature_names = keep.iter().map(|&i| self.feature_names[i].clone()).collect();
        AbundanceTable::from_parts(
            self.key_column.clone(),
            feature_names,
            self.sample_names.clone(),
            self.abundances.select(Axis(0), &keep),
        )
    }

    /// Arithmetic mean of each row across all sample columns.
    pub fn mean_abundance(&self) -> Array1<f64> {
        self.abundances
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.feature_names.len()))
    }

    /// The `n` clades with the highest mean abundance, ties kept in row order.
    pub fn top_by_mean(&self, n: usize) -> Vec<(&str, f64)> {
        let means = self.mean_abundance();
        (0..self.feature_names.len())
            .sorted_by(|&a, &b| means[b].total_cmp(&means[a]))
            .take(n)
            .map(|i| (self.feature_names[i].as_str(), means[i]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    const KEY: &str = "clade_name";

    fn profile(name: &str, pairs: &[(&str, f64)]) -> AbundanceProfile {
        AbundanceProfile::from_pairs(KEY, name, pairs.iter().map(|&(k, v)| (k, v)))
    }

    fn row_keys(table: &AbundanceTable) -> BTreeSet<String> {
        table.feature_names().iter().cloned().collect()
    }

    fn row(table: &AbundanceTable, clade: &str) -> Vec<f64> {
        let idx = table.feature_names().iter().position(|c| c == clade).unwrap();
        table.abundance_matrix().row(idx).to_vec()
    }

    fn cell(table: &AbundanceTable, clade: &str, sample: &str) -> f64 {
        let col = table.sample_names().iter().position(|s| s == sample).unwrap();
        row(table, clade)[col]
    }

    #[test]
    fn test_merge_two_disjoint_profiles() {
        let a = profile("A", &[("s__x", 10.0)]);
        let b = profile("B", &[("s__y", 5.0)]);
        let table = merge_profiles(vec![a, b]).unwrap();

        assert_eq!(table.dimensions(), (2, 2));
        assert_eq!(table.sample_names(), ["A", "B"]);
        assert_eq!(row(&table, "s__x"), vec![10.0, 0.0]);
        assert_eq!(row(&table, "s__y"), vec![0.0, 5.0]);
    }

    #[test]
    fn test_merged_rows_sorted_by_clade() {
        let a = profile("A", &[("k__B", 1.0), ("k__B|p__Z", 2.0)]);
        let b = profile("B", &[("k__A", 3.0), ("k__B|p__Y", 4.0)]);
        let table = merge_profiles(vec![a, b]).unwrap();
        assert_eq!(
            table.feature_names(),
            ["k__A", "k__B", "k__B|p__Y", "k__B|p__Z"]
        );
        assert_eq!(table.abundance_matrix().column(1).to_vec(), vec![3.0, 0.0, 4.0, 0.0]);
    }

    #[test]
    fn test_single_profile_keeps_file_order() {
        let a = profile("A", &[("k__B", 1.0), ("k__A", 2.0)]);
        let table = merge_profiles(vec![a]).unwrap();
        assert_eq!(table.feature_names(), ["k__B", "k__A"]);
    }

    #[test]
    fn test_merge_completeness_and_order_insensitivity() {
        let a = profile("A", &[("s__x", 10.0), ("s__z", 1.5)]);
        let b = profile("B", &[("s__y", 5.0), ("s__x", 2.0)]);
        let c = profile("C", &[("s__w", 0.25)]);

        let forward = merge_profiles(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let backward = merge_profiles(vec![c, b, a]).unwrap();

        let expected: BTreeSet<String> = ["s__x", "s__y", "s__z", "s__w"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(row_keys(&forward), expected);
        assert_eq!(row_keys(&backward), expected);
        assert_eq!(backward.sample_names(), ["C", "B", "A"]);

        for clade in &expected {
            for sample in ["A", "B", "C"] {
                assert_eq!(cell(&forward, clade, sample), cell(&backward, clade, sample));
            }
        }

        // Every cell is either a source value or the 0.0 fill.
        assert!(forward.abundance_matrix().iter().all(|v| v.is_finite()));
        assert_eq!(forward.feature_names(), backward.feature_names());
        assert_eq!(row(&forward, "s__w"), vec![0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_merge_requires_input() {
        assert!(matches!(merge_profiles(vec![]), Err(MergeError::NoProfiles)));
    }

    #[test]
    fn test_filter_by_level_excludes_strains() {
        let a = profile(
            "A",
            &[
                ("k__Bacteria", 100.0),
                ("k__Bacteria|p__Firmicutes|g__Lacto", 40.0),
                ("k__Bacteria|p__Firmicutes|g__Lacto|s__Lacto_gasseri", 30.0),
                ("k__Bacteria|p__Firmicutes|g__Lacto|s__Lacto_gasseri|t__SGB7", 30.0),
            ],
        );
        let table = merge_profiles(vec![a]).unwrap();

        let species = table.filter_by_level(TaxonomicLevel::Species);
        assert_eq!(
            species.feature_names(),
            ["k__Bacteria|p__Firmicutes|g__Lacto|s__Lacto_gasseri"]
        );

        let strains = table.filter_by_level(TaxonomicLevel::Strain);
        assert_eq!(strains.dimensions(), (1, 1));

        let kingdom = table.filter_by_level(TaxonomicLevel::Kingdom);
        assert_eq!(kingdom.dimensions(), (3, 1));
        assert!(kingdom.feature_names().iter().all(|c| !c.contains("|t__")));
    }

    #[test]
    fn test_mean_and_top() {
        let a = profile("A", &[("s__x", 10.0), ("s__y", 4.0), ("s__z", 1.0)]);
        let b = profile("B", &[("s__y", 6.0), ("s__z", 9.0)]);
        let table = merge_profiles(vec![a, b]).unwrap();

        let means = table.mean_abundance();
        assert_relative_eq!(means[0], 5.0);
        assert_relative_eq!(means[1], 5.0);
        assert_relative_eq!(means[2], 5.0);

        let top = table.top_by_mean(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "s__x"); // ties keep row order
        assert_eq!(top[1].0, "s__y");

        let c = profile("C", &[("s__q", 90.0)]);
        let table = merge_profiles(vec![profile("A", &[("s__x", 10.0)]), c]).unwrap();
        assert_eq!(table.top_by_mean(1)[0], ("s__q", 45.0));
    }
}
