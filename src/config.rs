//! Run parameters for each tool.
//!
//! Every parameter set has defaults. Hit and bin thresholds can also come
//! from a JSON file; command-line flags are applied on top by the CLI layer.

use crate::annotation::scheme::{AnnotationScheme, DEFAULT_MAX_EVALUE};
use crate::io::{open_input, TableError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Quality thresholds for sequence-search hits. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitFilterParams {
    pub min_identity: f64,
    pub max_evalue: f64,
}

impl Default for HitFilterParams {
    fn default() -> Self {
        HitFilterParams {
            min_identity: 40.0,
            max_evalue: DEFAULT_MAX_EVALUE,
        }
    }
}

impl HitFilterParams {
    /// Defaults tuned for a given annotation database.
    pub fn for_scheme(scheme: &AnnotationScheme) -> Self {
        HitFilterParams {
            min_identity: scheme.default_identity,
            max_evalue: DEFAULT_MAX_EVALUE,
        }
    }
}

/// Hit thresholds read from a parameter file; absent keys stay `None`.
///
/// Kept separate from [`HitFilterParams`] so a missing key falls back to the
/// scheme's default rather than the generic one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HitFilterOverrides {
    pub min_identity: Option<f64>,
    pub max_evalue: Option<f64>,
}

impl HitFilterOverrides {
    /// Applies the keys that are set on top of `base`.
    pub fn apply(&self, base: HitFilterParams) -> HitFilterParams {
        HitFilterParams {
            min_identity: self.min_identity.unwrap_or(base.min_identity),
            max_evalue: self.max_evalue.unwrap_or(base.max_evalue),
        }
    }
}

/// CheckM thresholds for keeping a bin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BinFilterParams {
    pub min_completeness: f64,
    pub max_contamination: f64,
    /// Minimum genome size in bp; no length filter when unset.
    pub min_length: Option<u64>,
}

impl Default for BinFilterParams {
    fn default() -> Self {
        BinFilterParams {
            min_completeness: 50.0,
            max_contamination: 10.0,
            min_length: None,
        }
    }
}

/// Options for merging abundance profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeParams {
    /// Rank to keep (`all` keeps every row).
    pub level: String,
    /// Header of the abundance column; the second column when unset.
    pub abundance_column: Option<String>,
    /// Rows shown in the printed top list.
    pub top_n: usize,
}

impl Default for MergeParams {
    fn default() -> Self {
        MergeParams {
            level: "all".to_string(),
            abundance_column: None,
            top_n: 10,
        }
    }
}

/// Loads a parameter set from a JSON file; absent keys keep their defaults.
pub fn load_params<T: DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    let reader = open_input(path)?;
    Ok(serde_json::from_reader(reader)?)
}
