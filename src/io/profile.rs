//! Reading taxonomic abundance profiles (MetaPhlAn-style tables).

use super::{read_uncommented, TableError, COMMENT_MARKER, DELIMITER};
use crate::count_table::AbundanceProfile;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, warn};
use std::path::Path;

/// Suffix removed from file stems when deriving default sample names.
pub const PROFILE_SUFFIX: &str = "_profile";

/// Derives the sample label for a profile file: its stem with every
/// occurrence of [`PROFILE_SUFFIX`] removed.
pub fn default_sample_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .replace(PROFILE_SUFFIX, "")
}

/// Pairs input files with sample names positionally.
///
/// Names beyond the number of inputs are ignored and inputs without a name
/// fall back to [`default_sample_name`]. Either mismatch is logged, since the
/// pairing then no longer covers every column as the caller may expect.
pub fn sample_names_for(inputs: &[impl AsRef<Path>], names: Option<&[String]>) -> Vec<String> {
    let names = names.unwrap_or(&[]);
    if !names.is_empty() && names.len() != inputs.len() {
        warn!(
            "{} sample names given for {} profiles; names are paired by position and the rest fall back to file names",
            names.len(),
            inputs.len()
        );
    }
    inputs
        .iter()
        .enumerate()
        .map(|(i, path)| {
            names
                .get(i)
                .cloned()
                .unwrap_or_else(|| default_sample_name(path.as_ref()))
        })
        .collect()
}

/// Reads one abundance profile.
///
/// Comment lines are stripped first; the first remaining line is the header.
/// Column 0 holds the clade key. The abundance is read from `abundance_column`
/// when given, otherwise from column 1.
pub fn read_profile(
    path: &Path,
    sample_name: &str,
    abundance_column: Option<&str>,
) -> Result<AbundanceProfile, TableError> {
    let text = read_uncommented(path, COMMENT_MARKER)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(TableError::EmptyInput(path.to_path_buf()));
    }
    let value_idx = match abundance_column {
        Some(name) => headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| TableError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })?,
        None => 1,
    };
    if value_idx == 0 || value_idx >= headers.len() {
        return Err(TableError::ColumnCount {
            path: path.to_path_buf(),
            line: 1,
            expected: 2,
            found: headers.len(),
        });
    }

    let mut rows: IndexMap<String, f64> = IndexMap::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() <= value_idx {
            return Err(TableError::ColumnCount {
                path: path.to_path_buf(),
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }
        let raw = record[value_idx].trim();
        let value: f64 = raw.parse().map_err(|_| TableError::InvalidField {
            path: path.to_path_buf(),
            line,
            column: headers[value_idx].to_string(),
            value: raw.to_string(),
        })?;
        match rows.entry(record[0].to_string()) {
            Entry::Occupied(entry) => {
                return Err(TableError::DuplicateKey {
                    path: path.to_path_buf(),
                    line,
                    key: entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    debug!(
        "Read {} clades for sample '{}' from {}",
        rows.len(),
        sample_name,
        path.display()
    );
    Ok(AbundanceProfile::new(&headers[0], sample_name, rows))
}
