//! Input/Output operations module.
//!
//! Handles opening input tables (plain or gzip-compressed), stripping
//! comment lines, and writing tab-separated result tables.

pub mod hits; // Pairwise search hit tables
pub mod profile; // Taxonomic abundance profiles

use crate::count_table::AbundanceTable;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lines starting with this marker are dropped from profile inputs.
pub const COMMENT_MARKER: char = '#';

/// Field separator shared by every table this crate reads and writes.
pub const DELIMITER: u8 = b'\t';

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{}: line {line}: expected {expected} columns, found {found}", path.display())]
    ColumnCount {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{}: line {line}: invalid value '{value}' in column '{column}'", path.display())]
    InvalidField {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: line {line}: duplicate row key '{key}'", path.display())]
    DuplicateKey {
        path: PathBuf,
        line: u64,
        key: String,
    },

    #[error("{}: no header row", .0.display())]
    EmptyInput(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid identifier pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Parameter file error: {0}")]
    Params(#[from] serde_json::Error),
}

/// Opens an input table, decompressing it when the name ends in `.gz`.
///
/// A path that does not exist is reported as [`TableError::MissingInput`]
/// before any read is attempted.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>, TableError> {
    if !path.is_file() {
        return Err(TableError::MissingInput(path.to_path_buf()));
    }
    let file = BufReader::new(File::open(path)?);
    let is_gzip = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
    if is_gzip {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads a whole input and drops every line that begins with `marker`.
///
/// This is purely textual: the remaining lines are handed to the CSV
/// parser untouched, so a header hidden behind the marker is lost too.
pub fn read_uncommented(path: &Path, marker: char) -> Result<String, TableError> {
    let mut raw = String::new();
    open_input(path)?.read_to_string(&mut raw)?;
    let kept: String = raw
        .split_inclusive('\n')
        .filter(|line| !line.starts_with(marker))
        .collect();
    Ok(kept)
}

/// Formats a float the way downstream tables expect: scientific notation for
/// very small or very large magnitudes, plain decimal otherwise.
pub fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1e-4..1e15).contains(&magnitude) {
        format!("{:e}", value)
    } else if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Writes a tab-separated table with a header row.
pub fn write_tsv<I>(output_path: &Path, header: &[String], rows: I) -> Result<(), TableError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(output_path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a merged abundance table: key column followed by one column per sample.
pub fn write_abundance_table(table: &AbundanceTable, output_path: &Path) -> Result<(), TableError> {
    let mut header = vec![table.key_column().to_string()];
    header.extend(table.sample_names().iter().cloned());

    let counts = table.abundance_matrix();
    let rows = table
        .feature_names()
        .iter()
        .enumerate()
        .map(|(r, feature)| {
            let mut record = Vec::with_capacity(counts.ncols() + 1);
            record.push(feature.clone());
            record.extend(counts.row(r).iter().map(|&v| format_float(v)));
            record
        });

    write_tsv(output_path, &header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count_table::{merge_profiles, AbundanceProfile};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_input() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.tsv");
        let result = open_input(&missing);
        assert!(matches!(result, Err(TableError::MissingInput(p)) if p == missing));
    }

    #[test]
    fn test_read_uncommented_gz() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("profile.tsv.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&file_path).unwrap(), Compression::default());
        encoder
            .write_all(b"#mpa_v30\nclade\tabundance\n#note\nk__Bacteria\t100.0\n")
            .unwrap();
        encoder.finish().unwrap();

        let text = read_uncommented(&file_path, COMMENT_MARKER).unwrap();
        assert_eq!(text, "clade\tabundance\nk__Bacteria\t100.0\n");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(45.0), "45.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(12.5), "12.5");
        assert_eq!(format_float(1e-6), "1e-6");
        assert_eq!(format_float(2.5e-30), "2.5e-30");
    }

    #[test]
    fn test_write_abundance_table_tsv() {
        let a = AbundanceProfile::from_pairs("clade_name", "A", vec![("s__x", 10.0)]);
        let b = AbundanceProfile::from_pairs("clade_name", "B", vec![("s__y", 5.5)]);
        let table = merge_profiles(vec![a, b]).unwrap();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("merged.tsv");
        write_abundance_table(&table, &file_path).unwrap();

        let content = fs::read_to_string(file_path).unwrap();
        let expected_content = "\
clade_name\tA\tB\n\
s__x\t10.0\t0.0\n\
s__y\t0.0\t5.5\n";
        assert_eq!(content, expected_content);

        dir.close().unwrap();
    }
}
