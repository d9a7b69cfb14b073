//! Reading tabular pairwise search results and writing hit summaries.
//!
//! Hit tables are the 13-column tabular output of BLAST/DIAMOND
//! (`-outfmt "6 std stitle"`): no header, `#` comment lines allowed.

use super::{format_float, open_input, write_tsv, TableError, DELIMITER};
use crate::annotation::{AnnotationScheme, HitSummary};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Column order of a hit table.
pub const HIT_COLUMNS: [&str; 13] = [
    "query", "subject", "pident", "length", "mismatch", "gapopen", "qstart", "qend", "sstart",
    "send", "evalue", "bitscore", "stitle",
];

/// One row of a pairwise search result.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query: String,
    pub subject: String,
    /// `None` when the field was empty or `NA`; such rows never pass a filter.
    pub percent_identity: Option<f64>,
    pub alignment_length: u64,
    pub mismatches: u64,
    pub gap_opens: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    pub evalue: Option<f64>,
    pub bitscore: f64,
    pub subject_title: String,
}

/// Per-row parsing context, so errors name the file, line and column.
struct RowParser<'a> {
    path: &'a Path,
    line: u64,
    record: &'a csv::StringRecord,
}

impl RowParser<'_> {
    fn text(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or("")
    }

    fn invalid(&self, idx: usize) -> TableError {
        TableError::InvalidField {
            path: self.path.to_path_buf(),
            line: self.line,
            column: HIT_COLUMNS[idx].to_string(),
            value: self.text(idx).to_string(),
        }
    }

    fn parse<T: FromStr>(&self, idx: usize) -> Result<T, TableError> {
        self.text(idx).trim().parse().map_err(|_| self.invalid(idx))
    }

    fn nullable(&self, idx: usize) -> Result<Option<f64>, TableError> {
        let raw = self.text(idx).trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(|_| self.invalid(idx))
    }

    fn hit(&self) -> Result<HitRecord, TableError> {
        let query = self.text(0).to_string();
        if query.is_empty() {
            return Err(self.invalid(0));
        }
        Ok(HitRecord {
            query,
            subject: self.text(1).to_string(),
            percent_identity: self.nullable(2)?,
            alignment_length: self.parse(3)?,
            mismatches: self.parse(4)?,
            gap_opens: self.parse(5)?,
            query_start: self.parse(6)?,
            query_end: self.parse(7)?,
            subject_start: self.parse(8)?,
            subject_end: self.parse(9)?,
            evalue: self.nullable(10)?,
            bitscore: self.parse(11)?,
            subject_title: self.text(12).to_string(),
        })
    }
}

/// Reads every hit from a tabular search result.
///
/// The whole table is rejected on the first row whose column count differs
/// from [`HIT_COLUMNS`] or whose numeric fields do not parse.
pub fn read_hit_table(path: &Path) -> Result<Vec<HitRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .from_reader(open_input(path)?);

    let mut hits = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() != HIT_COLUMNS.len() {
            return Err(TableError::ColumnCount {
                path: path.to_path_buf(),
                line,
                expected: HIT_COLUMNS.len(),
                found: record.len(),
            });
        }
        let parser = RowParser {
            path,
            line,
            record: &record,
        };
        hits.push(parser.hit()?);
    }

    debug!("Parsed {} hits from {}", hits.len(), path.display());
    Ok(hits)
}

/// Writes the filtered hits with their extracted identifiers, in input order.
///
/// Unclassified identifiers are written as empty cells.
pub fn write_detailed_annotations(
    summary: &HitSummary,
    scheme: &AnnotationScheme,
    output_path: &Path,
) -> Result<(), TableError> {
    let mut header = vec!["query".to_string()];
    header.extend(scheme.families().iter().map(|f| f.column.to_string()));
    if let Some(tier) = scheme.category() {
        header.push(tier.column.to_string());
    }
    header.extend(["pident", "evalue", "stitle"].map(String::from));

    let rows = summary.hits.iter().map(|hit| {
        let mut row = vec![hit.record.query.clone()];
        row.extend(hit.identifiers.iter().map(|id| id.clone().unwrap_or_default()));
        if scheme.category().is_some() {
            row.push(hit.category.clone().unwrap_or_default());
        }
        row.push(hit.record.percent_identity.map(format_float).unwrap_or_default());
        row.push(hit.record.evalue.map(format_float).unwrap_or_default());
        row.push(hit.record.subject_title.clone());
        row
    });

    write_tsv(output_path, &header, rows)
}

/// Writes one frequency summary per identifier family, plus the category
/// tier when the scheme has one. Returns the written paths in order.
pub fn write_frequency_summaries(
    summary: &HitSummary,
    scheme: &AnnotationScheme,
    output_prefix: &str,
) -> Result<Vec<PathBuf>, TableError> {
    let mut written = Vec::new();

    for (family, counts) in scheme.families().iter().zip(&summary.family_counts) {
        let path = PathBuf::from(format!("{}_{}_summary.txt", output_prefix, family.name));
        let describe = scheme.describes(family.name);
        let mut header = vec![family.label.to_string(), "Count".to_string()];
        if describe {
            header.push("Description".to_string());
        }
        let rows = counts.most_common().into_iter().map(|(id, count)| {
            let mut row = vec![id.to_string(), count.to_string()];
            if describe {
                row.push(scheme.short_description(id).to_string());
            }
            row
        });
        write_tsv(&path, &header, rows)?;
        info!("{} summary written to {}", family.label, path.display());
        written.push(path);
    }

    if let (Some(tier), Some(counts)) = (scheme.category(), &summary.category_counts) {
        let path = PathBuf::from(format!("{}_{}_summary.txt", output_prefix, tier.name));
        let header = [tier.label, "Count", "Description"].map(String::from);
        let rows = counts.most_common().into_iter().map(|(class, count)| {
            vec![
                class.to_string(),
                count.to_string(),
                tier.long_description(class).to_string(),
            ]
        });
        write_tsv(&path, &header, rows)?;
        info!("{} summary written to {}", tier.label, path.display());
        written.push(path);
    }

    Ok(written)
}
