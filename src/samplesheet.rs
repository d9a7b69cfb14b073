//! Samplesheet generation from paired-end FASTQ files.

use crate::io::TableError;
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default file name pattern for paired reads.
pub const DEFAULT_FASTQ_PATTERN: &str = "*_R*.fastq.gz";

/// Sample name is everything before the first `_R1` / `_R2`.
const READ_PAIR: &str = r"(.+?)_R([12])";

/// A complete read pair for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    pub sample: String,
    pub fastq_1: PathBuf,
    pub fastq_2: PathBuf,
}

/// Pairs found in a directory, plus samples missing one mate.
#[derive(Debug, Clone, Default)]
pub struct SampleDiscovery {
    /// Complete pairs sorted by sample name.
    pub pairs: Vec<SamplePair>,
    pub incomplete: Vec<String>,
}

/// Finds read pairs among the files in `directory` that match `pattern`.
pub fn find_fastq_pairs(directory: &Path, pattern: &str) -> Result<SampleDiscovery, TableError> {
    if !directory.is_dir() {
        return Err(TableError::MissingInput(directory.to_path_buf()));
    }
    let read_pair = Regex::new(READ_PAIR)?;
    // The directory is matched literally; only `pattern` is a glob.
    let search = Path::new(&glob::Pattern::escape(&directory.to_string_lossy())).join(pattern);

    let mut mates: BTreeMap<String, [Option<PathBuf>; 2]> = BTreeMap::new();
    for path in glob::glob(&search.to_string_lossy())?.filter_map(Result::ok) {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(caps) = read_pair.captures(&file_name) else {
            debug!("Skipping {}: no _R1/_R2 tag", file_name);
            continue;
        };
        let mate = if &caps[2] == "1" { 0 } else { 1 };
        let entry = mates.entry(caps[1].to_string()).or_default();
        entry[mate] = Some(std::path::absolute(&path)?);
    }

    let mut discovery = SampleDiscovery::default();
    for (sample, [r1, r2]) in mates {
        match (r1, r2) {
            (Some(fastq_1), Some(fastq_2)) => discovery.pairs.push(SamplePair {
                sample,
                fastq_1,
                fastq_2,
            }),
            _ => {
                warn!("Incomplete pair for {}", sample);
                discovery.incomplete.push(sample);
            }
        }
    }
    Ok(discovery)
}

/// Writes `sample,fastq_1,fastq_2` rows as CSV.
pub fn write_samplesheet(pairs: &[SamplePair], output_path: &Path) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["sample", "fastq_1", "fastq_2"])?;
    for pair in pairs {
        let fastq_1 = pair.fastq_1.to_string_lossy();
        let fastq_2 = pair.fastq_2.to_string_lossy();
        writer.write_record([pair.sample.as_str(), fastq_1.as_ref(), fastq_2.as_ref()])?;
    }
    writer.flush()?;
    Ok(())
}
