use crate::annotation::AnnotationScheme;
use crate::config::{load_params, BinFilterParams, HitFilterOverrides, HitFilterParams, MergeParams};
use crate::pipeline::{
    annotation_report, bin_filter_report, bin_statistics, merge_report, run_annotation,
    run_bin_filter, run_merge,
};
use crate::samplesheet::{find_fastq_pairs, write_samplesheet, DEFAULT_FASTQ_PATTERN};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs;
use std::path::PathBuf;

/// Summarize metagenomic annotation hits, abundance profiles and bin quality tables
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse CAZy BLAST results and summarize carbohydrate-active enzyme annotations
    Cazy(AnnotateArgs),

    /// Parse KEGG BLAST results and summarize functional annotations
    Kegg(AnnotateArgs),

    /// Merge multiple MetaPhlAn profile tables into a single table
    MergeProfiles {
        /// Input MetaPhlAn profile files
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output merged table
        #[arg(short, long)]
        output: PathBuf,

        /// Sample names, paired with inputs by position (defaults to file names)
        #[arg(short, long, num_args = 1..)]
        names: Option<Vec<String>>,

        /// Taxonomic level to extract: kingdom, phylum, class, order, family,
        /// genus, species, strain or all
        #[arg(short, long, default_value = "all")]
        level: String,

        /// Header of the abundance column (defaults to the second column)
        #[arg(long)]
        abundance_column: Option<String>,

        /// Number of taxa listed in the printed summary
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Filter bins based on CheckM quality metrics
    FilterBins {
        /// CheckM results file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file with filtered bins
        #[arg(short, long)]
        output: PathBuf,

        /// Minimum completeness percentage (default: 50)
        #[arg(long)]
        min_completeness: Option<f64>,

        /// Maximum contamination percentage (default: 10)
        #[arg(long)]
        max_contamination: Option<f64>,

        /// Minimum genome length in bp
        #[arg(long)]
        min_length: Option<u64>,

        /// Output statistics file
        #[arg(long)]
        stats: Option<PathBuf>,

        /// JSON file with filter parameters; flags take precedence
        #[arg(long)]
        params: Option<PathBuf>,
    },

    /// Generate a samplesheet from a directory of paired FASTQ files
    Samplesheet {
        /// Directory containing FASTQ files
        #[arg(long)]
        directory: PathBuf,

        /// Output samplesheet CSV
        #[arg(long)]
        output: PathBuf,

        /// FASTQ file pattern
        #[arg(long, default_value = DEFAULT_FASTQ_PATTERN)]
        pattern: String,
    },
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// BLAST results file (tabular format)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file prefix
    #[arg(short, long)]
    pub output_prefix: String,

    /// Minimum identity percentage (default: 40 for CAZy, 50 for KEGG)
    #[arg(long)]
    pub identity: Option<f64>,

    /// Maximum E-value (default: 1e-5)
    #[arg(long)]
    pub evalue: Option<f64>,

    /// JSON file with filter parameters; flags take precedence
    #[arg(long)]
    pub params: Option<PathBuf>,
}

/// Main entry point for CLI
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Cazy(args) => annotate(args, AnnotationScheme::cazy()?),
        Commands::Kegg(args) => annotate(args, AnnotationScheme::kegg()?),
        Commands::MergeProfiles {
            input,
            output,
            names,
            level,
            abundance_column,
            top,
        } => {
            let params = MergeParams {
                level,
                abundance_column,
                top_n: top,
            };
            println!("Merging {} MetaPhlAn profiles...", input.len());
            let summary = run_merge(&input, names.as_deref(), &output, &params)
                .context("Failed to merge abundance profiles")?;
            print!("{}", merge_report(&summary));
            Ok(())
        }
        Commands::FilterBins {
            input,
            output,
            min_completeness,
            max_contamination,
            min_length,
            stats,
            params,
        } => {
            let mut filter: BinFilterParams = match &params {
                Some(path) => load_params(path)
                    .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
                None => BinFilterParams::default(),
            };
            if let Some(value) = min_completeness {
                filter.min_completeness = value;
            }
            if let Some(value) = max_contamination {
                filter.max_contamination = value;
            }
            if min_length.is_some() {
                filter.min_length = min_length;
            }
            info!("Bin filter parameters: {:?}", filter);

            println!("Reading CheckM results from {}...", input.display());
            let summary = run_bin_filter(&input, &output, &filter)
                .with_context(|| format!("Failed to filter bins from {}", input.display()))?;
            print!("{}", bin_filter_report(&summary));
            println!("Filtered bins written to {}", output.display());

            if let Some(stats_path) = stats {
                fs::write(&stats_path, bin_statistics(&summary)).with_context(|| {
                    format!("Failed to write statistics to {}", stats_path.display())
                })?;
                println!("Statistics written to {}", stats_path.display());
            }
            Ok(())
        }
        Commands::Samplesheet {
            directory,
            output,
            pattern,
        } => {
            let found = find_fastq_pairs(&directory, &pattern)
                .with_context(|| format!("Failed to scan {}", directory.display()))?;
            write_samplesheet(&found.pairs, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Generated samplesheet with {} samples: {}",
                found.pairs.len(),
                output.display()
            );
            if !found.incomplete.is_empty() {
                println!(
                    "Skipped {} samples with incomplete pairs: {}",
                    found.incomplete.len(),
                    found.incomplete.join(", ")
                );
            }
            Ok(())
        }
    }
}

fn annotate(args: AnnotateArgs, scheme: AnnotationScheme) -> Result<()> {
    let overrides: HitFilterOverrides = match &args.params {
        Some(path) => load_params(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => HitFilterOverrides::default(),
    };
    let mut params = overrides.apply(HitFilterParams::for_scheme(&scheme));
    if let Some(identity) = args.identity {
        params.min_identity = identity;
    }
    if let Some(evalue) = args.evalue {
        params.max_evalue = evalue;
    }
    info!("{} filter parameters: {:?}", scheme.name, params);

    println!("Parsing BLAST results from {}...", args.input.display());
    let run = run_annotation(&args.input, &args.output_prefix, &scheme, &params)
        .with_context(|| format!("Failed to annotate {}", args.input.display()))?;
    print!("{}", annotation_report(&run, &scheme));
    Ok(())
}
