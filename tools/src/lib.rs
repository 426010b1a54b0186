//! # lumberjack-tools - Command Line Tools for lumberjack
//!
//! This crate contains the `lumberjack` binary sampling k-Dollo completions of
//! a matrix file. The argument handling and the sampling run live in this
//! library so that they can be tested without spawning the binary.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use lumberjack::{
    dollo::{DolloSampler, Options, Sample},
    instances::fio,
};
use lumberjack_batsat::{EnumSampler, DEFAULT_MAX_SOLUTIONS};

/// Samples 1-Dollo completions of a noisy binary matrix
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The input matrix. `-` reads from `stdin`.
    pub input: PathBuf,
    /// Number of cell clusters (distinct rows). All rows are distinct by default.
    #[arg(short, long)]
    pub cell_clusters: Option<usize>,
    /// Number of mutation clusters (distinct columns). All columns are
    /// distinct by default.
    #[arg(short, long)]
    pub mutation_clusters: Option<usize>,
    /// Fraction of 0 entries that may be false negatives
    #[arg(short = 'n', long, default_value_t = 0.)]
    pub fn_rate: f64,
    /// Fraction of 1 entries that may be false positives
    #[arg(short = 'p', long, default_value_t = 0.)]
    pub fp_rate: f64,
    /// Number of samples to draw
    #[arg(short, long, default_value_t = 1)]
    pub samples: usize,
    /// Separate forbidden submatrices on demand instead of up front
    #[arg(long)]
    pub lazy: bool,
    /// Comma-separated columns whose cells may not be lost
    #[arg(long, value_delimiter = ',')]
    pub no_loss: Vec<usize>,
    /// Omit duplicate rows and columns from the output
    #[arg(long)]
    pub clustered: bool,
    /// Seed of the sampler
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Maximum number of solutions to enumerate
    #[arg(long, default_value_t = DEFAULT_MAX_SOLUTIONS)]
    pub max_solutions: usize,
    /// Write the samples to a file instead of `stdout`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Write the encoding in DIMACS format to a file
    #[arg(long)]
    pub write_cnf: Option<PathBuf>,
}

impl Args {
    /// The sampler options given by the arguments
    #[must_use]
    pub fn options(&self) -> Options {
        let mut opts = Options::default()
            .fn_rate(self.fn_rate)
            .fp_rate(self.fp_rate)
            .lazy(self.lazy)
            .no_loss(self.no_loss.iter().copied());
        opts.cell_clusters = self.cell_clusters;
        opts.mutation_clusters = self.mutation_clusters;
        opts
    }
}

/// Writes samples to a writer, separated by empty lines
///
/// # Errors
///
/// If writing fails.
pub fn write_samples<W: Write>(
    writer: &mut W,
    samples: &[Sample],
    clustered: bool,
) -> io::Result<()> {
    for (idx, sample) in samples.iter().enumerate() {
        if idx > 0 {
            writeln!(writer)?;
        }
        if clustered {
            fio::matrix::write_matrix(writer, &sample.clustered())?;
        } else {
            fio::matrix::write_matrix(writer, &sample.matrix)?;
        }
    }
    writer.flush()
}

/// Parses the input, samples and writes the output
///
/// # Errors
///
/// If the input cannot be parsed, the options do not fit the input,
/// sampling fails or the output cannot be written.
pub fn run(args: &Args) -> anyhow::Result<Vec<Sample>> {
    let matrix = fio::matrix::parse_matrix_path(&args.input)
        .with_context(|| format!("failed to parse matrix {}", args.input.display()))?;
    log::info!(
        "parsed {}x{} matrix with {} ones",
        matrix.n_rows(),
        matrix.n_cols(),
        matrix.n_ones()
    );

    let mut sampler = DolloSampler::new(matrix, args.options())?;
    let mut engine = EnumSampler::new(args.seed).with_max_solutions(args.max_solutions);
    sampler.init(&mut engine)?;
    if let Some(path) = &args.write_cnf {
        sampler
            .write_dimacs_path(path)
            .with_context(|| format!("failed to write encoding to {}", path.display()))?;
    }
    let samples = sampler.sample(&mut engine, args.samples)?;
    if samples.is_empty() {
        log::warn!("no completion within the given bounds exists");
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_samples(&mut BufWriter::new(file), &samples, args.clustered)?;
        }
        None => write_samples(&mut io::stdout().lock(), &samples, args.clustered)?,
    }
    Ok(samples)
}
