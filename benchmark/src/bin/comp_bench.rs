// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Runs deflate, Brotli or Zstd on multiple threads and reports throughput.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use compbench_benchmark::{BenchmarkHarness, BenchmarkReport, BenchmarkResult, JsonReporter};
use compbench_core::{Backend, BenchConfig, FileRole, MappedFile};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comp-bench")]
#[command(version, about = "Runs gzip, brotli or Zstd on multiple threads")]
#[command(group(ArgGroup::new("algorithm").args(["brotli", "zstd"])))]
struct Args {
    /// File to compress
    file: PathBuf,

    /// Number of threads
    #[arg(short = 'c', long, visible_alias = "concurency", default_value_t = 1)]
    concurrency: usize,

    /// Quality level, interpreted by the selected algorithm
    #[arg(short, long, default_value_t = 8, allow_negative_numbers = true)]
    quality: i32,

    /// Benchmark brotli
    #[arg(short, long)]
    brotli: bool,

    /// Benchmark Zstd
    #[arg(short = 's', long)]
    zstd: bool,

    /// Use dictionary
    #[arg(short, long, value_name = "DICTIONARY")]
    dict: Option<PathBuf>,

    /// Wall-clock budget in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    duration: u64,

    /// Also write a JSON report into this directory
    #[arg(long, value_name = "DIR")]
    json: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn backend(&self) -> Backend {
        if self.brotli {
            Backend::Brotli
        } else if self.zstd {
            Backend::Zstd
        } else {
            Backend::Deflate
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs share stderr with the run summary; stdout only carries the CSV line.
    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let backend = args.backend();
    let json_dir = args.json;

    let mut config = BenchConfig::new(args.file, backend)?
        .with_concurrency(args.concurrency)?
        .with_level(args.quality)?
        .with_budget(Duration::from_secs(args.duration))?;
    if let Some(dict) = args.dict {
        config = config.with_dictionary(dict);
    }

    // Both files are opened before any worker exists.
    let input = MappedFile::open(config.input_path(), FileRole::Input)?;
    let dictionary = config
        .dictionary_path()
        .map(|path| MappedFile::open(path, FileRole::Dictionary))
        .transpose()?;

    eprintln!(
        "Tested file {}; size: {}",
        config.input_path().display(),
        input.len()
    );
    eprintln!(
        "Threads: {}, alg: {}, quality {}",
        config.concurrency(),
        config.backend(),
        config.level()
    );

    let result = BenchmarkHarness::from_config(&config)
        .run(input.as_slice(), dictionary.as_ref().map(MappedFile::as_slice))?;

    eprintln!(
        "Total times compressed: {}; compressed size: {}",
        result.total_iterations(),
        result.output_size()
    );
    // Rated against the nominal budget; the measured rate goes into the JSON report.
    println!(
        "Compression speed:,{:.2},MiB",
        result.nominal_throughput_mib_per_sec()
    );

    if let Some(dir) = json_dir {
        let reporter = JsonReporter::new(&dir)?;
        let mut report = BenchmarkReport::new();
        report.add_result(BenchmarkResult::from_run(&result));
        let path = reporter.save(&report)?;
        eprintln!("Benchmark report saved to: {}", path.display());
    }

    Ok(())
}
