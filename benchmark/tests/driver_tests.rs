// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the timed driver and the `comp-bench` binary.

use std::io::Write;
use std::process::Command;
use std::time::Duration;

use compbench_benchmark::BenchmarkHarness;
use compbench_core::{Backend, Concurrency, Level};
use tempfile::{NamedTempFile, TempDir};

const MIB: usize = 1024 * 1024;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_comp-bench"))
}

fn temp_input(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents).expect("Failed to write temp file");
    file.flush().unwrap();
    file
}

/// 1 MiB of zeros, deflate level 1, one thread, one second.
#[test]
fn test_zeros_deflate_scenario() {
    let zeros = vec![0u8; MIB];
    let level = Level::new(Backend::Deflate, 1).unwrap();
    let result = BenchmarkHarness::new(Backend::Deflate, level)
        .budget(Duration::from_secs(1))
        .run(&zeros, None)
        .unwrap();

    assert!(result.total_iterations() > 0);
    assert_eq!(result.output_size(), 4596);
    assert!(result.elapsed >= Duration::from_secs(1));
}

#[test]
fn test_workers_stay_balanced() {
    let input: Vec<u8> = b"balanced workers compress the same buffer\n"
        .iter()
        .copied()
        .cycle()
        .take(64 * 1024)
        .collect();
    let level = Level::new(Backend::Zstd, 3).unwrap();
    let result = BenchmarkHarness::new(Backend::Zstd, level)
        .threads(Concurrency::new(2).unwrap())
        .budget(Duration::from_secs(1))
        .run(&input, None)
        .unwrap();

    let balance = result.worker_balance().expect("every worker made progress");
    assert!(balance < 2.0, "unbalanced workers: {:?}", result.workers);
}

#[test]
fn test_reported_throughput_matches_formula() {
    let input = vec![0xA5u8; 256 * 1024];
    let level = Level::new(Backend::Brotli, 1).unwrap();
    let result = BenchmarkHarness::new(Backend::Brotli, level)
        .budget(Duration::from_millis(300))
        .run(&input, None)
        .unwrap();

    let expected = result.total_iterations() as f64 * input.len() as f64
        / (1024.0 * 1024.0)
        / result.elapsed.as_secs_f64();
    assert_eq!(result.throughput_mib_per_sec(), expected);

    let nominal = result.total_iterations() as f64 * input.len() as f64
        / (1024.0 * 1024.0)
        / Duration::from_millis(300).as_secs_f64();
    assert_eq!(result.nominal_throughput_mib_per_sec(), nominal);
}

#[test]
fn test_cli_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.bin");

    let output = bin().arg(&missing).arg("--duration").arg("1").output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no throughput line on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error opening"), "stderr: {}", stderr);
    assert!(stderr.contains("missing.bin"), "stderr: {}", stderr);
}

#[test]
fn test_cli_missing_dictionary_fails() {
    let input = temp_input(&[1u8; 1024]);
    let dir = TempDir::new().unwrap();

    let output = bin()
        .arg(input.path())
        .args(["-b", "--dict"])
        .arg(dir.path().join("no-dict"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error opening"), "stderr: {}", stderr);
    assert!(!stderr.contains("Threads:"), "summary printed before failure");
}

#[test]
fn test_cli_rejects_two_algorithms() {
    let input = temp_input(&[1u8; 1024]);
    let output = bin().arg(input.path()).args(["-b", "-s"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_rejects_out_of_range_quality() {
    let input = temp_input(&[1u8; 1024]);
    let output = bin()
        .arg(input.path())
        .args(["--quality", "12", "--duration", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_run_prints_csv_and_report() {
    let contents = b"compbench cli ".repeat(4096);
    let input = temp_input(&contents);
    let dictionary = temp_input(&b"compbench dictionary ".repeat(256));
    let report_dir = TempDir::new().unwrap();

    let output = bin()
        .arg(input.path())
        .args(["--concurency", "2", "-q", "3", "-s", "--duration", "1"])
        .arg("--dict")
        .arg(dictionary.path())
        .arg("--json")
        .arg(report_dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.trim_end();
    assert!(line.starts_with("Compression speed:,"), "stdout: {}", stdout);
    assert!(line.ends_with(",MiB"), "stdout: {}", stdout);
    let speed = line
        .trim_start_matches("Compression speed:,")
        .trim_end_matches(",MiB");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Threads: 2, alg: Zstd, quality 3"), "stderr: {}", stderr);

    // Rate is total passes times input size over the one second budget.
    let total: u64 = stderr
        .lines()
        .find_map(|l| l.strip_prefix("Total times compressed: "))
        .and_then(|rest| rest.split(';').next())
        .expect("totals line on stderr")
        .parse()
        .unwrap();
    assert!(total > 0);
    let expected = total as f64 * contents.len() as f64 / (1024.0 * 1024.0) / 1.0;
    assert_eq!(speed, format!("{:.2}", expected));

    let reports: Vec<_> = std::fs::read_dir(report_dir.path()).unwrap().collect();
    assert_eq!(reports.len(), 1);
}
