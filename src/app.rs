//! Command-line driver: argument checks, one benchmark run and its output.

use crate::cli::{self, Cli, MAX_POSITIONALS};
use crate::{estimate, BenchConfig, Collector, DspWorkload, Report};
use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::io::Write;

/// Runs the program for `args` (program name first) and returns the exit code.
///
/// The positional count is checked first, then each value, then the
/// configuration as a whole. Results go to `out`, diagnostics to `err`.
pub fn run<W: Write, E: Write>(args: &[String], out: &mut W, err: &mut E) -> i32 {
    let program = args.first().map(String::as_str).unwrap_or("dspbench");
    let rest = args.get(1..).unwrap_or(&[]);

    if cli::count_positionals(rest) > MAX_POSITIONALS {
        let _ = writeln!(err, "{}", cli::usage(program));
        return 1;
    }

    let cli = match Cli::try_parse_from(args.iter()) {
        Ok(cli) => cli,
        Err(e) => return parse_error(&e, program, out, err),
    };

    match benchmark(program, &cli) {
        Ok(text) => {
            let _ = writeln!(out, "{}", text);
            0
        }
        Err(e) => {
            let _ = writeln!(err, "Error: {:#}", e);
            1
        }
    }
}

fn parse_error<W: Write, E: Write>(
    e: &clap::Error,
    program: &str,
    out: &mut W,
    err: &mut E,
) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(out, "{}", e.render());
            0
        }
        ErrorKind::UnknownArgument => {
            let _ = write!(err, "{}", e.render());
            let _ = writeln!(err, "{}", cli::usage(program));
            1
        }
        _ => {
            let _ = write!(err, "{}", e.render());
            1
        }
    }
}

fn benchmark(program: &str, cli: &Cli) -> Result<String> {
    let mut config = BenchConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    let window = config.validate()?;
    log::debug!("Configuration: {:?}", config);

    let mut workload = DspWorkload::new(&config)?;
    let collector = Collector::new(config.warmup_iterations);
    let measurements = collector.collect(config.iterations, || workload.compute());

    let estimate = estimate(&measurements, window)
        .ok_or_else(|| anyhow!("No measurements collected"))?;
    log::debug!(
        "Averaging ranks {:?} of {} samples",
        estimate.indices.ranks(),
        measurements.len()
    );

    let report = Report::new(program, &config, window, &estimate);
    log::info!(
        "Trimmed mean {:.6} ms (min {:.6} ms, max {:.6} ms)",
        report.trimmed_mean_ms,
        report.min_ms,
        report.max_ms
    );

    if cli.json {
        Ok(report.to_json()?)
    } else {
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    struct Outcome {
        code: i32,
        out: String,
        err: String,
    }

    fn invoke(args: &[&str]) -> Outcome {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(&args, &mut out, &mut err);
        Outcome {
            code,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    /// An empty config file so the per-user one is never read.
    fn empty_config() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{}").unwrap();
        file
    }

    #[test]
    fn test_too_many_arguments_prints_usage() {
        let res = invoke(&["./bench", "10", "1", "2", "3"]);
        assert_eq!(res.code, 1);
        assert!(res.err.starts_with("Usage: ./bench [iterations]"), "{}", res.err);
        assert!(res.out.is_empty());
    }

    #[test]
    fn test_argument_count_checked_before_values() {
        let res = invoke(&["./bench", "abc", "1", "2", "3"]);
        assert_eq!(res.code, 1);
        assert!(res.err.starts_with("Usage: ./bench"), "{}", res.err);
        assert!(!res.err.contains("No valid integer"));
    }

    #[test]
    fn test_invalid_value_exits_one() {
        let res = invoke(&["./bench", "0"]);
        assert_eq!(res.code, 1);
        assert!(res.err.contains("Iterations must be at least 1"), "{}", res.err);
        assert!(!res.err.contains("Usage: ./bench [iterations]"));

        let res = invoke(&["./bench", "100", "150"]);
        assert_eq!(res.code, 1);
        assert!(res.err.contains("Upper percentile must be between 0 and 100"));
    }

    #[test]
    fn test_unknown_option_prints_usage() {
        let res = invoke(&["./bench", "--bogus"]);
        assert_eq!(res.code, 1);
        assert!(res.err.contains("Usage: ./bench [iterations]"), "{}", res.err);
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        let res = invoke(&["./bench", "--help"]);
        assert_eq!(res.code, 0);
        assert!(res.out.contains("Usage:"), "{}", res.out);
        assert!(res.err.is_empty());

        let res = invoke(&["./bench", "--version"]);
        assert_eq!(res.code, 0);
        assert!(res.out.contains(env!("CARGO_PKG_VERSION")), "{}", res.out);
    }

    #[test]
    fn test_inverted_percentiles_exit_one() {
        let config = empty_config();
        let path = config.path().to_str().unwrap();
        let res = invoke(&["./bench", "10", "5", "20", "--config", path]);
        assert_eq!(res.code, 1);
        assert!(res
            .err
            .contains("Lower percentile must be less than upper percentile"));
        assert!(res.out.is_empty());
    }

    #[test]
    fn test_missing_config_file_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let res = invoke(&["./bench", "--config", missing.to_str().unwrap()]);
        assert_eq!(res.code, 1);
        assert!(res.err.starts_with("Error: Failed to read config file"), "{}", res.err);
    }

    #[test]
    fn test_success_prints_result_line() {
        let config = empty_config();
        let path = config.path().to_str().unwrap();
        let res = invoke(&[
            "./bench", "20", "50", "10", "--warmup", "2", "--channels", "1", "--config", path,
        ]);
        assert_eq!(res.code, 0, "stderr: {}", res.err);

        let line = res.out.trim_end();
        let ms = line
            .strip_prefix("./bench ")
            .and_then(|rest| rest.strip_suffix(" ms"))
            .unwrap_or_else(|| panic!("unexpected line: {}", line));
        let ms: f64 = ms.parse().unwrap();
        assert!(ms >= 0.0 && ms.is_finite());
    }

    #[test]
    fn test_json_report() {
        let config = empty_config();
        let path = config.path().to_str().unwrap();
        let res = invoke(&["./bench", "10", "--warmup", "0", "--json", "--config", path]);
        assert_eq!(res.code, 0, "stderr: {}", res.err);

        let value: serde_json::Value = serde_json::from_str(&res.out).unwrap();
        assert_eq!(value["program"], "./bench");
        assert_eq!(value["iterations"], 10);
        assert_eq!(value["warmup_iterations"], 0);
        assert_eq!(value["samples_averaged"], 1);
    }
}
