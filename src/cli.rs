use crate::config::{BenchConfig, DEFAULT_ITERATIONS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dspbench", version)]
#[command(
    about = "Measures the steady-state latency of one DSP block compute call",
    long_about = None
)]
#[command(after_help = "Example: dspbench 1000 20 5  # average values from 5% to 20%")]
pub struct Cli {
    /// Number of measurements [default: 1000]
    #[arg(value_parser = parse_iterations)]
    pub iterations: Option<usize>,

    /// Upper bound of values to average, in percent [default: 10.0]
    #[arg(value_parser = parse_upper_percentile)]
    pub upper_percentile: Option<f64>,

    /// Lower bound to exclude outliers, in percent [default: 1.0]
    #[arg(value_parser = parse_lower_percentile)]
    pub lower_percentile: Option<f64>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Unmeasured calls before timing starts
    #[arg(long, value_name = "N")]
    pub warmup: Option<usize>,

    /// Channel count of the processing block
    #[arg(long, value_name = "N")]
    pub channels: Option<usize>,

    /// Frames of 480 samples per compute call
    #[arg(long, value_name = "N")]
    pub frames: Option<usize>,

    /// Sample rate handed to the processing block
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Print a JSON report instead of the result line
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Overlays the arguments that were given on top of `config`.
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(n) = self.iterations {
            config.iterations = n;
        }
        if let Some(p) = self.upper_percentile {
            config.upper_percentile = p;
        }
        if let Some(p) = self.lower_percentile {
            config.lower_percentile = p;
        }
        if let Some(n) = self.warmup {
            config.warmup_iterations = n;
        }
        if let Some(n) = self.channels {
            config.channels = n;
        }
        if let Some(n) = self.frames {
            config.frames = n;
        }
        if let Some(hz) = self.sample_rate {
            config.sample_rate = hz;
        }
    }
}

/// Most positional arguments accepted.
pub const MAX_POSITIONALS: usize = 3;

/// Long options that consume the following argument as their value.
const VALUE_OPTIONS: [&str; 5] = [
    "--config",
    "--warmup",
    "--channels",
    "--frames",
    "--sample-rate",
];

/// Counts positional arguments in `args` (program name excluded).
///
/// Runs before clap so that an excess of positionals is reported as a usage
/// error even when one of them would also fail value validation.
pub fn count_positionals<S: AsRef<str>>(args: &[S]) -> usize {
    let mut count = 0;
    let mut iter = args.iter().map(AsRef::as_ref);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            return count + iter.count();
        }
        if VALUE_OPTIONS.contains(&arg) {
            iter.next();
        } else if !arg.starts_with('-') || arg.len() == 1 || is_number(arg) {
            count += 1;
        }
    }
    count
}

fn is_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

/// Usage text printed when too many positional arguments are given.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [iterations] [upper_percentile] [lower_percentile]\n\
         \x20 iterations: number of measurements (default: {DEFAULT_ITERATIONS})\n\
         \x20 upper_percentile: upper bound of values to average (default: 10.0)\n\
         \x20 lower_percentile: lower bound to exclude outliers (default: 1.0)\n\
         Example: {program} 1000 20 5  # average values from 5% to 20%"
    )
}

fn parse_iterations(s: &str) -> Result<usize, String> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("No valid integer found in: {s}"))?;
    if value < 1 {
        return Err("Iterations must be at least 1".to_string());
    }
    usize::try_from(value).map_err(|_| format!("Conversion error: {s}"))
}

fn parse_upper_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid upper percentile: {s}"))?;
    if !(value > 0.0 && value <= 100.0) {
        return Err("Upper percentile must be between 0 and 100".to_string());
    }
    Ok(value)
}

fn parse_lower_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid lower percentile: {s}"))?;
    if !(value >= 0.0 && value < 100.0) {
        return Err("Lower percentile must be between 0 and 100".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("dspbench").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments() {
        let cli = parse(&[]).unwrap();
        assert!(cli.iterations.is_none());
        assert!(cli.upper_percentile.is_none());
        assert!(cli.lower_percentile.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_positionals_left_to_right() {
        let cli = parse(&["500", "20", "5"]).unwrap();
        assert_eq!(cli.iterations, Some(500));
        assert_eq!(cli.upper_percentile, Some(20.0));
        assert_eq!(cli.lower_percentile, Some(5.0));
    }

    #[test]
    fn test_too_many_arguments() {
        let err = parse(&["500", "20", "5", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_count_positionals() {
        assert_eq!(count_positionals::<&str>(&[]), 0);
        assert_eq!(count_positionals(&["abc", "1", "2", "3"]), 4);
        assert_eq!(count_positionals(&["10", "--config", "a.json", "20"]), 2);
        assert_eq!(count_positionals(&["--config=a.json", "--json", "5"]), 1);
        assert_eq!(count_positionals(&["--frames", "2", "-5"]), 1);
        assert_eq!(count_positionals(&["1", "--", "2", "3"]), 3);
        assert_eq!(count_positionals(&["--help"]), 0);
    }

    #[test]
    fn test_invalid_numbers() {
        let cases: &[&[&str]] = &[
            &["abc"],
            &["0"],
            &["1.5"],
            &["100", "nope"],
            &["100", "0"],
            &["100", "100.5"],
            &["100", "10", "x"],
            &["100", "10", "100"],
        ];
        for args in cases {
            let err = parse(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "args: {:?}", args);
        }
    }

    #[test]
    fn test_boundary_percentiles_accepted() {
        let cli = parse(&["10", "100", "0"]).unwrap();
        assert_eq!(cli.upper_percentile, Some(100.0));
        assert_eq!(cli.lower_percentile, Some(0.0));
    }

    #[test]
    fn test_apply_overrides_only_given_values() {
        let cli = parse(&["300", "--channels", "4", "--json"]).unwrap();
        let mut config = BenchConfig::default();
        config.upper_percentile = 30.0;
        cli.apply(&mut config);

        assert_eq!(config.iterations, 300);
        assert_eq!(config.channels, 4);
        assert_eq!(config.upper_percentile, 30.0);
        assert_eq!(config.lower_percentile, 1.0);
        assert!(cli.json);
    }

    #[test]
    fn test_usage_mentions_defaults() {
        let text = usage("bench");
        assert!(text.starts_with("Usage: bench [iterations]"));
        assert!(text.contains("(default: 1000)"));
        assert!(text.contains("Example: bench 1000 20 5"));
    }
}
