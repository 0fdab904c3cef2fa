use clap::Parser;
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show failures
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show per-file details and debug logging
    Verbose,
}

impl VerbosityLevel {
    /// Default tracing filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Convert DMARC aggregate reports into a single HTML page
#[derive(Parser, Debug, Clone)]
#[command(name = "dmarc-report")]
#[command(about = "Convert a directory of DMARC aggregate reports (.xml, .zip, .gz) into one HTML report")]
#[command(version)]
pub struct Cli {
    /// Directory holding the report files
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Path of the generated HTML document
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Number of files processed concurrently per batch
    #[arg(short = 'b', long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_leave_overrides_unset() {
        let cli = Cli::try_parse_from(["dmarc-report"]).unwrap();
        assert_eq!(cli.input, None);
        assert_eq!(cli.output, None);
        assert_eq!(cli.batch_size, None);
        assert_eq!(cli.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_full_cli_parsing() {
        let cli = Cli::try_parse_from([
            "dmarc-report",
            "-i",
            "/srv/dmarc",
            "--output",
            "/tmp/out.html",
            "-b",
            "8",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("/srv/dmarc")));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out.html")));
        assert_eq!(cli.batch_size, Some(8));
        assert_eq!(cli.verbosity(), VerbosityLevel::Verbose);
        assert_eq!(cli.verbosity().log_filter(), "debug");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["dmarc-report", "--verbose", "--quiet"]);
        assert!(result.is_err());
    }
}
