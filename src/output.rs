//! Terminal summary of a conversion run

use std::time::Duration;

use crate::cli::VerbosityLevel;
use crate::converter::{ConversionSummary, FileOutcome, FileStatus};

/// Line printed once the HTML document has been written
pub const SUCCESS_MESSAGE: &str = "HTML report has been created.";

/// Human-readable formatter for conversion summaries
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(verbosity: VerbosityLevel, show_colors: bool) -> Self {
        Self {
            verbosity,
            show_colors,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_results(&self, summary: &ConversionSummary) -> String {
        let mut output = String::new();

        if let Some(ref run_error) = summary.run_error {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("Report generation failed:", "31"),
                run_error
            ));
            return output;
        }

        match self.verbosity {
            VerbosityLevel::Quiet => {
                if summary.failed_files > 0 {
                    output.push_str(&format!("Failed: {}\n", summary.failed_files));
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                output.push_str(&self.format_summary(summary));

                if self.verbosity == VerbosityLevel::Verbose {
                    output.push('\n');
                    for file_result in &summary.file_results {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }

                output.push('\n');
                output.push_str(&self.colorize(SUCCESS_MESSAGE, "32"));
                output.push('\n');
            }
        }

        output
    }

    pub fn format_file_result(&self, result: &FileOutcome) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);

        match &result.status {
            FileStatus::Rendered { records } => format!(
                "{}  {} ({}) - {} record{}",
                self.colorize("✓ RENDERED", "32"),
                path_display,
                duration_str,
                records,
                if *records == 1 { "" } else { "s" }
            ),
            FileStatus::Failed { message } => format!(
                "{}  {} ({}) - {}",
                self.colorize("✗ FAILED", "31"),
                path_display,
                duration_str,
                message
            ),
            FileStatus::Skipped { reason } => format!(
                "{}  {} - {}",
                self.colorize("- SKIPPED", "36"),
                path_display,
                reason
            ),
        }
    }

    fn format_summary(&self, summary: &ConversionSummary) -> String {
        let mut output = String::new();
        output.push_str("Conversion Summary:\n");
        output.push_str(&format!("  Total files: {}\n", summary.total_files));
        output.push_str(&format!(
            "  {} {} ({} records)\n",
            self.colorize("Rendered:", "32"),
            summary.rendered_files,
            summary.total_records
        ));

        if summary.failed_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "31"),
                summary.failed_files
            ));
        }
        if summary.skipped_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                summary.skipped_files
            ));
        }

        output.push_str(&format!("  Output: {}\n", summary.output_path.display()));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(summary.total_duration)
        ));
        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
