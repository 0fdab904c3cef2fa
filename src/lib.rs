//! # dmarc-report Library
//!
//! Converts a directory of DMARC aggregate reports (plain `.xml`, `.zip`
//! or `.gz` containers) into a single HTML document with one section per
//! report, newest first.

pub mod cli;
pub mod config;
pub mod converter;
pub mod document;
pub mod error;
pub mod extract;
pub mod file_discovery;
pub mod output;
pub mod reader;
pub mod render;
pub mod schema;
pub mod timestamp;

pub use cli::{Cli, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use converter::{
    ConversionSummary, ConverterConfig, FileOutcome, FileStatus, ProgressCallback,
    ReportConverter, RunPhase, RunProgress,
};
pub use document::{ParsedDocument, XmlNode, parse_document};
pub use error::{ReportError, Result};
pub use extract::{Category, ExtractedReport, Field, RecordView, ReportMetadata, extract_report};
pub use file_discovery::{FileDiscovery, SourceFile, sort_newest_first};
pub use output::Output;
pub use reader::{ContainerKind, FormatReader, ReadStrategy, ReportReader};
pub use render::{
    ReportFragment, assemble_document, render_error, render_extracted, render_failure_document,
    render_no_reports, render_report,
};
pub use schema::{ValidationResult, validate_document};
pub use timestamp::TimestampNormalizer;
