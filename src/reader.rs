//! Container decoding for aggregate report files
//!
//! Reports arrive as plain `.xml`, as a `.zip` archive holding the XML, or
//! gzip-compressed as `.gz`. Each container kind has its own
//! [`ReportReader`]; [`FormatReader`] dispatches once on the extension.
//!
//! Files above the streaming threshold are read through a buffered reader
//! in fixed-size chunks instead of being loaded with a single bulk read.
//! Both strategies yield identical text.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ReportError, Result};

/// Default size above which files are streamed (10 MiB)
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 10 * 1024 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// Container kind derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Xml,
    Zip,
    Gzip,
    Unsupported,
}

impl ContainerKind {
    /// Classify by extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("xml") => ContainerKind::Xml,
            Some("zip") => ContainerKind::Zip,
            Some("gz") => ContainerKind::Gzip,
            _ => ContainerKind::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ContainerKind::Unsupported)
    }
}

/// How the raw bytes of a container are pulled from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    Buffered,
    Streaming,
}

impl ReadStrategy {
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size > threshold {
            ReadStrategy::Streaming
        } else {
            ReadStrategy::Buffered
        }
    }
}

/// Produces the decoded report text held by one container kind
pub trait ReportReader: Send + Sync {
    fn read_text(&self, path: &Path, strategy: ReadStrategy) -> Result<String>;
}

/// `.xml` files
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainXmlReader;

impl ReportReader for PlainXmlReader {
    fn read_text(&self, path: &Path, strategy: ReadStrategy) -> Result<String> {
        let bytes = match strategy {
            ReadStrategy::Buffered => {
                std::fs::read(path).map_err(|e| ReportError::file_read(path, e))?
            }
            ReadStrategy::Streaming => {
                let file = File::open(path).map_err(|e| ReportError::file_read(path, e))?;
                read_chunked(BufReader::new(file)).map_err(|e| ReportError::file_read(path, e))?
            }
        };
        Ok(decode_utf8(bytes))
    }
}

/// `.zip` archives; the report is the first `.xml` member, or failing that
/// the first extension-less file
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipReader;

impl ZipReader {
    fn read_archive<R: Read + Seek>(&self, path: &Path, reader: R) -> Result<String> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| ReportError::file_read(path, zip_to_io(e)))?;

        let index = select_member(&mut archive)
            .map_err(|e| ReportError::file_read(path, zip_to_io(e)))?
            .ok_or_else(|| ReportError::NoXmlMember {
                path: path.to_path_buf(),
            })?;

        let mut member = archive
            .by_index(index)
            .map_err(|e| ReportError::file_read(path, zip_to_io(e)))?;
        debug!("Reading archive member {} from {}", member.name(), path.display());

        let mut bytes = Vec::with_capacity(member_capacity(member.size()));
        member
            .read_to_end(&mut bytes)
            .map_err(|e| ReportError::file_read(path, e))?;
        Ok(decode_utf8(bytes))
    }
}

impl ReportReader for ZipReader {
    fn read_text(&self, path: &Path, strategy: ReadStrategy) -> Result<String> {
        match strategy {
            ReadStrategy::Buffered => {
                let bytes = std::fs::read(path).map_err(|e| ReportError::file_read(path, e))?;
                self.read_archive(path, Cursor::new(bytes))
            }
            ReadStrategy::Streaming => {
                let file = File::open(path).map_err(|e| ReportError::file_read(path, e))?;
                self.read_archive(path, BufReader::new(file))
            }
        }
    }
}

/// `.gz` files holding a single gzip stream
#[derive(Debug, Default, Clone, Copy)]
pub struct GzipReader;

impl ReportReader for GzipReader {
    fn read_text(&self, path: &Path, strategy: ReadStrategy) -> Result<String> {
        let bytes = match strategy {
            ReadStrategy::Buffered => {
                let compressed =
                    std::fs::read(path).map_err(|e| ReportError::file_read(path, e))?;
                let mut decoder = GzDecoder::new(compressed.as_slice());
                let mut bytes = Vec::new();
                decoder
                    .read_to_end(&mut bytes)
                    .map_err(|e| ReportError::file_read(path, e))?;
                bytes
            }
            ReadStrategy::Streaming => {
                let file = File::open(path).map_err(|e| ReportError::file_read(path, e))?;
                read_chunked(GzDecoder::new(BufReader::new(file)))
                    .map_err(|e| ReportError::file_read(path, e))?
            }
        };
        Ok(decode_utf8(bytes))
    }
}

/// Extension-dispatching reader used by the converter
#[derive(Debug, Clone, Copy)]
pub struct FormatReader {
    streaming_threshold: u64,
}

impl FormatReader {
    pub fn new(streaming_threshold: u64) -> Self {
        Self {
            streaming_threshold,
        }
    }

    pub fn streaming_threshold(&self) -> u64 {
        self.streaming_threshold
    }

    /// Reader for a container kind, `None` for unsupported files
    pub fn reader_for(kind: ContainerKind) -> Option<&'static dyn ReportReader> {
        match kind {
            ContainerKind::Xml => Some(&PlainXmlReader),
            ContainerKind::Zip => Some(&ZipReader),
            ContainerKind::Gzip => Some(&GzipReader),
            ContainerKind::Unsupported => None,
        }
    }

    /// Decode the report text held in `path`
    pub fn read(&self, path: &Path) -> Result<String> {
        let kind = ContainerKind::from_path(path);
        let metadata = std::fs::metadata(path).map_err(|e| ReportError::file_read(path, e))?;
        if metadata.is_dir() {
            return Err(ReportError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        self.read_with(path, kind, metadata.len())
    }

    /// Decode with kind and size already known (as from a directory listing)
    pub fn read_with(&self, path: &Path, kind: ContainerKind, size: u64) -> Result<String> {
        let reader = Self::reader_for(kind).ok_or_else(|| ReportError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let strategy = ReadStrategy::for_size(size, self.streaming_threshold);
        debug!(
            "Reading {} as {:?} ({} bytes, {:?})",
            path.display(),
            kind,
            size,
            strategy
        );
        reader.read_text(path, strategy)
    }
}

impl Default for FormatReader {
    fn default() -> Self {
        Self::new(DEFAULT_STREAMING_THRESHOLD)
    }
}

fn select_member<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> zip::result::ZipResult<Option<usize>> {
    let mut fallback = None;
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        if name.to_ascii_lowercase().ends_with(".xml") {
            return Ok(Some(index));
        }
        if fallback.is_none() && Path::new(name).extension().is_none() {
            fallback = Some(index);
        }
    }
    Ok(fallback)
}

fn read_chunked<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(bytes)
}

/// Invalid sequences are replaced rather than failing the whole file
fn decode_utf8(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Preallocation for a member; the declared size comes from the archive
/// header and is not trusted beyond one chunk
fn member_capacity(declared_size: u64) -> usize {
    declared_size.min(CHUNK_SIZE as u64) as usize
}

fn zip_to_io(err: ZipError) -> std::io::Error {
    match err {
        ZipError::Io(io) => io,
        other => std::io::Error::other(other),
    }
}
