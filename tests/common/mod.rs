//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One `<record>` of a fixture report
pub struct RecordSpec<'a> {
    pub source_ip: &'a str,
    pub header_from: &'a str,
    pub count: u32,
    pub dkim: &'a str,
    pub spf: &'a str,
}

impl Default for RecordSpec<'_> {
    fn default() -> Self {
        Self {
            source_ip: "192.0.2.10",
            header_from: "example.com",
            count: 1,
            dkim: "pass",
            spf: "pass",
        }
    }
}

/// Aggregate report XML with the given id, period and records
pub fn report_xml(id: &str, begin: i64, end: i64, records: &[RecordSpec]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feedback>
  <report_metadata>
    <org_name>google.com</org_name>
    <report_id>{id}</report_id>
    <date_range>
      <begin>{begin}</begin>
      <end>{end}</end>
    </date_range>
  </report_metadata>
"#
    );
    for record in records {
        xml.push_str(&format!(
            r#"  <record>
    <row>
      <source_ip>{ip}</source_ip>
      <count>{count}</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>{dkim}</dkim>
        <spf>{spf}</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>{from}</header_from>
    </identifiers>
    <auth_results>
      <dkim>
        <domain>{from}</domain>
        <result>{dkim}</result>
      </dkim>
      <spf>
        <domain>{from}</domain>
        <result>{spf}</result>
      </spf>
    </auth_results>
  </record>
"#,
            ip = record.source_ip,
            count = record.count,
            dkim = record.dkim,
            spf = record.spf,
            from = record.header_from,
        ));
    }
    xml.push_str("</feedback>\n");
    xml
}

/// Minimal single-record report identified by `id`
pub fn simple_report(id: &str) -> String {
    report_xml(id, 1_000_000_000, 1_000_003_600, &[RecordSpec::default()])
}

pub fn write_xml(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, xml).unwrap();
    path
}

pub fn write_zip(dir: &Path, name: &str, member: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    writer.start_file(member, SimpleFileOptions::default()).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap();
    path
}

pub fn write_gz(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(xml.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Pin a file's modification time to `secs` after the epoch
pub fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// Byte offset of `needle` in `haystack`, panicking with context if absent
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in output", needle))
}
