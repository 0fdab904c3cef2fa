//! Field extraction from a validated aggregate report.

use crate::document::{ParsedDocument, XmlNode};
use crate::timestamp::{ABSENT_MARKER, TimestampNormalizer};

/// Display category used to style a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    None,
    Value,
    Pass,
    Fail,
    Softfail,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::None => "none",
            Category::Value => "value",
            Category::Pass => "pass",
            Category::Fail => "fail",
            Category::Softfail => "softfail",
        }
    }

    /// `fail` is the only failing alignment; anything else present passes
    pub fn alignment(value: Option<&str>) -> Self {
        match value {
            None => Category::None,
            Some("fail") => Category::Fail,
            Some(_) => Category::Pass,
        }
    }

    pub fn auth_result(value: Option<&str>) -> Self {
        match value {
            None => Category::None,
            Some("fail") => Category::Fail,
            Some("softfail") => Category::Softfail,
            Some(_) => Category::Pass,
        }
    }

    pub fn plain(value: Option<&str>) -> Self {
        match value {
            None => Category::None,
            Some(_) => Category::Value,
        }
    }
}

/// One extracted cell; `value` holds [`ABSENT_MARKER`] when the source omits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    pub category: Category,
}

impl Field {
    fn new(raw: Option<&str>, classify: fn(Option<&str>) -> Category) -> Self {
        Self {
            value: raw.unwrap_or(ABSENT_MARKER).to_string(),
            category: classify(raw),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.category == Category::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    pub report_id: String,
    pub period_begin: String,
    pub period_end: String,
}

/// One row per `<record>` of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub source_ip: Field,
    pub header_from: Field,
    pub message_count: Field,
    pub disposition: Field,
    pub dkim_alignment: Field,
    pub spf_alignment: Field,
    pub dkim_domain: Field,
    pub dkim_result: Field,
    pub spf_domain: Field,
    pub spf_result: Field,
}

impl RecordView {
    pub fn from_node(record: &XmlNode) -> Self {
        Self {
            source_ip: Field::new(record.get(&["row", "source_ip"]), Category::plain),
            header_from: Field::new(record.get(&["identifiers", "header_from"]), Category::plain),
            message_count: Field::new(record.get(&["row", "count"]), Category::plain),
            disposition: Field::new(
                record.get(&["row", "policy_evaluated", "disposition"]),
                Category::plain,
            ),
            dkim_alignment: Field::new(
                record.get(&["row", "policy_evaluated", "dkim"]),
                Category::alignment,
            ),
            spf_alignment: Field::new(
                record.get(&["row", "policy_evaluated", "spf"]),
                Category::alignment,
            ),
            dkim_domain: Field::new(
                record.get(&["auth_results", "dkim", "domain"]),
                Category::plain,
            ),
            dkim_result: Field::new(
                record.get(&["auth_results", "dkim", "result"]),
                Category::auth_result,
            ),
            spf_domain: Field::new(record.get(&["auth_results", "spf", "domain"]), Category::plain),
            spf_result: Field::new(
                record.get(&["auth_results", "spf", "result"]),
                Category::auth_result,
            ),
        }
    }

    /// Cells in table column order
    pub fn cells(&self) -> [&Field; 10] {
        [
            &self.source_ip,
            &self.header_from,
            &self.message_count,
            &self.disposition,
            &self.dkim_alignment,
            &self.spf_alignment,
            &self.dkim_domain,
            &self.dkim_result,
            &self.spf_domain,
            &self.spf_result,
        ]
    }
}

/// Everything the renderer needs from one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReport {
    pub metadata: ReportMetadata,
    pub records: Vec<RecordView>,
}

/// Pull metadata and records out of a document that passed validation.
///
/// Missing nodes never abort extraction; they become [`ABSENT_MARKER`].
pub fn extract_report(doc: &ParsedDocument, normalizer: &TimestampNormalizer) -> ExtractedReport {
    let metadata = ReportMetadata {
        report_id: doc
            .get(&["feedback", "report_metadata", "report_id"])
            .unwrap_or(ABSENT_MARKER)
            .to_string(),
        period_begin: normalizer.format(doc.get(&[
            "feedback",
            "report_metadata",
            "date_range",
            "begin",
        ])),
        period_end: normalizer.format(doc.get(&[
            "feedback",
            "report_metadata",
            "date_range",
            "end",
        ])),
    };

    let records = doc
        .root()
        .map(|root| root.children_named("record").map(RecordView::from_node).collect())
        .unwrap_or_default();

    ExtractedReport { metadata, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    const REPORT: &str = r#"<?xml version="1.0"?>
<feedback>
  <report_metadata>
    <report_id>123</report_id>
    <date_range><begin>1000000000</begin><end>1000003600</end></date_range>
  </report_metadata>
  <record>
    <row>
      <source_ip>1.2.3.4</source_ip>
      <count>2</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>pass</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <identifiers><header_from>example.com</header_from></identifiers>
    <auth_results>
      <dkim><domain>example.com</domain><result>pass</result></dkim>
      <spf><domain>mail.example.com</domain><result>softfail</result></spf>
    </auth_results>
  </record>
  <record>
    <row><source_ip>5.6.7.8</source_ip></row>
  </record>
</feedback>"#;

    fn extract(xml: &str) -> ExtractedReport {
        let doc = parse_document(xml).unwrap();
        extract_report(&doc, &TimestampNormalizer::default())
    }

    #[test]
    fn test_metadata_extraction() {
        let report = extract(REPORT);
        assert_eq!(report.metadata.report_id, "123");
        assert_eq!(report.metadata.period_begin, "2001-09-09 10:46:40");
        assert_eq!(report.metadata.period_end, "2001-09-09 11:46:40");
    }

    #[test]
    fn test_full_record() {
        let report = extract(REPORT);
        assert_eq!(report.records.len(), 2);

        let record = &report.records[0];
        assert_eq!(record.source_ip.value, "1.2.3.4");
        assert_eq!(record.source_ip.category, Category::Value);
        assert_eq!(record.message_count.value, "2");
        assert_eq!(record.header_from.value, "example.com");
        assert_eq!(record.dkim_alignment.category, Category::Pass);
        assert_eq!(record.spf_alignment.category, Category::Fail);
        assert_eq!(record.dkim_result.category, Category::Pass);
        assert_eq!(record.spf_result.value, "softfail");
        assert_eq!(record.spf_result.category, Category::Softfail);
    }

    #[test]
    fn test_partial_record_defaults_each_field() {
        let report = extract(REPORT);
        let record = &report.records[1];

        assert_eq!(record.source_ip.value, "5.6.7.8");
        for field in &record.cells()[1..] {
            assert_eq!(field.value, ABSENT_MARKER);
            assert!(field.is_absent());
        }
    }

    #[test]
    fn test_missing_metadata_fields() {
        let report = extract("<feedback><report_metadata/></feedback>");
        assert_eq!(report.metadata.report_id, ABSENT_MARKER);
        assert_eq!(report.metadata.period_begin, ABSENT_MARKER);
        assert_eq!(report.metadata.period_end, ABSENT_MARKER);
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_alignment_classification() {
        assert_eq!(Category::alignment(Some("fail")), Category::Fail);
        assert_eq!(Category::alignment(Some("pass")), Category::Pass);
        assert_eq!(Category::alignment(None), Category::None);
        // Lenient: any present non-fail value displays as pass
        assert_eq!(Category::alignment(Some("unknown")), Category::Pass);
        assert_eq!(Category::alignment(Some("softfail")), Category::Pass);
        assert_eq!(Category::alignment(Some("FAIL")), Category::Pass);
    }

    #[test]
    fn test_auth_result_classification() {
        assert_eq!(Category::auth_result(Some("softfail")), Category::Softfail);
        assert_eq!(Category::auth_result(Some("fail")), Category::Fail);
        assert_eq!(Category::auth_result(Some("neutral")), Category::Pass);
        assert_eq!(Category::auth_result(None), Category::None);
    }

    #[test]
    fn test_plain_classification() {
        assert_eq!(Category::plain(Some("reject")), Category::Value);
        assert_eq!(Category::plain(None), Category::None);
        assert_eq!(Category::None.as_str(), "none");
        assert_eq!(Category::Softfail.as_str(), "softfail");
    }
}
