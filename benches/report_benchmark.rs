use divan::Bencher;
use dmarc_report::{
    TimestampNormalizer, assemble_document, extract_report, parse_document, render_extracted,
    validate_document,
};

fn main() {
    divan::main();
}

fn sample_report(records: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feedback>
  <report_metadata>
    <org_name>example.net</org_name>
    <report_id>bench-1</report_id>
    <date_range><begin>1000000000</begin><end>1000086399</end></date_range>
  </report_metadata>
"#,
    );
    for i in 0..records {
        xml.push_str(&format!(
            r#"  <record>
    <row>
      <source_ip>192.0.2.{}</source_ip>
      <count>{}</count>
      <policy_evaluated><disposition>none</disposition><dkim>pass</dkim><spf>fail</spf></policy_evaluated>
    </row>
    <identifiers><header_from>example.com</header_from></identifiers>
    <auth_results>
      <dkim><domain>example.com</domain><result>pass</result></dkim>
      <spf><domain>example.com</domain><result>softfail</result></spf>
    </auth_results>
  </record>
"#,
            i % 255,
            i + 1
        ));
    }
    xml.push_str("</feedback>\n");
    xml
}

#[divan::bench(args = [1, 100, 1000])]
fn parse_report(bencher: Bencher, records: usize) {
    let xml = sample_report(records);

    bencher.bench_local(|| parse_document(divan::black_box(&xml)).unwrap());
}

#[divan::bench(args = [1, 100, 1000])]
fn render_report_section(bencher: Bencher, records: usize) {
    let xml = sample_report(records);
    let normalizer = TimestampNormalizer::default();

    bencher.bench_local(|| {
        let document = parse_document(&xml).unwrap();
        validate_document(&document).into_result().unwrap();
        let report = extract_report(&document, &normalizer);
        render_extracted(&report)
    });
}

#[divan::bench]
fn assemble_many_sections(bencher: Bencher) {
    let document = parse_document(&sample_report(10)).unwrap();
    let report = extract_report(&document, &TimestampNormalizer::default());
    let fragments: Vec<_> = (0..50).map(|_| render_extracted(&report)).collect();

    bencher.bench_local(|| assemble_document("DMARC レポート", divan::black_box(&fragments)));
}
