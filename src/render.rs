//! HTML rendering of report fragments and the final document
//!
//! Every interpolated value is escaped; report content comes from third
//! parties and is untrusted.

use std::fmt::Write as _;

use crate::extract::{Category, ExtractedReport, Field, RecordView, ReportMetadata};

pub const DEFAULT_TITLE: &str = "DMARC レポート";

const STYLESHEET: &str = include_str!("../assets/report.css");

const ATTRIBUTION_URL: &str = "https://github.com/burnworks/dmarc-to-html-converter";
const ATTRIBUTION_TEXT: &str = "@burnworks/dmarc-to-html-converter";

const COLUMNS: [&str; 10] = [
    "IP",
    "From",
    "Count",
    "Disposition",
    "DKIM",
    "SPF",
    "DKIM Domain",
    "DKIM Results",
    "SPF Domain",
    "SPF Results",
];

const PLACEHOLDER_ROW: &str = "No records in this report";

/// A rendered `<section>` for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFragment(String);

impl ReportFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Render one validated report
pub fn render_report(metadata: &ReportMetadata, records: &[RecordView]) -> ReportFragment {
    let mut html = String::from("<section>\n");
    let _ = writeln!(
        html,
        "<h2 class=\"header\">ID: {}</h2>",
        escape_html(&metadata.report_id)
    );
    let _ = writeln!(
        html,
        "<p class=\"date\">{} ～ {}</p>",
        escape_html(&metadata.period_begin),
        escape_html(&metadata.period_end)
    );

    html.push_str("<table class=\"result\">\n<thead>\n<tr>\n");
    for column in COLUMNS {
        let _ = writeln!(html, "<th>{}</th>", column);
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    if records.is_empty() {
        let _ = writeln!(
            html,
            "<tr><td class=\"none\" colspan=\"{}\">{}</td></tr>",
            COLUMNS.len(),
            PLACEHOLDER_ROW
        );
    }
    for record in records {
        html.push_str("<tr>\n");
        for cell in record.cells() {
            render_cell(&mut html, cell);
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</section>\n");
    ReportFragment(html)
}

/// Convenience wrapper over [`render_report`]
pub fn render_extracted(report: &ExtractedReport) -> ReportFragment {
    render_report(&report.metadata, &report.records)
}

/// Render a file that could not be turned into a report
pub fn render_error(filename: &str, message: &str) -> ReportFragment {
    let mut html = String::from("<section class=\"error\">\n");
    let _ = writeln!(
        html,
        "<h2 class=\"header\">Error: {}</h2>",
        escape_html(filename)
    );
    let _ = writeln!(html, "<p class=\"message\">{}</p>", escape_html(message));
    html.push_str("</section>\n");
    ReportFragment(html)
}

/// Stand-in when no file produced a fragment
pub fn render_no_reports() -> ReportFragment {
    ReportFragment(
        "<section>\n<h2 class=\"header\">No valid reports</h2>\n\
         <p class=\"message\">No DMARC aggregate reports (.xml, .zip, .gz) were found.</p>\n\
         </section>\n"
            .to_string(),
    )
}

/// Concatenate fragments between the fixed header and footer
pub fn assemble_document(title: &str, fragments: &[ReportFragment]) -> String {
    let body_len: usize = fragments.iter().map(|f| f.0.len()).sum();
    let mut html = String::with_capacity(body_len + STYLESHEET.len() + 1024);

    push_head(&mut html, title);
    for fragment in fragments {
        html.push_str(&fragment.0);
    }
    push_foot(&mut html);
    html
}

/// Minimal standalone page written when the whole run fails
pub fn render_failure_document(title: &str, message: &str) -> String {
    let mut html = String::new();
    push_head(&mut html, title);
    html.push_str("<section class=\"error\">\n");
    html.push_str("<h2 class=\"header\">Report generation failed</h2>\n");
    let _ = writeln!(html, "<p class=\"message\">{}</p>", escape_html(message));
    html.push_str("</section>\n");
    push_foot(&mut html);
    html
}

fn push_head(html: &mut String, title: &str) {
    let title = escape_html(title);
    html.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", title);
    let _ = write!(html, "<style>\n{}</style>\n", STYLESHEET);
    html.push_str("</head>\n<body>\n<header>\n");
    let _ = writeln!(html, "<h1>{}</h1>", title);
    html.push_str("</header>\n<main>\n");
}

fn push_foot(html: &mut String) {
    html.push_str("</main>\n<footer>\n");
    let _ = writeln!(
        html,
        "<address><a href=\"{}\" target=\"_blank\">{}</a></address>",
        ATTRIBUTION_URL, ATTRIBUTION_TEXT
    );
    html.push_str("</footer>\n</body>\n</html>\n");
}

fn render_cell(html: &mut String, field: &Field) {
    let class = field.category.as_str();
    let value = escape_html(&field.value);
    match field.category {
        Category::Pass | Category::Fail | Category::Softfail => {
            let _ = writeln!(
                html,
                "<td class=\"{class}\"><span class=\"{class}\">{value}</span></td>"
            );
        }
        Category::None | Category::Value => {
            let _ = writeln!(html, "<td class=\"{class}\">{value}</td>");
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
