//! Generic element tree for decoded aggregate reports.
//!
//! The tree is owned so it can outlive the raw text it was parsed from.
//! Lookups go through [`XmlNode::get`], which treats a missing node at any
//! depth uniformly as `None`.

use roxmltree::ParsingOptions;

use crate::error::{ReportError, Result};

/// One element of a parsed report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    name: String,
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Local element name (namespace prefix stripped)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed character content, `None` when blank
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Walk `path` through first-matching children and return the text there
    pub fn get(&self, path: &[&str]) -> Option<&str> {
        self.node_at(path)?.text()
    }

    /// Walk `path` through first-matching children
    pub fn node_at(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }
}

/// A decoded report document; `root` is `None` for blank input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDocument {
    root: Option<XmlNode>,
}

impl ParsedDocument {
    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn from_root(root: XmlNode) -> Self {
        Self { root: Some(root) }
    }

    pub fn root(&self) -> Option<&XmlNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Look up a path starting with the root element's own name
    pub fn get(&self, path: &[&str]) -> Option<&str> {
        self.node_at(path)?.text()
    }

    pub fn node_at(&self, path: &[&str]) -> Option<&XmlNode> {
        let root = self.root.as_ref()?;
        match path.split_first() {
            Some((first, rest)) if *first == root.name => root.node_at(rest),
            Some(_) => None,
            None => Some(root),
        }
    }
}

/// Parse raw report text into a [`ParsedDocument`]
pub fn parse_document(text: &str) -> Result<ParsedDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Ok(ParsedDocument::empty());
    }

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
        ReportError::Parse {
            details: e.to_string(),
        }
    })?;

    Ok(ParsedDocument::from_root(convert_element(doc.root_element())))
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> XmlNode {
    let mut text = String::new();
    let mut children = Vec::new();

    for child in node.children() {
        if child.is_element() {
            children.push(convert_element(child));
        } else if child.is_text()
            && let Some(t) = child.text()
        {
            text.push_str(t);
        }
    }

    let trimmed = text.trim();
    XmlNode {
        name: node.tag_name().name().to_string(),
        text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feedback>
  <report_metadata>
    <org_name>google.com</org_name>
    <report_id>123</report_id>
  </report_metadata>
  <record><row><source_ip>1.2.3.4</source_ip></row></record>
  <record><row><source_ip>5.6.7.8</source_ip></row></record>
</feedback>"#;

    #[test]
    fn test_parse_builds_tree() {
        let doc = parse_document(SAMPLE).unwrap();
        let root = doc.root().unwrap();

        assert_eq!(root.name(), "feedback");
        assert_eq!(doc.get(&["feedback", "report_metadata", "report_id"]), Some("123"));
        assert_eq!(root.children_named("record").count(), 2);
    }

    #[test]
    fn test_get_returns_first_repeated_child() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.get(&["feedback", "record", "row", "source_ip"]), Some("1.2.3.4"));
    }

    #[test]
    fn test_get_missing_at_any_depth() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.get(&["feedback", "policy_published", "p"]), None);
        assert_eq!(doc.get(&["feedback", "report_metadata", "date_range", "begin"]), None);
        assert_eq!(doc.get(&["other", "report_metadata"]), None);
        // Container element without text of its own
        assert_eq!(doc.get(&["feedback", "report_metadata"]), None);
    }

    #[test]
    fn test_namespaced_root_uses_local_name() {
        let xml = r#"<feedback xmlns="urn:ietf:params:xml:ns:dmarc-2.0"><report_metadata/></feedback>"#;
        let doc = parse_document(xml).unwrap();
        assert!(doc.node_at(&["feedback", "report_metadata"]).is_some());
    }

    #[test]
    fn test_blank_input_is_empty_document() {
        assert!(parse_document("").unwrap().is_empty());
        assert!(parse_document("  \n\t").unwrap().is_empty());
        assert!(parse_document("\u{feff}").unwrap().is_empty());
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let doc = parse_document("\u{feff}<feedback/>").unwrap();
        assert_eq!(doc.root().unwrap().name(), "feedback");
    }

    #[test]
    fn test_malformed_markup_is_parse_error() {
        let result = parse_document("<feedback><report_metadata></feedback>");
        match result {
            Err(ReportError::Parse { details }) => assert!(!details.is_empty()),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_text_is_none() {
        let doc = parse_document("<feedback><report_id>   </report_id></feedback>").unwrap();
        assert_eq!(doc.get(&["feedback", "report_id"]), None);
    }
}
