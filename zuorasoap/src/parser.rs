//! Parsing of inbound SOAP documents

use super::{SoapBody, SoapEnvelope, SoapHeader};
use std::io::BufReader;
use xmltree::Element;

/// SOAP parsing error
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parses a complete SOAP envelope.
///
/// Element names in the returned tree are local names: prefixes are
/// resolved by the parser and kept apart in `Element::prefix`.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let root = Element::parse(BufReader::new(xml))?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    // Header (optional)
    let header = find_child(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    let body = find_child(&root, "Body")
        .map(|e| SoapBody { content: e.clone() })
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope { header, body })
}

/// First child element whose local name matches `local`, ignoring ASCII case.
///
/// The service is not consistent about casing (`Success` in `createResponse`,
/// `success` in `deleteResponse`).
pub fn find_child<'a>(parent: &'a Element, local: &str) -> Option<&'a Element> {
    children_named(parent, local).next()
}

pub fn children_named<'a>(parent: &'a Element, local: &str) -> impl Iterator<Item = &'a Element> {
    parent
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(move |e| local_name(&e.name).eq_ignore_ascii_case(local))
}

/// Trimmed text of the first matching child, `None` when absent or blank.
pub fn child_text(parent: &Element, local: &str) -> Option<String> {
    find_child(parent, local)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}
