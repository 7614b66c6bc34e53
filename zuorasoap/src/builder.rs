//! Construction of outbound SOAP documents

use crate::ns;
use std::io::BufReader;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Element in the API namespace (`zns:<local>`).
pub fn api_element(local: &str) -> Element {
    Element::new(&format!("{}:{}", ns::API_PREFIX, local))
}

pub fn object_element(local: &str) -> Element {
    Element::new(&format!("{}:{}", ns::OBJECT_PREFIX, local))
}

/// Element holding a single text node. `name` is used verbatim, prefix included.
pub fn text_element(name: &str, text: impl Into<String>) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.into()));
    elem
}

/// Wraps `body_child` in an envelope declaring every namespace the client
/// emits, with an optional session header.
pub fn build_soap_envelope(session: Option<&str>, body_child: Element) -> Element {
    // Envelope
    let mut envelope = Element::new(&format!("{}:Envelope", ns::ENVELOPE_PREFIX));
    for (prefix, uri) in [
        (ns::ENVELOPE_PREFIX, ns::ENVELOPE),
        (ns::API_PREFIX, ns::API),
        (ns::OBJECT_PREFIX, ns::OBJECT),
        ("xsi", ns::XSI),
    ] {
        envelope
            .attributes
            .insert(format!("xmlns:{prefix}"), uri.to_string());
    }

    // Header
    if let Some(key) = session {
        let mut session_header = api_element("SessionHeader");
        session_header
            .children
            .push(XMLNode::Element(text_element("zns:session", key)));

        let mut header = Element::new(&format!("{}:Header", ns::ENVELOPE_PREFIX));
        header.children.push(XMLNode::Element(session_header));
        envelope.children.push(XMLNode::Element(header));
    }

    // Body
    let mut body = Element::new(&format!("{}:Body", ns::ENVELOPE_PREFIX));
    body.children.push(XMLNode::Element(body_child));
    envelope.children.push(XMLNode::Element(body));

    envelope
}

/// Builds a complete request document.
///
/// # Arguments
///
/// * `session` - session key for the `SessionHeader`, `None` for `login`
/// * `body_child` - the operation element (e.g. `zns:create`)
///
/// # Returns
///
/// The serialized document, without indentation so that adjacent elements
/// stay adjacent in the text.
pub fn build_soap_request(
    session: Option<&str>,
    body_child: Element,
) -> Result<String, xmltree::Error> {
    let envelope = build_soap_envelope(session, body_child);
    write_element(&envelope, false)
}

pub fn write_element(element: &Element, pretty: bool) -> Result<String, xmltree::Error> {
    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(pretty)
        .indent_string("  ");
    element.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Re-indents a document for logging. Returns the input unchanged when it
/// is not well-formed.
pub fn format_xml(document: &str) -> String {
    match Element::parse(BufReader::new(document.as_bytes())) {
        Ok(root) => write_element(&root, true).unwrap_or_else(|_| document.to_string()),
        Err(_) => document.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_with_session() {
        let mut delete = api_element("delete");
        delete
            .children
            .push(XMLNode::Element(text_element("zns:type", "Product")));
        delete
            .children
            .push(XMLNode::Element(text_element("zns:ids", "abc123")));

        let xml = build_soap_request(Some("KEY"), delete).unwrap();

        assert!(xml.contains("xmlns:zns=\"http://api.zuora.com/\""));
        assert!(xml.contains("xmlns:ons=\"http://object.api.zuora.com/\""));
        assert!(xml.contains("<zns:SessionHeader><zns:session>KEY</zns:session></zns:SessionHeader>"));
        assert!(xml.contains("<zns:type>Product</zns:type><zns:ids>abc123</zns:ids>"));
    }

    #[test]
    fn test_build_request_without_session() {
        let xml = build_soap_request(None, api_element("login")).unwrap();

        assert!(!xml.contains("SessionHeader"));
        assert!(!xml.contains("env:Header"));
        assert!(xml.contains("env:Body"));
    }

    #[test]
    fn test_text_is_escaped() {
        let elem = text_element("ons:Name", "Fish & <Chips>");
        let xml = write_element(&elem, false).unwrap();
        assert!(xml.contains("Fish &amp; &lt;Chips>") || xml.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn test_format_xml_keeps_malformed_input() {
        assert_eq!(format_xml("<not closed"), "<not closed");
    }
}
