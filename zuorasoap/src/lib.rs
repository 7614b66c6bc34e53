//! # zuorasoap - SOAP envelopes for the Zuora API
//!
//! This crate knows how to build and read the XML documents exchanged with
//! the Zuora SOAP service. It performs no I/O: the `zuora` crate hands the
//! documents produced here to its transport.
//!
//! ## Features
//!
//! - Request envelopes with an optional `SessionHeader`
//! - Namespace-qualified element helpers (`zns:` for API elements,
//!   `ons:` for object fields)
//! - Envelope parsing with case-insensitive child lookup
//! - SOAP 1.1 and SOAP 1.2 fault extraction
//!
//! ## Example
//!
//! ```
//! use zuorasoap::{api_element, build_soap_request, parse_soap_envelope, text_element};
//!
//! let mut query = api_element("query");
//! query.children.push(xmltree::XMLNode::Element(text_element(
//!     "zns:queryString",
//!     "select Id from Product",
//! )));
//!
//! let xml = build_soap_request(Some("session-key"), query).unwrap();
//! assert!(xml.contains("<zns:queryString>select Id from Product</zns:queryString>"));
//!
//! let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
//! assert_eq!(envelope.body.first_element().unwrap().name, "query");
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{
    api_element, build_soap_envelope, build_soap_request, format_xml, object_element,
    text_element, write_element,
};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{FaultDetail, SoapFault, build_soap_fault, extract_fault};
pub use parser::{
    SoapParseError, child_text, children_named, find_child, parse_soap_envelope,
};

/// Namespace URIs and the prefixes used for them in outbound documents.
pub mod ns {
    pub const ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
    pub const API: &str = "http://api.zuora.com/";
    pub const OBJECT: &str = "http://object.api.zuora.com/";
    pub const FAULT: &str = "http://fault.api.zuora.com/";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

    pub const ENVELOPE_PREFIX: &str = "env";
    pub const API_PREFIX: &str = "zns";
    pub const OBJECT_PREFIX: &str = "ons";
}

/// Fault codes reported by the service that the client reacts to.
pub mod fault_codes {
    /// The session header is missing, expired or unknown.
    pub const INVALID_SESSION: &str = "INVALID_SESSION";

    /// Username/password rejected by `login`.
    pub const INVALID_LOGIN: &str = "INVALID_LOGIN";

    /// Malformed query string.
    pub const MALFORMED_QUERY: &str = "MALFORMED_QUERY";

    /// Catch-all used by the service for unexpected conditions.
    pub const UNKNOWN: &str = "UNKNOWN";
}
