//! SOAP envelope structures

use xmltree::Element;

/// A parsed SOAP envelope
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// Optional SOAP header
    pub header: Option<SoapHeader>,

    /// SOAP body carrying the operation response or a fault
    pub body: SoapBody,
}

/// SOAP header
#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Raw header element
    pub content: Element,
}

/// SOAP body
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Raw body element
    pub content: Element,
}

impl SoapEnvelope {
    pub fn new(body: SoapBody) -> Self {
        Self { header: None, body }
    }

    pub fn with_header(header: SoapHeader, body: SoapBody) -> Self {
        Self {
            header: Some(header),
            body,
        }
    }
}

impl SoapBody {
    /// First element inside the body: the operation, its response, or a fault.
    pub fn first_element(&self) -> Option<&Element> {
        self.content.children.iter().find_map(|n| n.as_element())
    }
}
