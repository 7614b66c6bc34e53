//! SOAP faults

use crate::parser::{child_text, find_child};
use crate::{SoapEnvelope, ns};
use xmltree::{Element, XMLNode};

/// A SOAP fault returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Fault code (e.g. "fns:INVALID_SESSION", "soapenv:Server")
    pub fault_code: String,

    /// Human readable description
    pub fault_string: String,

    /// Service-specific detail (`<detail><fns:XxxFault>...`)
    pub detail: Option<FaultDetail>,
}

/// Typed fault carried in the `detail` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultDetail {
    /// Name of the fault element (e.g. "LoginFault", "UnexpectedErrorFault")
    pub kind: String,

    /// Service error code (e.g. "INVALID_VALUE")
    pub code: Option<String>,

    /// Service error message
    pub message: Option<String>,
}

impl SoapFault {
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            detail: None,
        }
    }

    /// Most specific code available, without namespace prefix.
    pub fn code(&self) -> &str {
        self.detail
            .as_ref()
            .and_then(|d| d.code.as_deref())
            .unwrap_or_else(|| self.fault_code.rsplit(':').next().unwrap_or(&self.fault_code))
    }

    pub fn message(&self) -> &str {
        self.detail
            .as_ref()
            .and_then(|d| d.message.as_deref())
            .unwrap_or(&self.fault_string)
    }
}

/// Extracts the fault from an envelope whose body holds one.
///
/// Both shapes are understood: SOAP 1.1 (`faultcode`/`faultstring`/`detail`)
/// and SOAP 1.2 (`Code/Value`, `Reason/Text`, `Detail`).
pub fn extract_fault(envelope: &SoapEnvelope) -> Option<SoapFault> {
    let fault = find_child(&envelope.body.content, "Fault")?;

    // faultcode / Code
    let fault_code = child_text(fault, "faultcode")
        .or_else(|| find_child(fault, "Code").and_then(|c| child_text(c, "Value")))
        .unwrap_or_default();

    // faultstring / Reason
    let fault_string = child_text(fault, "faultstring")
        .or_else(|| find_child(fault, "Reason").and_then(|r| child_text(r, "Text")))
        .unwrap_or_default();

    // detail
    let detail = find_child(fault, "detail")
        .and_then(|d| d.children.iter().find_map(|n| n.as_element()))
        .map(|typed| FaultDetail {
            kind: typed.name.clone(),
            code: child_text(typed, "FaultCode"),
            message: child_text(typed, "FaultMessage"),
        });

    Some(SoapFault {
        fault_code,
        fault_string,
        detail,
    })
}

/// Builds a SOAP 1.1 fault document.
///
/// # Arguments
///
/// * `fault_code` - fault code (e.g. "fns:INVALID_SESSION")
/// * `fault_string` - description
/// * `detail` - optional `(kind, code, message)` rendered as a typed fault
///   in the fault namespace
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    detail: Option<(&str, &str, &str)>,
) -> Result<String, xmltree::Error> {
    let mut fault = Element::new("soapenv:Fault");

    let mut faultcode_elem = Element::new("faultcode");
    faultcode_elem
        .children
        .push(XMLNode::Text(fault_code.to_string()));
    fault.children.push(XMLNode::Element(faultcode_elem));

    let mut faultstring_elem = Element::new("faultstring");
    faultstring_elem
        .children
        .push(XMLNode::Text(fault_string.to_string()));
    fault.children.push(XMLNode::Element(faultstring_elem));

    if let Some((kind, code, message)) = detail {
        let mut typed = Element::new(&format!("fns:{kind}"));
        typed
            .attributes
            .insert("xmlns:fns".to_string(), ns::FAULT.to_string());

        let mut code_elem = Element::new("fns:FaultCode");
        code_elem.children.push(XMLNode::Text(code.to_string()));
        typed.children.push(XMLNode::Element(code_elem));

        let mut message_elem = Element::new("fns:FaultMessage");
        message_elem.children.push(XMLNode::Text(message.to_string()));
        typed.children.push(XMLNode::Element(message_elem));

        let mut detail_elem = Element::new("detail");
        detail_elem.children.push(XMLNode::Element(typed));
        fault.children.push(XMLNode::Element(detail_elem));
    }

    let mut body = Element::new("soapenv:Body");
    body.children.push(XMLNode::Element(fault));

    let mut envelope = Element::new("soapenv:Envelope");
    envelope
        .attributes
        .insert("xmlns:soapenv".to_string(), ns::ENVELOPE.to_string());
    envelope.children.push(XMLNode::Element(body));

    crate::write_element(&envelope, false)
}
