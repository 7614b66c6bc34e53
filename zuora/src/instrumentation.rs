//! Call instrumentation and payload logging

use std::time::Instant;
use tracing::{debug, info_span};
use zuorasoap::format_xml;

/// Service name attached to every call span
pub const SERVICE: &str = "Zuora";

/// Runs `f` inside a `zuora.call` span and logs how long it took.
pub fn instrument<T>(service: &str, operation: &str, f: impl FnOnce() -> T) -> T {
    let span = info_span!("zuora.call", service = service, operation = operation);
    let _guard = span.enter();

    let started = Instant::now();
    let outcome = f();
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} call completed", operation
    );
    outcome
}

/// Debug logging of exchanged documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadLogging {
    pub enabled: bool,
    /// Indent documents before logging them
    pub pretty: bool,
}

impl PayloadLogging {
    pub fn new(enabled: bool, pretty: bool) -> Self {
        Self { enabled, pretty }
    }

    pub fn outbound(&self, operation: &str, document: &str) {
        if self.enabled {
            debug!(operation = operation, "SOAP request:\n{}", self.render(document));
        }
    }

    pub fn inbound(&self, operation: &str, document: &[u8]) {
        if self.enabled {
            let text = String::from_utf8_lossy(document);
            debug!(operation = operation, "SOAP response:\n{}", self.render(&text));
        }
    }

    fn render(&self, document: &str) -> String {
        let redacted = redact_password(document);
        if self.pretty {
            format_xml(&redacted)
        } else {
            redacted
        }
    }
}

/// Replaces the content of every `<password>` element (any prefix) by `***`.
pub fn redact_password(document: &str) -> String {
    const TAG: &str = "password>";

    let mut out = String::with_capacity(document.len());
    let mut rest = document;

    while let Some(pos) = rest.find(TAG) {
        let after = pos + TAG.len();
        let opening = rest[..pos].rfind('<').is_some_and(|start| {
            let prefix = &rest[start + 1..pos];
            !prefix.starts_with('/')
                && (prefix.is_empty() || prefix.ends_with(':'))
                && !prefix.contains(char::is_whitespace)
        });

        out.push_str(&rest[..after]);
        rest = &rest[after..];

        if opening {
            let Some(end) = rest.find('<') else {
                return out;
            };
            out.push_str("***");
            rest = &rest[end..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted() {
        let doc = "<zns:login><zns:username>joe</zns:username><zns:password>s3cret</zns:password></zns:login>";
        let redacted = redact_password(doc);
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("<zns:password>***</zns:password>"));
        assert!(redacted.contains("<zns:username>joe</zns:username>"));
    }

    #[test]
    fn test_unprefixed_and_absent() {
        assert_eq!(
            redact_password("<password>x</password>"),
            "<password>***</password>"
        );
        let doc = "<zns:query><zns:queryString>select Id from Product</zns:queryString></zns:query>";
        assert_eq!(redact_password(doc), doc);
    }

    #[test]
    fn test_instrument_returns_value() {
        let value = instrument(SERVICE, "query", || 42);
        assert_eq!(value, 42);
    }
}
