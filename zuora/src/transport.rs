//! Transport collaborator: moves documents to and from the service

use crate::error::RemoteFault;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

/// Upper bound on response bodies read into memory
const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Sends one document for one operation and returns the response document.
///
/// Implementations report every failure as a [`RemoteFault`]; their own
/// error types never escape.
pub trait Transport: Send + Sync {
    fn send(&self, operation: &str, document: &[u8]) -> Result<Vec<u8>, RemoteFault>;

    /// Re-points later calls at another endpoint
    fn set_endpoint(&self, endpoint: &str);

    fn endpoint(&self) -> String;
}

/// Blocking HTTP transport
pub struct HttpTransport {
    agent: Agent,
    endpoint: RwLock<String>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        // SOAP faults come back as HTTP 500 with a readable body.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            endpoint: RwLock::new(endpoint.into()),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, operation: &str, document: &[u8]) -> Result<Vec<u8>, RemoteFault> {
        let url = self.endpoint();
        debug!("POST {} ({} bytes) to {}", operation, document.len(), url);

        let mut response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", &format!(r#""{}""#, operation))
            .send(document)
            .map_err(|e| {
                RemoteFault::transport(format!("HTTP error when sending {operation} to {url}: {e}"))
            })?;

        let status = response.status();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(|e| {
                RemoteFault::transport(format!("Failed to read {operation} response body: {e}"))
            })?;

        if !status.is_success() && !looks_like_soap(&body) {
            warn!("{} returned HTTP {} without a SOAP body", url, status);
            return Err(RemoteFault::transport(format!(
                "HTTP {status} from {url}"
            )));
        }

        Ok(body)
    }

    fn set_endpoint(&self, endpoint: &str) {
        *self.endpoint.write() = endpoint.to_string();
    }

    fn endpoint(&self) -> String {
        self.endpoint.read().clone()
    }
}

fn looks_like_soap(body: &[u8]) -> bool {
    String::from_utf8_lossy(body).contains("Envelope")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_can_be_switched() {
        let transport = HttpTransport::new("https://example.invalid/a", Duration::from_secs(5));
        assert_eq!(transport.endpoint(), "https://example.invalid/a");

        transport.set_endpoint("https://example.invalid/b");
        assert_eq!(transport.endpoint(), "https://example.invalid/b");
    }

    #[test]
    fn test_soap_sniffing() {
        assert!(looks_like_soap(b"<soapenv:Envelope/>"));
        assert!(!looks_like_soap(b"<html>Bad Gateway</html>"));
    }
}
