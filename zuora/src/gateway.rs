//! Request gateway: every remote call goes through [`Gateway::call`]

use crate::contract::Contract;
use crate::error::{RemoteFault, Result, ZuoraError};
use crate::instrumentation::{PayloadLogging, SERVICE, instrument};
use crate::result::check_fault;
use crate::session::SessionManager;
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;
use xmltree::Element;
use zuorasoap::{SoapEnvelope, build_soap_request, parse_soap_envelope};

pub struct Gateway {
    transport: Arc<dyn Transport>,
    contract: Box<dyn Contract>,
    sessions: SessionManager,
    last_request: Mutex<Option<String>>,
    logging: PayloadLogging,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        contract: Box<dyn Contract>,
        sessions: SessionManager,
        logging: PayloadLogging,
    ) -> Self {
        Self {
            transport,
            contract,
            sessions: sessions.with_logging(logging),
            last_request: Mutex::new(None),
            logging,
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn set_contract(&mut self, contract: Box<dyn Contract>) {
        self.contract = contract;
    }

    /// Document sent by the most recent call, shared by every caller of
    /// this gateway.
    pub fn last_request(&self) -> Option<String> {
        self.last_request.lock().clone()
    }

    /// Sends `body` (the operation element, e.g. `zns:create`) and returns the
    /// response envelope.
    ///
    /// Authenticates first when no reusable session exists. SOAP faults and
    /// transport failures come back as `ZuoraError::Transport`; an
    /// `INVALID_SESSION` fault also invalidates the session. Nothing is
    /// retried.
    pub fn call(&self, operation: &str, body: Element) -> Result<SoapEnvelope> {
        if !self.contract.supports(operation) {
            return Err(ZuoraError::UnknownOperation(operation.to_string()));
        }

        instrument(SERVICE, operation, || self.dispatch(operation, body))
    }

    fn dispatch(&self, operation: &str, body: Element) -> Result<SoapEnvelope> {
        let key = self.sessions.session_key(self.transport.as_ref())?;

        let document = build_soap_request(Some(&key), body)
            .map_err(|e| ZuoraError::Serialization(e.to_string()))?;
        *self.last_request.lock() = Some(document.clone());
        self.logging.outbound(operation, &document);

        let response = self.transport.send(operation, document.as_bytes())?;
        self.logging.inbound(operation, &response);

        let envelope = parse_soap_envelope(&response).map_err(|e| {
            RemoteFault::transport(format!("Unreadable {operation} response: {e}"))
        })?;

        if let Err(fault) = check_fault(&envelope) {
            if fault.is_invalid_session() {
                warn!("Zuora rejected the session key during {}", operation);
                self.sessions.invalidate();
            }
            return Err(fault.into());
        }

        Ok(envelope)
    }
}
