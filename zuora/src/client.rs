//! Client handle
//!
//! A [`Client`] owns one gateway (transport, contract, session) and is passed
//! explicitly to every persistence operation. Share it across threads with
//! an `Arc`; the session slot and the last-request capture are locked.

use crate::contract::{Contract, ZuoraContract};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::instrumentation::PayloadLogging;
use crate::result::response_element;
use crate::session::{Credentials, Session, SessionManager};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tracing::info;
use xmltree::Element;
use zuoraconfig::{ClientSettings, Config, PRODUCTION_ENDPOINT, SANDBOX_ENDPOINT};
use zuorasoap::{SoapEnvelope, api_element, child_text};

pub struct Client {
    gateway: Gateway,
}

/// Tenant and user behind the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub user_email: Option<String>,
}

impl Client {
    /// Client configured from the `zuora` section of `config`.
    ///
    /// # Errors
    ///
    /// `ZuoraError::Config` when credentials are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.client_settings()?))
    }

    /// Client talking HTTP to the endpoint selected by `settings`
    pub fn new(settings: ClientSettings) -> Self {
        let transport = Arc::new(HttpTransport::new(settings.endpoint(), settings.timeout));
        Self::with_transport(settings, transport)
    }

    /// Client using a caller-supplied transport. The transport is pointed at
    /// the endpoint selected by `settings`.
    pub fn with_transport(settings: ClientSettings, transport: Arc<dyn Transport>) -> Self {
        transport.set_endpoint(settings.endpoint());

        let sessions = SessionManager::new(
            Credentials::new(settings.username.clone(), settings.password.clone()),
            settings.session_lifetime,
            settings.reuse_authentication_token,
        );
        let logging = PayloadLogging::new(settings.logging, settings.pretty_print_xml);

        info!("Zuora client ready on {}", settings.endpoint());
        Self {
            gateway: Gateway::new(transport, Box::new(ZuoraContract), sessions, logging),
        }
    }

    /// Replaces the operation contract
    pub fn with_contract(mut self, contract: impl Contract + 'static) -> Self {
        self.gateway.set_contract(Box::new(contract));
        self
    }

    /// Switches to the sandbox endpoint. The current session is dropped;
    /// the next call logs in there with the same credentials.
    pub fn sandbox(&self) {
        self.switch_endpoint(SANDBOX_ENDPOINT);
    }

    /// Switches back to the production endpoint
    pub fn production(&self) {
        self.switch_endpoint(PRODUCTION_ENDPOINT);
    }

    fn switch_endpoint(&self, endpoint: &str) {
        info!("Switching Zuora endpoint to {}", endpoint);
        self.gateway.transport().set_endpoint(endpoint);
        self.gateway.sessions().invalidate();
    }

    pub fn endpoint(&self) -> String {
        self.gateway.transport().endpoint()
    }

    /// Sends one operation element and returns the response envelope.
    pub fn call(&self, operation: &str, body: Element) -> Result<SoapEnvelope> {
        self.gateway.call(operation, body)
    }

    /// Document transmitted by the most recent call
    pub fn last_request(&self) -> Option<String> {
        self.gateway.last_request()
    }

    /// Logs in now, replacing any current session.
    pub fn authenticate(&self) -> Result<Session> {
        self.gateway.sessions().authenticate(self.gateway.transport())
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway.sessions().is_authenticated()
    }

    pub fn session(&self) -> Option<Session> {
        self.gateway.sessions().current()
    }

    pub fn invalidate_session(&self) {
        self.gateway.sessions().invalidate();
    }

    pub fn set_reuse_authentication_token(&self, reuse: bool) {
        self.gateway.sessions().set_reuse_authentication_token(reuse);
    }

    /// Tenant and user of the current session (`getUserInfo`)
    pub fn user_info(&self) -> Result<UserInfo> {
        let envelope = self.call("getUserInfo", api_element("getUserInfo"))?;
        let response = response_element(&envelope, "getUserInfo")?;

        Ok(UserInfo {
            tenant_id: child_text(response, "TenantId"),
            tenant_name: child_text(response, "TenantName"),
            user_id: child_text(response, "UserId"),
            username: child_text(response, "Username"),
            user_email: child_text(response, "UserEmail"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZuoraError;

    #[test]
    fn test_from_config_selects_sandbox() {
        let config = Config::from_yaml_str(
            "zuora:\n  username: api@example.com\n  password: secret\n  sandbox: true\n",
        )
        .unwrap();
        let client = Client::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), SANDBOX_ENDPOINT);
        assert!(!client.is_authenticated());

        client.production();
        assert_eq!(client.endpoint(), PRODUCTION_ENDPOINT);
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config::from_yaml_str("zuora:\n  username: api@example.com\n").unwrap();
        assert!(matches!(
            Client::from_config(&config),
            Err(ZuoraError::Config(_))
        ));
    }
}
