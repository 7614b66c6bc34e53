//! Session management
//!
//! One [`SessionManager`] per client holds at most one [`Session`]. The slot
//! stays locked for the whole login exchange, so concurrent callers that
//! find no usable session wait for a single login instead of racing.

use crate::error::{Result, ZuoraError};
use crate::instrumentation::PayloadLogging;
use crate::result::{check_fault, response_element};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, build_soap_request, child_text, find_child, parse_soap_envelope, text_element};

/// One authenticated connection
#[derive(Debug, Clone)]
pub struct Session {
    key: String,
    server_url: Option<String>,
    issued_at: Instant,
    lifetime: Duration,
    active: bool,
}

impl Session {
    pub fn new(key: impl Into<String>, server_url: Option<String>, lifetime: Duration) -> Self {
        Self {
            key: key.into(),
            server_url,
            issued_at: Instant::now(),
            lifetime,
            active: true,
        }
    }

    /// Builds a session from the `loginResponse` element.
    ///
    /// # Errors
    ///
    /// `ZuoraError::Authentication` when the response carries no session key.
    pub fn from_login_response(response: &Element, lifetime: Duration) -> Result<Self> {
        let result = find_child(response, "result").unwrap_or(response);
        let key = child_text(result, "Session").ok_or_else(|| {
            ZuoraError::Authentication("login response carries no session token".to_string())
        })?;
        Ok(Self::new(key, child_text(result, "ServerUrl"), lifetime))
    }

    /// Opaque session token sent in the `SessionHeader`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Endpoint the service asked later calls to use
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// False once invalidated or older than its lifetime
    pub fn is_active(&self) -> bool {
        self.active && self.issued_at.elapsed() < self.lifetime
    }

    pub fn invalidate(&mut self) {
        self.active = false;
    }
}

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The `login` request body. The service requires `username` before `password`.
pub fn build_login_request(credentials: &Credentials) -> Element {
    let mut login = api_element("login");
    login.children.push(XMLNode::Element(text_element(
        "zns:username",
        credentials.username.as_str(),
    )));
    login.children.push(XMLNode::Element(text_element(
        "zns:password",
        credentials.password.as_str(),
    )));
    login
}

/// Obtains and retains the client's session
pub struct SessionManager {
    credentials: Credentials,
    lifetime: Duration,
    reuse: AtomicBool,
    slot: Mutex<Option<Session>>,
    logging: PayloadLogging,
}

impl SessionManager {
    pub fn new(credentials: Credentials, lifetime: Duration, reuse: bool) -> Self {
        Self {
            credentials,
            lifetime,
            reuse: AtomicBool::new(reuse),
            slot: Mutex::new(None),
            logging: PayloadLogging::default(),
        }
    }

    pub fn with_logging(mut self, logging: PayloadLogging) -> Self {
        self.logging = logging;
        self
    }

    pub fn reuse_authentication_token(&self) -> bool {
        self.reuse.load(Ordering::Relaxed)
    }

    /// Read on every call; disabling it forces a login per operation
    pub fn set_reuse_authentication_token(&self, reuse: bool) {
        self.reuse.store(reuse, Ordering::Relaxed);
    }

    /// True when reuse is enabled and an active session exists
    pub fn is_authenticated(&self) -> bool {
        self.reuse_authentication_token() && self.slot.lock().as_ref().is_some_and(Session::is_active)
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.slot.lock().clone()
    }

    /// Logs in unconditionally and stores the new session.
    pub fn authenticate(&self, transport: &dyn Transport) -> Result<Session> {
        let mut slot = self.slot.lock();
        let session = self.login(transport)?;
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Key to attach to the next call, logging in first when no reusable
    /// session exists.
    pub fn session_key(&self, transport: &dyn Transport) -> Result<String> {
        let mut slot = self.slot.lock();

        if self.reuse_authentication_token() {
            if let Some(session) = slot.as_ref().filter(|s| s.is_active()) {
                return Ok(session.key.clone());
            }
        }

        let session = self.login(transport)?;
        let key = session.key.clone();
        *slot = Some(session);
        Ok(key)
    }

    /// Drops the current session; the next call logs in again.
    pub fn invalidate(&self) {
        if let Some(session) = self.slot.lock().as_mut() {
            debug!("Invalidating Zuora session");
            session.invalidate();
        }
    }

    fn login(&self, transport: &dyn Transport) -> Result<Session> {
        info!("Logging in to Zuora as {}", self.credentials.username);

        let document = build_soap_request(None, build_login_request(&self.credentials))
            .map_err(|e| ZuoraError::Serialization(e.to_string()))?;
        self.logging.outbound("login", &document);

        let response = transport.send("login", document.as_bytes())?;
        self.logging.inbound("login", &response);

        let envelope = parse_soap_envelope(&response)
            .map_err(|e| ZuoraError::Authentication(format!("unreadable login response: {e}")))?;
        check_fault(&envelope).map_err(|fault| ZuoraError::Authentication(fault.to_string()))?;

        let response = response_element(&envelope, "login").map_err(|_| {
            ZuoraError::Authentication("login response carries no loginResponse".to_string())
        })?;
        let session = Session::from_login_response(response, self.lifetime)?;

        if let Some(url) = session.server_url() {
            if url != transport.endpoint() {
                debug!("Zuora asked to continue on {}", url);
                transport.set_endpoint(url);
            }
        }

        debug!("Login successful");
        Ok(session)
    }
}
