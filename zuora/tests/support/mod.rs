//! Scripted transport and canned responses shared by the integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use zuora::{Client, RemoteFault, Transport};
use zuoraconfig::ClientSettings;

pub const SESSION_KEY: &str = "4028e4873491cc770134972e75746e4c";

/// One recorded call
#[derive(Debug, Clone)]
pub struct Exchange {
    pub endpoint: String,
    pub operation: String,
    pub document: String,
}

enum Reply {
    Body(String),
    Fault(RemoteFault),
}

/// In-memory transport: replays queued replies in order and records every
/// document it receives.
pub struct ScriptedTransport {
    endpoint: Mutex<String>,
    replies: Mutex<VecDeque<Reply>>,
    exchanges: Mutex<Vec<Exchange>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            endpoint: Mutex::new(String::new()),
            replies: Mutex::new(VecDeque::new()),
            exchanges: Mutex::new(Vec::new()),
        })
    }

    /// Queues a response document
    pub fn respond(&self, body: impl Into<String>) {
        self.replies.lock().push_back(Reply::Body(body.into()));
    }

    /// Queues a connectivity failure
    pub fn fail(&self, fault: RemoteFault) {
        self.replies.lock().push_back(Reply::Fault(fault));
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.exchanges
            .lock()
            .iter()
            .map(|e| e.operation.clone())
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.exchanges
            .lock()
            .iter()
            .filter(|e| e.operation == operation)
            .count()
    }

    pub fn last_document(&self, operation: &str) -> Option<String> {
        self.exchanges
            .lock()
            .iter()
            .rev()
            .find(|e| e.operation == operation)
            .map(|e| e.document.clone())
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, operation: &str, document: &[u8]) -> Result<Vec<u8>, RemoteFault> {
        self.exchanges.lock().push(Exchange {
            endpoint: self.endpoint(),
            operation: operation.to_string(),
            document: String::from_utf8_lossy(document).into_owned(),
        });

        match self.replies.lock().pop_front() {
            Some(Reply::Body(body)) => Ok(body.into_bytes()),
            Some(Reply::Fault(fault)) => Err(fault),
            None => Err(RemoteFault::transport(format!(
                "no scripted response for {operation}"
            ))),
        }
    }

    fn set_endpoint(&self, endpoint: &str) {
        *self.endpoint.lock() = endpoint.to_string();
    }

    fn endpoint(&self) -> String {
        self.endpoint.lock().clone()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn settings() -> ClientSettings {
    let mut settings = ClientSettings::new("api@example.com", "s3cret");
    settings.logging = true;
    settings
}

pub fn client_with(settings: ClientSettings) -> (Arc<ScriptedTransport>, Client) {
    init_tracing();
    let transport = ScriptedTransport::new();
    let client = Client::with_transport(settings, transport.clone());
    (transport, client)
}

pub fn client() -> (Arc<ScriptedTransport>, Client) {
    client_with(settings())
}

/// Client whose first reply is a successful login
pub fn logged_in_client() -> (Arc<ScriptedTransport>, Client) {
    let (transport, client) = client();
    transport.respond(fixtures::login(SESSION_KEY, None));
    (transport, client)
}

pub mod fixtures {
    pub fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="http://api.zuora.com/" xmlns:ns2="http://object.api.zuora.com/" xmlns:ons="http://object.api.zuora.com/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
        )
    }

    pub fn login(session: &str, server_url: Option<&str>) -> String {
        let server_url = server_url
            .map(|url| format!("<ns1:ServerUrl>{url}</ns1:ServerUrl>"))
            .unwrap_or_default();
        envelope(&format!(
            "<ns1:loginResponse><ns1:result>{server_url}<ns1:Session>{session}</ns1:Session></ns1:result></ns1:loginResponse>"
        ))
    }

    pub fn fault(code: &str, message: &str) -> String {
        envelope(&format!(
            r#"<soapenv:Fault><faultcode>fns:{code}</faultcode><faultstring>{message}</faultstring><detail><fns:UnexpectedErrorFault xmlns:fns="http://fault.api.zuora.com/"><fns:FaultCode>{code}</fns:FaultCode><fns:FaultMessage>{message}</fns:FaultMessage></fns:UnexpectedErrorFault></detail></soapenv:Fault>"#
        ))
    }

    fn save_success(operation: &str, id: &str) -> String {
        envelope(&format!(
            "<ns1:{operation}Response><ns1:result><ns1:Id>{id}</ns1:Id><ns1:Success>true</ns1:Success></ns1:result></ns1:{operation}Response>"
        ))
    }

    pub fn create_success(id: &str) -> String {
        save_success("create", id)
    }

    pub fn update_success(id: &str) -> String {
        save_success("update", id)
    }

    pub fn create_results(results: &[Result<&str, &str>]) -> String {
        let items: String = results
            .iter()
            .map(|r| match r {
                Ok(id) => format!(
                    "<ns1:result><ns1:Id>{id}</ns1:Id><ns1:Success>true</ns1:Success></ns1:result>"
                ),
                Err(message) => format!(
                    "<ns1:result><ns1:Errors><ns1:Code>INVALID_VALUE</ns1:Code><ns1:Message>{message}</ns1:Message></ns1:Errors><ns1:Success>false</ns1:Success></ns1:result>"
                ),
            })
            .collect();
        envelope(&format!("<ns1:createResponse>{items}</ns1:createResponse>"))
    }

    pub fn save_failure(operation: &str, code: &str, message: &str) -> String {
        envelope(&format!(
            "<ns1:{operation}Response><ns1:result><ns1:Errors><ns1:Code>{code}</ns1:Code><ns1:Message>{message}</ns1:Message></ns1:Errors><ns1:Success>false</ns1:Success></ns1:result></ns1:{operation}Response>"
        ))
    }

    pub fn delete_success(id: &str) -> String {
        envelope(&format!(
            "<ns1:deleteResponse><ns1:result><ns1:id>{id}</ns1:id><ns1:success>true</ns1:success></ns1:result></ns1:deleteResponse>"
        ))
    }

    /// `record` is the inner content of one `records` element
    pub fn record(object_type: &str, content: &str) -> String {
        format!(r#"<ns1:records xsi:type="ns2:{object_type}">{content}</ns1:records>"#)
    }

    pub fn query_page(operation: &str, records: &[String], locator: Option<&str>) -> String {
        let done = locator.is_none();
        let locator = locator
            .map(|l| format!("<ns1:queryLocator>{l}</ns1:queryLocator>"))
            .unwrap_or_default();
        envelope(&format!(
            "<ns1:{operation}Response><ns1:result><ns1:done>{done}</ns1:done>{locator}{}<ns1:size>{}</ns1:size></ns1:result></ns1:{operation}Response>",
            records.concat(),
            records.len()
        ))
    }

    pub fn query(records: &[String]) -> String {
        query_page("query", records, None)
    }

    pub fn product_rate_plan_charge_tiers(charge_id: &str) -> String {
        query(&[
            record(
                "ProductRatePlanChargeTier",
                &format!("<ns2:Currency>USD</ns2:Currency><ns2:EndingUnit>10</ns2:EndingUnit><ns2:Id>4028e48834aa10a30134aaf7f40b313a</ns2:Id><ns2:Price>0</ns2:Price><ns2:ProductRatePlanChargeId>{charge_id}</ns2:ProductRatePlanChargeId><ns2:StartingUnit>0</ns2:StartingUnit><ns2:Tier>1</ns2:Tier>"),
            ),
            record(
                "ProductRatePlanChargeTier",
                &format!("<ns2:Currency>USD</ns2:Currency><ns2:EndingUnit>20</ns2:EndingUnit><ns2:Id>4028e48834aa10a30134aaf7f40b313b</ns2:Id><ns2:Price>50</ns2:Price><ns2:ProductRatePlanChargeId>{charge_id}</ns2:ProductRatePlanChargeId><ns2:StartingUnit>11</ns2:StartingUnit><ns2:Tier>2</ns2:Tier>"),
            ),
        ])
    }

    pub fn amend_success() -> String {
        envelope(
            "<ns1:amendResponse><ns1:results><ns1:AmendmentIds>4028e4873491cc7701349734bfc16f1a</ns1:AmendmentIds><ns1:Success>true</ns1:Success><ns1:TotalDeltaMrr>0</ns1:TotalDeltaMrr><ns1:TotalDeltaTcv>0</ns1:TotalDeltaTcv></ns1:results></ns1:amendResponse>",
        )
    }

    pub fn amend_failure(message: &str) -> String {
        envelope(&format!(
            "<ns1:amendResponse><ns1:results><ns1:Errors><ns1:Code>INVALID_VALUE</ns1:Code><ns1:Message>{message}</ns1:Message></ns1:Errors><ns1:Success>false</ns1:Success></ns1:results></ns1:amendResponse>"
        ))
    }
}
