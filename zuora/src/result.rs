//! Translation of responses into typed outcomes
//!
//! Two families of failure are kept apart:
//! - protocol faults (SOAP `Fault`, unreadable body) are escalated as
//!   [`ZuoraError::Transport`] by the gateway;
//! - business-rule rejections (`<Success>false</Success>` with `<Errors>`)
//!   are ordinary values: [`OperationResult`] / [`AmendResult`] with
//!   `success == false`.

use crate::attributes::coerce;
use crate::error::{RemoteFault, Result, ZuoraError};
use rust_decimal::Decimal;
use xmltree::Element;
use zuorasoap::{SoapEnvelope, child_text, children_named, extract_fault, find_child};

/// One error reported by the service for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultError {
    /// Error category (`INVALID_VALUE`, `MISSING_REQUIRED_VALUE`, ...)
    pub code: Option<String>,
    pub message: String,
    /// Offending field, from `<Field>` or parsed out of the message
    pub field: Option<String>,
}

impl ResultError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let field = field_from_message(&message);
        Self {
            code,
            message,
            field,
        }
    }

    fn from_element(elem: &Element) -> Self {
        let mut error = Self::new(
            child_text(elem, "Code"),
            child_text(elem, "Message").unwrap_or_default(),
        );
        if let Some(field) = child_text(elem, "Field") {
            error.field = Some(field);
        }
        error
    }
}

/// Extracts `X` from messages like "Invalid value for field X: Y".
fn field_from_message(message: &str) -> Option<String> {
    const MARKER: &str = "for field ";
    let start = message.find(MARKER)? + MARKER.len();
    let field: String = message[start..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect();
    Some(field).filter(|f| !f.is_empty())
}

fn is_true(elem: &Element, local: &str) -> bool {
    child_text(elem, local).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn collect_errors(elem: &Element) -> Vec<ResultError> {
    children_named(elem, "Errors")
        .map(ResultError::from_element)
        .collect()
}

/// Outcome of one item of a `create`, `update` or `delete` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    /// Identifier assigned or affected by the call
    pub id: Option<String>,
    pub errors: Vec<ResultError>,
}

impl OperationResult {
    pub fn from_element(elem: &Element) -> Self {
        Self {
            success: is_true(elem, "Success"),
            id: child_text(elem, "Id"),
            errors: collect_errors(elem),
        }
    }

    /// All error messages joined with "; "
    pub fn message(&self) -> String {
        join_messages(&self.errors)
    }
}

fn join_messages(errors: &[ResultError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Normalized view of a list of per-item results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every item succeeded
    Success(Vec<OperationResult>),
    /// Every item failed; code and message of the first error
    Failure {
        code: Option<String>,
        message: String,
        results: Vec<OperationResult>,
    },
    /// Mixed per-item successes and failures
    Partial(Vec<OperationResult>),
}

impl Outcome {
    pub fn from_results(results: Vec<OperationResult>) -> Self {
        let failed = results.iter().filter(|r| !r.success).count();
        if failed == 0 {
            Outcome::Success(results)
        } else if failed == results.len() {
            let first = results.iter().flat_map(|r| r.errors.iter()).next();
            Outcome::Failure {
                code: first.and_then(|e| e.code.clone()),
                message: first.map(|e| e.message.clone()).unwrap_or_default(),
                results,
            }
        } else {
            Outcome::Partial(results)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn results(&self) -> &[OperationResult] {
        match self {
            Outcome::Success(results)
            | Outcome::Partial(results)
            | Outcome::Failure { results, .. } => results,
        }
    }
}

/// Escalates a SOAP fault carried by the envelope.
pub fn check_fault(envelope: &SoapEnvelope) -> std::result::Result<(), RemoteFault> {
    match extract_fault(envelope) {
        Some(fault) => Err(RemoteFault::from(fault)),
        None => Ok(()),
    }
}

/// The `<operation>Response` element of the body.
pub fn response_element<'a>(envelope: &'a SoapEnvelope, operation: &str) -> Result<&'a Element> {
    check_fault(envelope)?;
    let name = format!("{operation}Response");
    find_child(&envelope.body.content, &name)
        .ok_or_else(|| ZuoraError::malformed(format!("missing {name} element in SOAP body")))
}

/// Per-item results of a `create`, `update` or `delete` response.
pub fn operation_results(envelope: &SoapEnvelope, operation: &str) -> Result<Vec<OperationResult>> {
    let response = response_element(envelope, operation)?;
    let results: Vec<OperationResult> = response
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(|e| e.name.eq_ignore_ascii_case("result") || e.name.eq_ignore_ascii_case("results"))
        .map(OperationResult::from_element)
        .collect();

    if results.is_empty() {
        return Err(ZuoraError::malformed(format!(
            "{operation}Response carries no result"
        )));
    }
    Ok(results)
}

/// One page of a `query`/`queryMore` response
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub done: bool,
    /// Cursor for `queryMore` when `done` is false
    pub query_locator: Option<String>,
    pub size: usize,
    pub records: Vec<Element>,
}

pub fn query_result(envelope: &SoapEnvelope, operation: &str) -> Result<QueryResult> {
    let response = response_element(envelope, operation)?;
    let result = find_child(response, "result")
        .ok_or_else(|| ZuoraError::malformed(format!("{operation}Response carries no result")))?;

    let records: Vec<Element> = children_named(result, "records").cloned().collect();
    let size = match child_text(result, "size") {
        Some(raw) => coerce::<i64>("size", &raw)?.max(0) as usize,
        None => records.len(),
    };

    Ok(QueryResult {
        done: child_text(result, "done").is_none_or(|v| v.eq_ignore_ascii_case("true")),
        query_locator: child_text(result, "queryLocator"),
        size,
        records,
    })
}

/// Outcome of one amend request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmendResult {
    pub success: bool,
    pub amendment_ids: Vec<String>,
    pub invoice_id: Option<String>,
    pub payment_transaction_number: Option<String>,
    pub total_delta_mrr: Option<Decimal>,
    pub total_delta_tcv: Option<Decimal>,
    pub errors: Vec<ResultError>,
}

impl AmendResult {
    pub fn from_element(elem: &Element) -> Result<Self> {
        let decimal = |local: &str| -> Result<Option<Decimal>> {
            child_text(elem, local)
                .map(|raw| coerce::<Decimal>(local, &raw))
                .transpose()
        };

        Ok(Self {
            success: is_true(elem, "Success"),
            amendment_ids: children_named(elem, "AmendmentIds")
                .filter_map(|e| e.get_text().map(|t| t.trim().to_string()))
                .filter(|t| !t.is_empty())
                .collect(),
            invoice_id: child_text(elem, "InvoiceId"),
            payment_transaction_number: child_text(elem, "PaymentTransactionNumber"),
            total_delta_mrr: decimal("TotalDeltaMrr")?,
            total_delta_tcv: decimal("TotalDeltaTcv")?,
            errors: collect_errors(elem),
        })
    }

    /// All error messages joined with "; "
    pub fn message(&self) -> String {
        join_messages(&self.errors)
    }
}

/// Results of an `amend` response, one per amend request.
pub fn amend_results(envelope: &SoapEnvelope) -> Result<Vec<AmendResult>> {
    let response = response_element(envelope, "amend")?;
    let results = children_named(response, "results")
        .map(AmendResult::from_element)
        .collect::<Result<Vec<_>>>()?;

    if results.is_empty() {
        return Err(ZuoraError::malformed("amendResponse carries no results"));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zuorasoap::parse_soap_envelope;

    fn envelope(body: &str) -> SoapEnvelope {
        let xml = format!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="http://api.zuora.com/" xmlns:ns2="http://object.api.zuora.com/"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
        );
        parse_soap_envelope(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_field_extracted_from_message() {
        let error = ResultError::new(
            Some("INVALID_VALUE".into()),
            "Invalid value for field SubscriptionId: 2c92c0f93a569878013a6778f0446b11",
        );
        assert_eq!(error.field.as_deref(), Some("SubscriptionId"));

        let plain = ResultError::new(None, "Something went wrong");
        assert_eq!(plain.field, None);
    }

    #[test]
    fn test_mixed_batch_results() {
        let env = envelope(
            r#"<ns1:createResponse>
<ns1:result><ns1:Id>A</ns1:Id><ns1:Success>true</ns1:Success></ns1:result>
<ns1:result><ns1:Errors><ns1:Code>MISSING_REQUIRED_VALUE</ns1:Code><ns1:Message>Missing required value: Name</ns1:Message><ns1:Field>Name</ns1:Field></ns1:Errors><ns1:Success>false</ns1:Success></ns1:result>
</ns1:createResponse>"#,
        );

        let results = operation_results(&env, "create").unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(results[0].id.as_deref(), Some("A"));
        assert!(!results[1].success);
        assert_eq!(results[1].errors[0].field.as_deref(), Some("Name"));

        let outcome = Outcome::from_results(results);
        assert!(matches!(outcome, Outcome::Partial(_)));
        assert_eq!(outcome.results().len(), 2);
    }

    #[test]
    fn test_all_failed_is_failure() {
        let outcome = Outcome::from_results(vec![OperationResult {
            success: false,
            id: None,
            errors: vec![ResultError::new(Some("INVALID_VALUE".into()), "bad")],
        }]);
        match outcome {
            Outcome::Failure { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("INVALID_VALUE"));
                assert_eq!(message, "bad");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_delete_response_lowercase_elements() {
        let env = envelope(
            r#"<ns1:deleteResponse><ns1:result><ns1:id>X</ns1:id><ns1:success>true</ns1:success></ns1:result></ns1:deleteResponse>"#,
        );
        let results = operation_results(&env, "delete").unwrap();
        assert!(results[0].success);
        assert_eq!(results[0].id.as_deref(), Some("X"));
    }

    #[test]
    fn test_missing_response_element_is_malformed() {
        let env = envelope("<ns1:somethingElse/>");
        let err = operation_results(&env, "create").unwrap_err();
        assert!(matches!(err, ZuoraError::MalformedResponse(_)));
    }

    #[test]
    fn test_fault_is_escalated() {
        let env = envelope(
            "<soapenv:Fault><faultcode>fns:INVALID_SESSION</faultcode><faultstring>invalid session</faultstring></soapenv:Fault>",
        );
        let err = operation_results(&env, "create").unwrap_err();
        assert!(err.is_invalid_session());
    }

    #[test]
    fn test_query_page() {
        let env = envelope(
            r#"<ns1:queryResponse><ns1:result><ns1:done>false</ns1:done><ns1:queryLocator>LOC-1</ns1:queryLocator>
<ns1:records xsi:type="ns2:Product" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><ns2:Id>P1</ns2:Id></ns1:records>
<ns1:size>3</ns1:size></ns1:result></ns1:queryResponse>"#,
        );
        let page = query_result(&env, "query").unwrap();
        assert!(!page.done);
        assert_eq!(page.query_locator.as_deref(), Some("LOC-1"));
        assert_eq!(page.size, 3);
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_amend_failure_keeps_message() {
        let env = envelope(
            r#"<ns1:amendResponse><ns1:results><ns1:Errors><ns1:Code>INVALID_VALUE</ns1:Code><ns1:Message>Invalid value for field SubscriptionId: 2c92c0f93a569878013a6778f0446b11</ns1:Message></ns1:Errors><ns1:Success>false</ns1:Success></ns1:results></ns1:amendResponse>"#,
        );
        let results = amend_results(&env).unwrap();
        assert!(!results[0].success);
        assert!(results[0]
            .message()
            .contains("Invalid value for field SubscriptionId: 2c92c0f93a569878013a6778f0446b11"));
    }
}
