use super::Amendment;
use crate::associations::nested_element;
use crate::attributes::WireValue;
use crate::client::Client;
use crate::error::Result;
use crate::persistence::Submittable;
use crate::result::{AmendResult, amend_results};
use crate::validation::{Validatable, ValidationErrors};
use chrono::NaiveDate;
use tracing::info;
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, text_element};

/// Behaviour flags of an amend call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmendOptions {
    pub generate_invoice: Option<bool>,
    pub process_payments: Option<bool>,
    pub apply_credit_balance: Option<bool>,
    pub invoice_target_date: Option<NaiveDate>,
}

/// Preview settings of an amend call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewOptions {
    pub enable_preview_mode: Option<bool>,
    pub number_of_periods: Option<i64>,
    pub preview_through_term_end: Option<bool>,
}

/// `zns:<name>` holding one `zns:` child per set option
fn option_bag(name: &str, options: &[(&str, Option<String>)]) -> Element {
    let mut bag = api_element(name);
    for (field, value) in options {
        if let Some(value) = value {
            bag.children.push(XMLNode::Element(text_element(
                &format!("zns:{field}"),
                value.as_str(),
            )));
        }
    }
    bag
}

impl AmendOptions {
    fn to_element(&self) -> Element {
        option_bag(
            "AmendOptions",
            &[
                ("GenerateInvoice", self.generate_invoice.map(|v| v.to_wire())),
                ("ProcessPayments", self.process_payments.map(|v| v.to_wire())),
                ("ApplyCreditBalance", self.apply_credit_balance.map(|v| v.to_wire())),
                ("InvoiceTargetDate", self.invoice_target_date.map(|v| v.to_wire())),
            ],
        )
    }
}

impl PreviewOptions {
    fn to_element(&self) -> Element {
        option_bag(
            "PreviewOptions",
            &[
                ("EnablePreviewMode", self.enable_preview_mode.map(|v| v.to_wire())),
                ("NumberOfPeriods", self.number_of_periods.map(|v| v.to_wire())),
                (
                    "PreviewThroughTermEnd",
                    self.preview_through_term_end.map(|v| v.to_wire()),
                ),
            ],
        )
    }
}

/// Composite `amend` call: amendments plus option bags.
///
/// Only [`Submittable`]: it is built, sent once and answered with one
/// [`AmendResult`] per request. It cannot be updated, destroyed or found.
#[derive(Debug, Clone, Default)]
pub struct AmendRequest {
    pub amendments: Vec<Amendment>,
    pub amend_options: Option<AmendOptions>,
    pub preview_options: Option<PreviewOptions>,
}

impl AmendRequest {
    pub fn new(amendments: Vec<Amendment>) -> Self {
        Self {
            amendments,
            ..Self::default()
        }
    }

    /// `zns:amend` body
    pub fn to_element(&self) -> Element {
        let mut requests = api_element("requests");
        for amendment in &self.amendments {
            let mut elem = nested_element(amendment);
            elem.name = "zns:Amendments".to_string();
            requests.children.push(XMLNode::Element(elem));
        }
        if let Some(options) = &self.amend_options {
            requests.children.push(XMLNode::Element(options.to_element()));
        }
        if let Some(options) = &self.preview_options {
            requests.children.push(XMLNode::Element(options.to_element()));
        }

        let mut amend = api_element("amend");
        amend.children.push(XMLNode::Element(requests));
        amend
    }
}

impl Validatable for AmendRequest {
    fn validate(&self, errors: &mut ValidationErrors) {
        if self.amendments.is_empty() {
            errors.add("amendments", "must contain at least one amendment");
        }
        for (index, amendment) in self.amendments.iter().enumerate() {
            errors.merge_nested(&format!("amendments[{index}]"), amendment.validation_errors());
        }
    }
}

impl Submittable for AmendRequest {
    type Output = Vec<AmendResult>;

    fn create(&self, client: &Client) -> Result<Vec<AmendResult>> {
        self.validation_errors().into_result()?;

        info!("Submitting {} amendment(s)", self.amendments.len());
        let envelope = client.call("amend", self.to_element())?;
        amend_results(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::enums::AmendmentType;
    use zuorasoap::write_element;

    fn amendment() -> Amendment {
        Amendment::build(|a| {
            a.name = Some("Example Amendment 1".into());
            a.subscription_id = Some("4028e4873491cc770134972e75746e4c".into());
            a.amendment_type = Some(AmendmentType::NewProduct);
            a.contract_effective_date = NaiveDate::from_ymd_opt(2012, 1, 1);
        })
    }

    #[test]
    fn test_option_bags_follow_amendments() {
        let mut request = AmendRequest::new(vec![amendment()]);
        request.amend_options = Some(AmendOptions {
            generate_invoice: Some(true),
            process_payments: Some(true),
            ..AmendOptions::default()
        });
        request.preview_options = Some(PreviewOptions {
            enable_preview_mode: Some(true),
            number_of_periods: Some(1),
            ..PreviewOptions::default()
        });

        let xml = write_element(&request.to_element(), false).unwrap();
        assert!(xml.contains("<zns:amend><zns:requests><zns:Amendments><ons:Type>NewProduct</ons:Type><ons:Name>Example Amendment 1</ons:Name>"));
        assert!(xml.contains("</zns:Amendments><zns:AmendOptions><zns:GenerateInvoice>true</zns:GenerateInvoice><zns:ProcessPayments>true</zns:ProcessPayments></zns:AmendOptions>"));
        assert!(xml.contains("<zns:PreviewOptions><zns:EnablePreviewMode>true</zns:EnablePreviewMode><zns:NumberOfPeriods>1</zns:NumberOfPeriods></zns:PreviewOptions>"));
    }

    #[test]
    fn test_empty_request_is_invalid() {
        let request = AmendRequest::default();
        assert!(!request.is_valid());

        let mut incomplete = amendment();
        incomplete.name = None;
        let request = AmendRequest::new(vec![incomplete]);
        assert_eq!(request.validation_errors().get("amendments[0].name").len(), 1);
    }
}
