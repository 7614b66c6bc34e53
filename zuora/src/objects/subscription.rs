use super::RatePlan;
use super::enums::TermType;
use crate::associations::RemoteAssociation;
use crate::client::Client;
use crate::error::Result;
use crate::object::ZObject;
use crate::validation::{Validatable, ValidationErrors};
use crate::zobject;
use chrono::NaiveDate;

zobject! {
    /// Customer subscription
    pub struct Subscription("Subscription") {
        account_id: String => "AccountId",
        name: String => "Name",
        auto_renew: bool => "AutoRenew",
        contract_effective_date: NaiveDate => "ContractEffectiveDate",
        contract_acceptance_date: NaiveDate => "ContractAcceptanceDate",
        service_activation_date: NaiveDate => "ServiceActivationDate",
        term_start_date: NaiveDate => "TermStartDate",
        term_type: TermType => "TermType",
        initial_term: i64 => "InitialTerm",
        renewal_term: i64 => "RenewalTerm",
        notes: String => "Notes",
        status: String => "Status",
        version: i64 => "Version",
        original_id: String => "OriginalId",
        previous_subscription_id: String => "PreviousSubscriptionId",
    }
    extra {
        rate_plans: RemoteAssociation<RatePlan>,
    }
}

impl Subscription {
    /// Rate plans of this subscription, fetched on first access
    pub fn rate_plans(&mut self, client: &Client) -> Result<&[RatePlan]> {
        let id = self.id.clone();
        self.rate_plans.load(client, id.as_deref(), "SubscriptionId")
    }
}

impl Validatable for Subscription {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("account_id", self.account_id.is_some());
        errors.require("contract_effective_date", self.contract_effective_date.is_some());
        errors.require("term_start_date", self.term_start_date.is_some());
        if self.term_type == Some(TermType::Termed) {
            errors.require("initial_term", self.initial_term.is_some());
        }
    }
}

impl ZObject for Subscription {
    fn after_save(&mut self) {
        self.rate_plans.invalidate();
    }
}
