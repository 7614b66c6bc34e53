use super::RatePlanData;
use super::enums::{AmendmentType, TermType};
use crate::object::ZObject;
use crate::validation::{Validatable, ValidationErrors};
use crate::zobject;
use chrono::NaiveDate;
use xmltree::Element;

zobject! {
    /// Change applied to a subscription
    pub struct Amendment("Amendment") {
        subscription_id: String => "SubscriptionId",
        name: String => "Name",
        amendment_type: AmendmentType => "Type",
        description: String => "Description",
        status: String => "Status",
        code: String => "Code",
        contract_effective_date: NaiveDate => "ContractEffectiveDate",
        customer_acceptance_date: NaiveDate => "CustomerAcceptanceDate",
        service_activation_date: NaiveDate => "ServiceActivationDate",
        effective_date: NaiveDate => "EffectiveDate",
        term_start_date: NaiveDate => "TermStartDate",
        term_type: TermType => "TermType",
        current_term: i64 => "CurrentTerm",
        renewal_term: i64 => "RenewalTerm",
        auto_renew: bool => "AutoRenew",
    }
    extra {
        /// Rate plan added or changed by the amendment
        pub rate_plan_data: Option<RatePlanData>,
    }
}

impl Validatable for Amendment {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("name", self.name.is_some());
        errors.require("subscription_id", self.subscription_id.is_some());
        errors.require("amendment_type", self.amendment_type.is_some());
        errors.require("contract_effective_date", self.contract_effective_date.is_some());

        if let Some(data) = &self.rate_plan_data {
            let mut nested = ValidationErrors::new();
            data.validate(&mut nested);
            errors.merge_nested("rate_plan_data", nested);
        }
    }
}

impl ZObject for Amendment {
    fn write_order() -> Option<&'static [&'static str]> {
        Some(&["amendment_type", "name", "subscription_id"])
    }

    fn nested_elements(&self) -> Vec<Element> {
        self.rate_plan_data
            .iter()
            .map(RatePlanData::to_element)
            .collect()
    }
}
