use super::enums::{AmendmentType, BillingPeriod, ChargeModel, ChargeType, PriceFormat, TriggerEvent};
use crate::associations::{RemoteAssociation, nested_element};
use crate::client::Client;
use crate::error::Result;
use crate::object::ZObject;
use crate::validation::{Validatable, ValidationErrors};
use crate::zobject;
use rust_decimal::Decimal;
use chrono::NaiveDate;
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, object_element};

zobject! {
    /// Product rate plan instantiated on a subscription
    pub struct RatePlan("RatePlan") {
        subscription_id: String => "SubscriptionId",
        product_rate_plan_id: String => "ProductRatePlanId",
        name: String => "Name",
        amendment_id: String => "AmendmentId",
        amendment_type: AmendmentType => "AmendmentType",
        amendment_subscription_rate_plan_id: String => "AmendmentSubscriptionRatePlanId",
    }
    extra {
        rate_plan_charges: RemoteAssociation<RatePlanCharge>,
    }
}

impl RatePlan {
    /// Charges of this rate plan, fetched on first access
    pub fn rate_plan_charges(&mut self, client: &Client) -> Result<&[RatePlanCharge]> {
        let id = self.id.clone();
        self.rate_plan_charges.load(client, id.as_deref(), "RatePlanId")
    }
}

impl Validatable for RatePlan {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("product_rate_plan_id", self.product_rate_plan_id.is_some());
    }
}

impl ZObject for RatePlan {
    fn after_save(&mut self) {
        self.rate_plan_charges.invalidate();
    }
}

zobject! {
    /// Charge of a subscription rate plan
    pub struct RatePlanCharge("RatePlanCharge") {
        rate_plan_id: String => "RatePlanId",
        product_rate_plan_charge_id: String => "ProductRatePlanChargeId",
        name: String => "Name",
        description: String => "Description",
        charge_number: String => "ChargeNumber",
        charge_model: ChargeModel => "ChargeModel",
        charge_type: ChargeType => "ChargeType",
        billing_period: BillingPeriod => "BillingPeriod",
        bill_cycle_day: i64 => "BillCycleDay",
        quantity: Decimal => "Quantity",
        price: Decimal => "Price",
        included_units: Decimal => "IncludedUnits",
        overage_price: Decimal => "OveragePrice",
        trigger_event: TriggerEvent => "TriggerEvent",
        trigger_date: NaiveDate => "TriggerDate",
        uom: String => "UOM",
    }
}

impl Validatable for RatePlanCharge {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require(
            "product_rate_plan_charge_id",
            self.product_rate_plan_charge_id.is_some(),
        );
    }
}

impl ZObject for RatePlanCharge {}

zobject! {
    /// Price band of a subscription rate plan charge
    pub struct RatePlanChargeTier("RatePlanChargeTier") {
        rate_plan_charge_id: String => "RatePlanChargeId",
        price: Decimal => "Price",
        starting_unit: Decimal => "StartingUnit",
        ending_unit: Decimal => "EndingUnit",
        is_overage_price: bool => "IsOveragePrice",
        price_format: PriceFormat => "PriceFormat",
        tier: i64 => "Tier",
    }
}

impl Validatable for RatePlanChargeTier {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("price", self.price.is_some());
    }
}

impl ZObject for RatePlanChargeTier {}

/// A charge and its tiers, as sent inside [`RatePlanData`]
#[derive(Debug, Clone, Default)]
pub struct RatePlanChargeData {
    pub charge: RatePlanCharge,
    pub tiers: Vec<RatePlanChargeTier>,
}

impl RatePlanChargeData {
    pub fn new(charge: RatePlanCharge) -> Self {
        Self {
            charge,
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: RatePlanChargeTier) -> Self {
        self.tiers.push(tier);
        self
    }

    fn to_element(&self) -> Element {
        let mut data = api_element("RatePlanChargeData");
        data.children
            .push(XMLNode::Element(nested_element(&self.charge)));
        for tier in &self.tiers {
            data.children.push(XMLNode::Element(nested_element(tier)));
        }
        data
    }
}

/// Rate plan supplied inline with an amendment; never fetched remotely
#[derive(Debug, Clone, Default)]
pub struct RatePlanData {
    pub rate_plan: RatePlan,
    pub charges: Vec<RatePlanChargeData>,
}

impl RatePlanData {
    pub fn new(rate_plan: RatePlan) -> Self {
        Self {
            rate_plan,
            charges: Vec::new(),
        }
    }

    pub fn with_charge(mut self, charge: RatePlanChargeData) -> Self {
        self.charges.push(charge);
        self
    }

    /// `ons:RatePlanData` section
    pub fn to_element(&self) -> Element {
        let mut data = object_element("RatePlanData");
        data.children
            .push(XMLNode::Element(nested_element(&self.rate_plan)));
        for charge in &self.charges {
            data.children.push(XMLNode::Element(charge.to_element()));
        }
        data
    }

    pub fn validate(&self, errors: &mut ValidationErrors) {
        errors.merge_nested("rate_plan", self.rate_plan.validation_errors());
        for (index, data) in self.charges.iter().enumerate() {
            let prefix = format!("charges[{index}]");
            errors.merge_nested(&prefix, data.charge.validation_errors());
            for (tier_index, tier) in data.tiers.iter().enumerate() {
                errors.merge_nested(&format!("{prefix}.tiers[{tier_index}]"), tier.validation_errors());
            }
        }
    }
}
