use super::enums::{
    BillCycleType, BillingPeriod, BillingPeriodAlignment, ChargeModel, ChargeType, PriceFormat,
    SmoothingModel, TriggerEvent,
};
use crate::associations::{RemoteAssociation, nested_collection};
use crate::client::Client;
use crate::error::Result;
use crate::object::{Record, ZObject};
use crate::validation::{Validatable, ValidationErrors};
use crate::zobject;
use rust_decimal::Decimal;
use xmltree::Element;

zobject! {
    /// Charge definition of a product rate plan.
    ///
    /// Pricing tiers travel with the charge as a
    /// `ProductRatePlanChargeTierData` section when attached.
    pub struct ProductRatePlanCharge("ProductRatePlanCharge") {
        product_rate_plan_id: String => "ProductRatePlanId",
        name: String => "Name",
        description: String => "Description",
        accounting_code: String => "AccountingCode",
        bill_cycle_day: i64 => "BillCycleDay",
        bill_cycle_type: BillCycleType => "BillCycleType",
        billing_period: BillingPeriod => "BillingPeriod",
        billing_period_alignment: BillingPeriodAlignment => "BillingPeriodAlignment",
        charge_model: ChargeModel => "ChargeModel",
        charge_type: ChargeType => "ChargeType",
        default_quantity: Decimal => "DefaultQuantity",
        included_units: Decimal => "IncludedUnits",
        max_quantity: Decimal => "MaxQuantity",
        min_quantity: Decimal => "MinQuantity",
        number_of_period: i64 => "NumberOfPeriod",
        smoothing_model: SmoothingModel => "SmoothingModel",
        specific_billing_period: i64 => "SpecificBillingPeriod",
        trigger_event: TriggerEvent => "TriggerEvent",
        uom: String => "UOM",
    }
    extra {
        product_rate_plan_charge_tiers: RemoteAssociation<ProductRatePlanChargeTier>,
    }
}

const TIER_FOREIGN_KEY: &str = "ProductRatePlanChargeId";

impl ProductRatePlanCharge {
    /// Pricing tiers. Fetched on first access when the charge is persisted,
    /// empty for a new charge.
    pub fn product_rate_plan_charge_tiers(
        &mut self,
        client: &Client,
    ) -> Result<&[ProductRatePlanChargeTier]> {
        let id = self.id.clone();
        self.product_rate_plan_charge_tiers
            .load(client, id.as_deref(), TIER_FOREIGN_KEY)
    }

    /// Editable tiers; they are sent with the next save.
    pub fn product_rate_plan_charge_tiers_mut(
        &mut self,
        client: &Client,
    ) -> Result<&mut Vec<ProductRatePlanChargeTier>> {
        let id = self.id.clone();
        self.product_rate_plan_charge_tiers
            .load_mut(client, id.as_deref(), TIER_FOREIGN_KEY)
    }

    /// Appends a tier to those sent with the next save. The existing tiers
    /// of a persisted charge are fetched first.
    pub fn add_tier(&mut self, client: &Client, tier: ProductRatePlanChargeTier) -> Result<()> {
        let id = self.id.clone();
        self.product_rate_plan_charge_tiers
            .push(client, id.as_deref(), TIER_FOREIGN_KEY, tier)
    }
}

impl Validatable for ProductRatePlanCharge {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("name", self.name.is_some());
        errors.require("bill_cycle_type", self.bill_cycle_type.is_some());
        errors.require("billing_period", self.billing_period.is_some());
        errors.require("charge_model", self.charge_model.is_some());
        errors.require("charge_type", self.charge_type.is_some());
        errors.require("trigger_event", self.trigger_event.is_some());

        let tiers = &self.product_rate_plan_charge_tiers;
        if (self.is_new_record() || tiers.is_attached()) && tiers.attached().is_empty() {
            errors.add("product_rate_plan_charge_tiers", "must contain at least one tier");
        }
        for (index, tier) in tiers.attached().iter().enumerate() {
            errors.merge_nested(
                &format!("product_rate_plan_charge_tiers[{index}]"),
                tier.validation_errors(),
            );
        }
    }
}

impl ZObject for ProductRatePlanCharge {
    fn nested_elements(&self) -> Vec<Element> {
        let tiers = self.product_rate_plan_charge_tiers.attached();
        if tiers.is_empty() {
            Vec::new()
        } else {
            vec![nested_collection(tiers)]
        }
    }

    // Tiers may have been created or renumbered by the service.
    fn after_save(&mut self) {
        self.product_rate_plan_charge_tiers.invalidate();
    }
}

zobject! {
    /// One price band of a product rate plan charge
    pub struct ProductRatePlanChargeTier("ProductRatePlanChargeTier") {
        product_rate_plan_charge_id: String => "ProductRatePlanChargeId",
        currency: String => "Currency",
        price: Decimal => "Price",
        starting_unit: Decimal => "StartingUnit",
        ending_unit: Decimal => "EndingUnit",
        is_overage_price: bool => "IsOveragePrice",
        price_format: PriceFormat => "PriceFormat",
        tier: i64 => "Tier",
    }
}

impl Validatable for ProductRatePlanChargeTier {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("price", self.price.is_some());
        if let (Some(start), Some(end)) = (self.starting_unit, self.ending_unit) {
            if end < start {
                errors.add("ending_unit", "must not be lower than starting_unit");
            }
        }
    }
}

impl ZObject for ProductRatePlanChargeTier {}
