use super::ProductRatePlanCharge;
use crate::associations::RemoteAssociation;
use crate::client::Client;
use crate::error::Result;
use crate::object::ZObject;
use crate::validation::{Validatable, ValidationErrors};
use crate::zobject;
use chrono::NaiveDate;

zobject! {
    /// Catalog product
    pub struct Product("Product") {
        name: String => "Name",
        sku: String => "SKU",
        description: String => "Description",
        category: String => "Category",
        effective_start_date: NaiveDate => "EffectiveStartDate",
        effective_end_date: NaiveDate => "EffectiveEndDate",
    }
    extra {
        product_rate_plans: RemoteAssociation<ProductRatePlan>,
    }
}

impl Product {
    /// Rate plans of this product, fetched on first access
    pub fn product_rate_plans(&mut self, client: &Client) -> Result<&[ProductRatePlan]> {
        let id = self.id.clone();
        self.product_rate_plans
            .load(client, id.as_deref(), "ProductId")
    }
}

impl Validatable for Product {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("name", self.name.is_some());
        errors.require("effective_start_date", self.effective_start_date.is_some());
        errors.require("effective_end_date", self.effective_end_date.is_some());
    }
}

impl ZObject for Product {
    fn after_save(&mut self) {
        self.product_rate_plans.invalidate();
    }
}

zobject! {
    /// Priced offering of a product
    pub struct ProductRatePlan("ProductRatePlan") {
        product_id: String => "ProductId",
        name: String => "Name",
        description: String => "Description",
        effective_start_date: NaiveDate => "EffectiveStartDate",
        effective_end_date: NaiveDate => "EffectiveEndDate",
    }
    extra {
        product_rate_plan_charges: RemoteAssociation<ProductRatePlanCharge>,
    }
}

impl ProductRatePlan {
    /// Charges of this rate plan, fetched on first access
    pub fn product_rate_plan_charges(
        &mut self,
        client: &Client,
    ) -> Result<&[ProductRatePlanCharge]> {
        let id = self.id.clone();
        self.product_rate_plan_charges
            .load(client, id.as_deref(), "ProductRatePlanId")
    }
}

impl Validatable for ProductRatePlan {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.require("product_id", self.product_id.is_some());
        errors.require("name", self.name.is_some());
        errors.require("effective_start_date", self.effective_start_date.is_some());
        errors.require("effective_end_date", self.effective_end_date.is_some());
    }
}

impl ZObject for ProductRatePlan {
    fn after_save(&mut self) {
        self.product_rate_plan_charges.invalidate();
    }
}
