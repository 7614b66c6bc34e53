//! Billing objects of the Zuora API

mod amend_request;
mod amendment;
pub mod enums;
mod product;
mod product_rate_plan_charge;
mod rate_plan;
mod subscription;

pub use amend_request::{AmendOptions, AmendRequest, PreviewOptions};
pub use amendment::Amendment;
pub use enums::*;
pub use product::{Product, ProductRatePlan};
pub use product_rate_plan_charge::{ProductRatePlanCharge, ProductRatePlanChargeTier};
pub use rate_plan::{RatePlan, RatePlanCharge, RatePlanChargeData, RatePlanChargeTier, RatePlanData};
pub use subscription::Subscription;
