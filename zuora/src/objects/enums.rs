//! Closed sets of wire literals used by the billing objects

use crate::wire_enum;

wire_enum! {
    /// When a charge is billed
    pub enum ChargeType {
        OneTime => "OneTime",
        Recurring => "Recurring",
        Usage => "Usage",
    }
}

wire_enum! {
    /// How the price of a charge is computed
    pub enum ChargeModel {
        FlatFee => "Flat Fee Pricing",
        PerUnit => "Per Unit Pricing",
        Overage => "Overage Pricing",
        Volume => "Volume Pricing",
        Tiered => "Tiered Pricing",
        TieredWithOverage => "Tiered with Overage Pricing",
        DiscountFixedAmount => "Discount-Fixed Amount",
        DiscountPercentage => "Discount-Percentage",
    }
}

wire_enum! {
    pub enum BillingPeriod {
        Month => "Month",
        Quarter => "Quarter",
        Annual => "Annual",
        SemiAnnual => "Semi-Annual",
        SpecificMonths => "Specific Months",
        Week => "Week",
        SpecificWeeks => "Specific Weeks",
    }
}

wire_enum! {
    pub enum BillCycleType {
        DefaultFromCustomer => "DefaultFromCustomer",
        SpecificDayOfMonth => "SpecificDayofMonth",
        SubscriptionStartDay => "SubscriptionStartDay",
        ChargeTriggerDay => "ChargeTriggerDay",
    }
}

wire_enum! {
    pub enum BillingPeriodAlignment {
        AlignToCharge => "AlignToCharge",
        AlignToSubscriptionStart => "AlignToSubscriptionStart",
        AlignToTermStart => "AlignToTermStart",
    }
}

wire_enum! {
    /// Event that starts billing of a charge
    pub enum TriggerEvent {
        ContractEffective => "ContractEffective",
        ServiceActivation => "ServiceActivation",
        CustomerAcceptance => "CustomerAcceptance",
        SpecificDate => "SpecificDate",
    }
}

wire_enum! {
    pub enum SmoothingModel {
        RollingWindow => "RollingWindow",
        Rollover => "Rollover",
    }
}

wire_enum! {
    /// Category of an amendment
    pub enum AmendmentType {
        Cancellation => "Cancellation",
        NewProduct => "NewProduct",
        OwnerTransfer => "OwnerTransfer",
        RemoveProduct => "RemoveProduct",
        Renewal => "Renewal",
        UpdateProduct => "UpdateProduct",
        TermsAndConditions => "TermsAndConditions",
    }
}

wire_enum! {
    pub enum TermType {
        Termed => "TERMED",
        Evergreen => "EVERGREEN",
    }
}

wire_enum! {
    pub enum PriceFormat {
        FlatFee => "Flat Fee",
        PerUnit => "Per Unit",
    }
}
