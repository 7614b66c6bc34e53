//! Typed fields and their wire representation
//!
//! Every domain object declares a static table of [`FieldDescriptor`]s
//! (generated by [`zobject!`](crate::zobject)). Values travel on the wire as
//! text; [`WireValue`] converts between that text and the Rust type of the
//! field.

use crate::error::{Result, ZuoraError};
use crate::object::{Record, ZObject};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use xmltree::{Element, XMLNode};
use zuorasoap::{object_element, text_element};

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Enumerated,
}

/// Static description of one field of a domain object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name (`product_rate_plan_id`)
    pub name: &'static str,
    /// Wire name, without namespace (`ProductRatePlanId`)
    pub wire: &'static str,
    pub kind: FieldKind,
}

/// Conversion between a field type and its canonical wire text
pub trait WireValue: Sized + Clone {
    const KIND: FieldKind;

    fn to_wire(&self) -> String;

    /// `None` when `raw` is not a valid literal for the type
    fn from_wire(raw: &str) -> Option<Self>;
}

impl WireValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn to_wire(&self) -> String {
        self.clone()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl WireValue for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_wire(&self) -> String {
        self.to_string()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl WireValue for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    // Trailing zeros are dropped: 50.00 -> "50"
    fn to_wire(&self) -> String {
        self.normalize().to_string()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Decimal::from_str_exact(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
    }
}

impl WireValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_wire(&self) -> String {
        let literal = if *self { "true" } else { "false" };
        literal.to_string()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl WireValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_wire(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }

    // The service sometimes returns dates with a time part.
    fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| naive.date())
            })
    }
}

impl WireValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_wire(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

/// Converts `raw` to `V`, failing with a coercion error naming the field.
pub fn coerce<V: WireValue>(field: &str, raw: &str) -> Result<V> {
    V::from_wire(raw).ok_or_else(|| ZuoraError::coercion(field, raw))
}

/// Declares a closed set of wire literals as a Rust enum.
///
/// ```
/// zuora::wire_enum! {
///     /// Billing frequency
///     pub enum Period {
///         Month => "Month",
///         SemiAnnual => "Semi-Annual",
///     }
/// }
///
/// use zuora::attributes::WireValue;
/// assert_eq!(Period::SemiAnnual.to_wire(), "Semi-Annual");
/// assert_eq!(Period::from_wire("Month"), Some(Period::Month));
/// assert_eq!(Period::from_wire("Weekly"), None);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::attributes::WireValue for $name {
            const KIND: $crate::attributes::FieldKind = $crate::attributes::FieldKind::Enumerated;

            fn to_wire(&self) -> String {
                self.as_str().to_string()
            }

            fn from_wire(raw: &str) -> Option<Self> {
                match raw.trim() {
                    $( $wire => Some($name::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

/// Interface implemented by every domain object through
/// [`zobject!`](crate::zobject): the field table and by-name access to the
/// wire form of each field.
pub trait Serializable {
    /// Object type name on the wire (`ProductRatePlanCharge`)
    const OBJECT_TYPE: &'static str;

    fn descriptors() -> &'static [FieldDescriptor];

    /// Wire text of a set field, `None` when unset or unknown
    fn field_value(&self, name: &str) -> Option<String>;

    /// Assigns a field from wire text
    fn assign_field(&mut self, name: &str, raw: &str) -> Result<()>;

    fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
        Self::descriptors().iter().find(|d| d.name == name)
    }

    fn descriptor_by_wire(wire: &str) -> Option<&'static FieldDescriptor> {
        Self::descriptors()
            .iter()
            .find(|d| d.wire.eq_ignore_ascii_case(wire))
    }
}

/// Descriptors in emission order: those named by the type's override order
/// first, then the others in declaration order.
pub fn ordered_descriptors<T: ZObject>() -> Vec<&'static FieldDescriptor> {
    let declared = T::descriptors();
    let Some(order) = T::write_order() else {
        return declared.iter().collect();
    };

    let mut ordered: Vec<&'static FieldDescriptor> = order
        .iter()
        .filter_map(|name| declared.iter().find(|d| d.name == *name))
        .collect();
    ordered.extend(declared.iter().filter(|d| !order.contains(&d.name)));
    ordered
}

/// Appends `ons:Id` (when persisted) and every set field to `target`.
/// Unset fields are omitted.
pub fn write_fields<T: ZObject>(object: &T, target: &mut Element) {
    if let Some(id) = object.id() {
        target
            .children
            .push(XMLNode::Element(text_element("ons:Id", id)));
    }

    for descriptor in ordered_descriptors::<T>() {
        if let Some(value) = object.field_value(descriptor.name) {
            let mut elem = object_element(descriptor.wire);
            elem.children.push(XMLNode::Text(value));
            target.children.push(XMLNode::Element(elem));
        }
    }
}

/// Reads the child elements of a record into `object`.
///
/// Unknown elements are ignored. A present `Id` promotes the object to
/// persisted. A value that does not coerce aborts with `ZuoraError::Coercion`.
pub fn read_fields<T: ZObject>(object: &mut T, source: &Element) -> Result<()> {
    for child in source.children.iter().filter_map(|n| n.as_element()) {
        let Some(text) = child.get_text().map(|t| t.trim().to_string()) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        if child.name.eq_ignore_ascii_case("Id") {
            object.set_id(Some(text));
        } else if let Some(descriptor) = T::descriptor_by_wire(&child.name) {
            object.assign_field(descriptor.name, &text)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_canonical_form() {
        assert_eq!(Decimal::from(50).to_wire(), "50");
        assert_eq!(Decimal::new(5, 1).to_wire(), "0.5");
        assert_eq!(Decimal::new(5000, 2).to_wire(), "50");
        assert_eq!(Decimal::from_wire(" 20 "), Some(Decimal::from(20)));
        assert_eq!(Decimal::from_wire("1.5e2"), Some(Decimal::from(150)));
        assert_eq!(Decimal::from_wire("NaN"), None);
    }

    #[test]
    fn test_decimal_keeps_every_digit() {
        for raw in ["1234567890123456.78", "0.1000000000000000055511151231", "-0.000001"] {
            let value = Decimal::from_wire(raw).unwrap();
            assert_eq!(value.to_wire(), raw);
        }
        assert_eq!(
            Decimal::from_wire("19.99").unwrap() * Decimal::from(3),
            Decimal::from_wire("59.97").unwrap()
        );
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(true.to_wire(), "true");
        assert_eq!(false.to_wire(), "false");
        assert_eq!(bool::from_wire("1"), Some(true));
        assert_eq!(bool::from_wire("TRUE"), None);
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        assert_eq!(date.to_wire(), "2012-01-01");
        assert_eq!(NaiveDate::from_wire("2012-01-01"), Some(date));
        assert_eq!(NaiveDate::from_wire("2012-01-01T00:00:00.000-08:00"), Some(date));

        let dt = DateTime::<Utc>::from_wire("2012-01-01T08:00:00.000-08:00").unwrap();
        assert_eq!(dt.to_wire(), "2012-01-01T16:00:00Z");
        assert_eq!(DateTime::<Utc>::from_wire("2012-01-01T16:00:00"), Some(dt));
    }

    #[test]
    fn test_coerce_reports_field_and_value() {
        let err = coerce::<i64>("Quantity", "twelve").unwrap_err();
        match err {
            ZuoraError::Coercion { field, raw } => {
                assert_eq!(field, "Quantity");
                assert_eq!(raw, "twelve");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
