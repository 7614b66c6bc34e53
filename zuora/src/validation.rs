//! Local structural validation

use std::collections::BTreeMap;
use std::fmt;

/// Field-level validation messages collected before any network call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Adds "can't be blank" when `present` is false.
    pub fn require(&mut self, field: &str, present: bool) {
        if !present {
            self.add(field, "can't be blank");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Messages recorded for one field
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (field.as_str(), m.as_str())))
    }

    /// "field message" strings, in field order
    pub fn full_messages(&self) -> Vec<String> {
        self.iter().map(|(f, m)| format!("{f} {m}")).collect()
    }

    /// Prefixes every field with `prefix.`, for nested objects
    pub fn merge_nested(&mut self, prefix: &str, nested: ValidationErrors) {
        for (field, messages) in nested.fields {
            for message in messages {
                self.add(&format!("{prefix}.{field}"), message);
            }
        }
    }

    /// `Ok(())` when empty
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::ZuoraError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

/// Structural rules declared per object type
pub trait Validatable {
    /// Records every violated rule in `errors`.
    fn validate(&self, errors: &mut ValidationErrors);

    fn validation_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.validate(&mut errors);
        errors
    }

    fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.require("name", false);
        errors.require("charge_type", true);
        errors.add("product_rate_plan_charge_tiers", "must contain at least one tier");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), ["can't be blank".to_string()]);
        assert!(errors.get("charge_type").is_empty());
        assert_eq!(
            errors.to_string(),
            "name can't be blank, product_rate_plan_charge_tiers must contain at least one tier"
        );
    }

    #[test]
    fn test_nested_errors_are_prefixed() {
        let mut inner = ValidationErrors::new();
        inner.require("type", false);

        let mut outer = ValidationErrors::new();
        outer.merge_nested("amendments[0]", inner);

        assert_eq!(outer.full_messages(), vec!["amendments[0].type can't be blank"]);
        assert!(outer.into_result().is_err());
    }
}
