//! ZOQL query strings and paged query execution

use crate::attributes::Serializable;
use crate::client::Client;
use crate::error::Result;
use crate::result::{QueryResult, query_result};
use crate::validation::ValidationErrors;
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, text_element};
use tracing::debug;

/// `select <fields> from <Type> [where <Field> = '<value>' [and ...]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zoql {
    object_type: String,
    fields: Vec<String>,
    conditions: Vec<(String, String)>,
}

impl Zoql {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            fields: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Selects every declared field of `T` plus `Id`.
    pub fn select_all<T: Serializable>() -> Self {
        let mut query = Self::new(T::OBJECT_TYPE);
        query.fields.push("Id".to_string());
        query
            .fields
            .extend(T::descriptors().iter().map(|d| d.wire.to_string()));
        query
    }

    pub fn field(mut self, wire: impl Into<String>) -> Self {
        self.fields.push(wire.into());
        self
    }

    /// Adds an equality condition on a wire field
    pub fn filter(mut self, wire: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((wire.into(), value.into()));
        self
    }

    /// Selects every field of `T` restricted by `(field name, value)` pairs,
    /// field names being Rust names resolved through the descriptors.
    /// `id` is accepted for the identifier.
    pub fn criteria<T: Serializable>(criteria: &[(&str, &str)]) -> Result<Self> {
        let mut query = Self::select_all::<T>();
        let mut errors = ValidationErrors::new();

        for (name, value) in criteria {
            let wire = if name.eq_ignore_ascii_case("id") {
                Some("Id")
            } else {
                T::descriptor(name).map(|d| d.wire)
            };
            match wire {
                Some(wire) => query = query.filter(wire, *value),
                None => errors.add(name, format!("is not a field of {}", T::OBJECT_TYPE)),
            }
        }

        errors.into_result()?;
        Ok(query)
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn to_query_string(&self) -> String {
        let fields = if self.fields.is_empty() {
            "Id".to_string()
        } else {
            self.fields.join(", ")
        };
        let mut zoql = format!("select {} from {}", fields, self.object_type);

        for (i, (field, value)) in self.conditions.iter().enumerate() {
            let keyword = if i == 0 { "where" } else { "and" };
            zoql.push_str(&format!(" {} {} = '{}'", keyword, field, escape(value)));
        }
        zoql
    }
}

impl std::fmt::Display for Zoql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `zns:query` body
pub fn query_request(zoql: &str) -> Element {
    let mut query = api_element("query");
    query
        .children
        .push(XMLNode::Element(text_element("zns:queryString", zoql)));
    query
}

/// `zns:queryMore` body
pub fn query_more_request(locator: &str) -> Element {
    let mut more = api_element("queryMore");
    more.children
        .push(XMLNode::Element(text_element("zns:queryLocator", locator)));
    more
}

/// Runs a query and follows `queryLocator` until the service reports `done`.
pub fn query_records(client: &Client, zoql: &str) -> Result<Vec<Element>> {
    let envelope = client.call("query", query_request(zoql))?;
    let QueryResult {
        mut done,
        mut query_locator,
        mut records,
        ..
    } = query_result(&envelope, "query")?;

    while !done {
        let Some(locator) = query_locator.take() else {
            break;
        };
        debug!("Fetching next query page ({} records so far)", records.len());

        let envelope = client.call("queryMore", query_more_request(&locator))?;
        let page = query_result(&envelope, "queryMore")?;
        records.extend(page.records);
        done = page.done;
        query_locator = page.query_locator;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZuoraError;
    use crate::objects::Product;

    #[test]
    fn test_select_with_conditions() {
        let zoql = Zoql::new("ProductRatePlanChargeTier")
            .field("Id")
            .field("Price")
            .filter("ProductRatePlanChargeId", "abc")
            .filter("Currency", "USD");

        assert_eq!(
            zoql.to_query_string(),
            "select Id, Price from ProductRatePlanChargeTier where ProductRatePlanChargeId = 'abc' and Currency = 'USD'"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let zoql = Zoql::new("Product").filter("Name", "O'Brien");
        assert_eq!(
            zoql.to_query_string(),
            "select Id from Product where Name = 'O\\'Brien'"
        );
    }

    #[test]
    fn test_criteria_resolves_rust_names() {
        let zoql = Zoql::criteria::<Product>(&[("sku", "SKU-1"), ("id", "P1")]).unwrap();
        let text = zoql.to_query_string();
        assert!(text.starts_with("select Id, "));
        assert!(text.contains(" from Product where SKU = 'SKU-1' and Id = 'P1'"));
    }

    #[test]
    fn test_criteria_rejects_unknown_fields() {
        let err = Zoql::criteria::<Product>(&[("colour", "red")]).unwrap_err();
        match err {
            ZuoraError::Validation(errors) => assert_eq!(errors.get("colour").len(), 1),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
