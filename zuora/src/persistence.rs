//! Persistence façade
//!
//! Every [`ZObject`] is [`Persistable`]: `save` creates or updates depending
//! on the presence of an identifier, `destroy` deletes, `find`/`where_`/`query`
//! read. Composite requests that can only be sent implement the narrower
//! [`Submittable`] instead.
//!
//! `save` and `destroy` return `Ok(false)` when local validation or the
//! service rejected the object; the details are kept in
//! [`Record::errors`]. `Err` is reserved for transport, authentication,
//! coercion and lifecycle failures.

use crate::attributes::write_fields;
use crate::client::Client;
use crate::error::{Result, ZuoraError};
use crate::object::{Record, ZObject};
use crate::query::{Zoql, query_records};
use crate::result::{OperationResult, Outcome, operation_results};
use crate::validation::ValidationErrors;
use tracing::{debug, info};
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, text_element};

pub trait Persistable: ZObject {
    /// Creates the object when new, updates it when persisted.
    fn save(&mut self, client: &Client) -> Result<bool>;

    /// Deletes a persisted object; it becomes destroyed on success.
    fn destroy(&mut self, client: &Client) -> Result<bool>;

    /// Runs validation and records the messages on the object.
    fn valid(&mut self) -> bool;

    fn find(client: &Client, id: &str) -> Result<Option<Self>>;

    /// Objects matching `(field name, value)` pairs
    fn where_(client: &Client, criteria: &[(&str, &str)]) -> Result<Vec<Self>>;

    fn query(client: &Client, zoql: &Zoql) -> Result<Vec<Self>>;
}

/// Write-only composite request: built, then sent once.
pub trait Submittable {
    type Output;

    fn create(&self, client: &Client) -> Result<Self::Output>;
}

fn label<T: ZObject>(object: &T) -> String {
    match object.id() {
        Some(id) => format!("{} {}", T::OBJECT_TYPE, id),
        None => T::OBJECT_TYPE.to_string(),
    }
}

/// `zns:zObjects xsi:type="ons:<Type>"` element for one object
pub fn z_object<T: ZObject>(object: &T) -> Element {
    let mut elem = api_element("zObjects");
    elem.attributes
        .insert("xsi:type".to_string(), format!("ons:{}", T::OBJECT_TYPE));
    write_fields(object, &mut elem);
    for nested in object.nested_elements() {
        elem.children.push(XMLNode::Element(nested));
    }
    elem
}

/// `zns:create` or `zns:update` body for `objects`
pub fn write_request<'a, T: ZObject + 'a>(
    operation: &str,
    objects: impl IntoIterator<Item = &'a T>,
) -> Element {
    let mut body = api_element(operation);
    for object in objects {
        body.children.push(XMLNode::Element(z_object(object)));
    }
    body
}

/// `zns:delete` body
pub fn delete_request(object_type: &str, id: &str) -> Element {
    let mut body = api_element("delete");
    body.children
        .push(XMLNode::Element(text_element("zns:type", object_type)));
    body.children.push(XMLNode::Element(text_element("zns:ids", id)));
    body
}

fn first_result(results: Vec<OperationResult>, operation: &str) -> Result<OperationResult> {
    results
        .into_iter()
        .next()
        .ok_or_else(|| ZuoraError::malformed(format!("{operation}Response carries no result")))
}

/// Applies the outcome of a create/update to the object.
fn apply_save_result<T: ZObject>(
    object: &mut T,
    result: OperationResult,
    creating: bool,
) -> Result<bool> {
    if !result.success {
        debug!("{} rejected: {}", label(object), result.message());
        object.errors_mut().set_remote(result.errors);
        return Ok(false);
    }

    if creating {
        let Some(id) = result.id else {
            return Err(ZuoraError::malformed(format!(
                "create of {} succeeded without an Id",
                T::OBJECT_TYPE
            )));
        };
        object.set_id(Some(id));
    }
    object.after_save();
    Ok(true)
}

impl<T: ZObject> Persistable for T {
    fn save(&mut self, client: &Client) -> Result<bool> {
        if self.is_destroyed() {
            return Err(ZuoraError::StaleObject(label(self)));
        }
        if !self.valid() {
            debug!("{} failed validation", label(self));
            return Ok(false);
        }

        let creating = self.is_new_record();
        let operation = if creating { "create" } else { "update" };
        info!("Saving {} ({})", label(self), operation);

        let envelope = client.call(operation, write_request(operation, [&*self]))?;
        let result = first_result(operation_results(&envelope, operation)?, operation)?;
        apply_save_result(self, result, creating)
    }

    fn destroy(&mut self, client: &Client) -> Result<bool> {
        if self.is_destroyed() {
            return Err(ZuoraError::StaleObject(label(self)));
        }
        let Some(id) = self.id().map(str::to_string) else {
            return Err(ZuoraError::NotPersisted(T::OBJECT_TYPE.to_string()));
        };
        self.errors_mut().clear();

        info!("Deleting {} {}", T::OBJECT_TYPE, id);
        let envelope = client.call("delete", delete_request(T::OBJECT_TYPE, &id))?;
        let result = first_result(operation_results(&envelope, "delete")?, "delete")?;

        if result.success {
            self.mark_destroyed();
            Ok(true)
        } else {
            self.errors_mut().set_remote(result.errors);
            Ok(false)
        }
    }

    fn valid(&mut self) -> bool {
        self.errors_mut().clear();
        let errors = self.validation_errors();
        let valid = errors.is_empty();
        self.errors_mut().set_validation(errors);
        valid
    }

    fn find(client: &Client, id: &str) -> Result<Option<Self>> {
        let zoql = Zoql::select_all::<Self>().filter("Id", id);
        Ok(Self::query(client, &zoql)?.into_iter().next())
    }

    fn where_(client: &Client, criteria: &[(&str, &str)]) -> Result<Vec<Self>> {
        Self::query(client, &Zoql::criteria::<Self>(criteria)?)
    }

    fn query(client: &Client, zoql: &Zoql) -> Result<Vec<Self>> {
        query_records(client, &zoql.to_query_string())?
            .iter()
            .map(Self::from_record)
            .collect()
    }
}

/// Creates several new objects with one `create` call.
///
/// Each object gets the outcome of its own item: successful ones receive
/// their identifier, failed ones stay new with the service errors recorded.
/// Nothing is sent when one of them is invalid or already persisted.
pub fn create_all<T: ZObject>(client: &Client, objects: &mut [T]) -> Result<Outcome> {
    let mut invalid = ValidationErrors::new();
    for (index, object) in objects.iter_mut().enumerate() {
        if object.is_destroyed() {
            return Err(ZuoraError::StaleObject(label(object)));
        }
        if !object.is_new_record() {
            invalid.add(&format!("[{index}].id"), "has already been persisted");
        }
        if !object.valid() {
            invalid.merge_nested(&format!("[{index}]"), object.errors().validation().clone());
        }
    }
    invalid.into_result()?;

    if objects.is_empty() {
        return Ok(Outcome::Success(Vec::new()));
    }

    info!("Creating {} {} objects", objects.len(), T::OBJECT_TYPE);
    let envelope = client.call("create", write_request("create", objects.iter()))?;
    let results = operation_results(&envelope, "create")?;
    if results.len() != objects.len() {
        return Err(ZuoraError::malformed(format!(
            "create returned {} results for {} objects",
            results.len(),
            objects.len()
        )));
    }

    // Checked up front so a bad item leaves every object untouched.
    if let Some(index) = results.iter().position(|r| r.success && r.id.is_none()) {
        return Err(ZuoraError::malformed(format!(
            "create of {} item {index} succeeded without an Id",
            T::OBJECT_TYPE
        )));
    }

    for (object, result) in objects.iter_mut().zip(results.iter()) {
        apply_save_result(object, result.clone(), true)?;
    }
    Ok(Outcome::from_results(results))
}
