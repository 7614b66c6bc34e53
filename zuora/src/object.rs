//! Domain object identity, lifecycle state and the `zobject!` declaration macro

use crate::attributes::{Serializable, read_fields};
use crate::error::Result;
use crate::result::ResultError;
use crate::validation::{Validatable, ValidationErrors};
use std::fmt;
use xmltree::Element;

/// Lifecycle state of one object instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectState {
    /// No remote identifier yet
    #[default]
    New,
    /// Has a remote identifier
    Persisted,
    /// Deleted remotely; terminal
    Destroyed,
}

/// Failure details kept on an object after an unsuccessful `save`/`destroy`
#[derive(Debug, Clone, Default)]
pub struct Errors {
    validation: ValidationErrors,
    remote: Vec<ResultError>,
}

impl Errors {
    pub fn clear(&mut self) {
        self.validation = ValidationErrors::new();
        self.remote.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.validation.is_empty() && self.remote.is_empty()
    }

    /// Local rule violations (nothing was sent)
    pub fn validation(&self) -> &ValidationErrors {
        &self.validation
    }

    /// Business-rule rejections reported by the service
    pub fn remote(&self) -> &[ResultError] {
        &self.remote
    }

    pub fn set_validation(&mut self, errors: ValidationErrors) {
        self.validation = errors;
    }

    pub fn set_remote(&mut self, errors: Vec<ResultError>) {
        self.remote = errors;
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.validation.full_messages();
        messages.extend(self.remote.iter().map(|e| e.message.clone()));
        messages
    }
}

/// Identity and state of a domain object, generated by [`zobject!`](crate::zobject)
pub trait Record {
    fn id(&self) -> Option<&str>;

    /// Sets the remote identifier; an empty string clears it.
    fn set_id(&mut self, id: Option<String>);

    fn is_destroyed(&self) -> bool;

    fn mark_destroyed(&mut self);

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;

    fn is_new_record(&self) -> bool {
        self.id().is_none()
    }

    fn state(&self) -> ObjectState {
        if self.is_destroyed() {
            ObjectState::Destroyed
        } else if self.is_new_record() {
            ObjectState::New
        } else {
            ObjectState::Persisted
        }
    }
}

/// A persistable domain object.
///
/// The field table comes from [`Serializable`], identity from [`Record`],
/// structural rules from [`Validatable`]. The hooks below let a type add
/// nested payloads and react to a completed save.
pub trait ZObject: Serializable + Record + Validatable + Default + Clone + fmt::Debug {
    /// Field names emitted first, in this order, ahead of declaration order
    fn write_order() -> Option<&'static [&'static str]> {
        None
    }

    /// Nested sub-envelopes appended after the object's own fields on write
    fn nested_elements(&self) -> Vec<Element> {
        Vec::new()
    }

    /// Called after a successful create or update
    fn after_save(&mut self) {}

    /// New instance populated from a returned record
    fn from_record(record: &Element) -> Result<Self> {
        let mut object = Self::default();
        read_fields(&mut object, record)?;
        Ok(object)
    }
}

/// Declares a domain object: a struct with one `Option<T>` per wire field,
/// its static field table ([`Serializable`]) and its identity ([`Record`]).
///
/// Non-wire members (associations) go in the optional `extra` block; they
/// must implement `Default`, `Clone` and `Debug`, and are private unless
/// declared `pub`.
///
/// ```
/// use zuora::attributes::Serializable;
///
/// zuora::zobject! {
///     /// Accounting code
///     pub struct AccountingCode("AccountingCode") {
///         name: String => "Name",
///         active: bool => "Active",
///     }
/// }
///
/// let code = AccountingCode::build(|c| c.name = Some("Revenue".into()));
/// assert_eq!(AccountingCode::OBJECT_TYPE, "AccountingCode");
/// assert_eq!(code.field_value("name").as_deref(), Some("Revenue"));
/// assert_eq!(code.field_value("active"), None);
/// ```
///
/// `extra` members stay behind the object's own accessors:
///
/// ```compile_fail
/// mod catalog {
///     zuora::zobject! {
///         pub struct Bundle("Bundle") {
///             name: String => "Name",
///         }
///         extra {
///             parts: Vec<String>,
///         }
///     }
/// }
///
/// let mut bundle = catalog::Bundle::new();
/// bundle.parts.push("ignored".into());
/// ```
#[macro_export]
macro_rules! zobject {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($object_type:literal) {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $fty:ty => $wire:literal
            ),* $(,)?
        }
        $(
            extra {
                $(
                    $(#[$xmeta:meta])*
                    $xvis:vis $xfield:ident : $xty:ty
                ),* $(,)?
            }
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        $vis struct $name {
            id: Option<String>,
            destroyed: bool,
            errors: $crate::object::Errors,
            $( $(#[$fmeta])* pub $field: Option<$fty>, )*
            $($( $(#[$xmeta])* $xvis $xfield: $xty, )*)?
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// New instance configured by `init`
            pub fn build(init: impl FnOnce(&mut Self)) -> Self {
                let mut object = Self::default();
                init(&mut object);
                object
            }
        }

        impl $crate::attributes::Serializable for $name {
            const OBJECT_TYPE: &'static str = $object_type;

            fn descriptors() -> &'static [$crate::attributes::FieldDescriptor] {
                const FIELDS: &[$crate::attributes::FieldDescriptor] = &[
                    $(
                        $crate::attributes::FieldDescriptor {
                            name: stringify!($field),
                            wire: $wire,
                            kind: <$fty as $crate::attributes::WireValue>::KIND,
                        },
                    )*
                ];
                FIELDS
            }

            fn field_value(&self, name: &str) -> Option<String> {
                match name {
                    $(
                        stringify!($field) => self
                            .$field
                            .as_ref()
                            .map($crate::attributes::WireValue::to_wire),
                    )*
                    _ => None,
                }
            }

            fn assign_field(&mut self, name: &str, raw: &str) -> $crate::Result<()> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = Some($crate::attributes::coerce::<$fty>($wire, raw)?);
                            Ok(())
                        }
                    )*
                    _ => Ok(()),
                }
            }
        }

        impl $crate::object::Record for $name {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: Option<String>) {
                self.id = id.filter(|id| !id.is_empty());
            }

            fn is_destroyed(&self) -> bool {
                self.destroyed
            }

            fn mark_destroyed(&mut self) {
                self.destroyed = true;
            }

            fn errors(&self) -> &$crate::object::Errors {
                &self.errors
            }

            fn errors_mut(&mut self) -> &mut $crate::object::Errors {
                &mut self.errors
            }
        }
    };
}
