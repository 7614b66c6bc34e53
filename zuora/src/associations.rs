//! Child collections of domain objects
//!
//! A [`RemoteAssociation`] is fetched from the service on first access,
//! keyed by the parent's identifier, and cached on the parent. Children the
//! caller pushes or edits are *attached*: only attached children are written
//! with the parent.

use crate::attributes::write_fields;
use crate::client::Client;
use crate::error::Result;
use crate::object::ZObject;
use crate::persistence::Persistable;
use crate::query::Zoql;
use tracing::debug;
use xmltree::{Element, XMLNode};
use zuorasoap::{api_element, object_element};

#[derive(Debug, Clone)]
pub struct RemoteAssociation<T> {
    items: Vec<T>,
    loaded: bool,
    attached: bool,
}

impl<T> Default for RemoteAssociation<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
            attached: false,
        }
    }
}

impl<T: ZObject> RemoteAssociation<T> {
    /// The children, loading them on first access.
    ///
    /// `foreign_key` is the child's wire field holding the parent id. Without
    /// a parent id nothing is fetched.
    pub fn load(
        &mut self,
        client: &Client,
        parent_id: Option<&str>,
        foreign_key: &str,
    ) -> Result<&[T]> {
        self.ensure_loaded(client, parent_id, foreign_key)?;
        Ok(&self.items)
    }

    /// Mutable access to the children; marks them attached to the next write.
    pub fn load_mut(
        &mut self,
        client: &Client,
        parent_id: Option<&str>,
        foreign_key: &str,
    ) -> Result<&mut Vec<T>> {
        self.ensure_loaded(client, parent_id, foreign_key)?;
        self.attached = true;
        Ok(&mut self.items)
    }

    /// Appends a child and attaches the collection to the next write.
    ///
    /// A persisted parent has its children loaded first, so the write carries
    /// the existing children along with the new one.
    pub fn push(
        &mut self,
        client: &Client,
        parent_id: Option<&str>,
        foreign_key: &str,
        item: T,
    ) -> Result<()> {
        self.load_mut(client, parent_id, foreign_key)?.push(item);
        Ok(())
    }

    /// Children held in memory, loaded or not
    pub fn cached(&self) -> &[T] {
        &self.items
    }

    /// Children to include in the next write of the parent
    pub fn attached(&self) -> &[T] {
        if self.attached { &self.items } else { &[] }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Forgets the cache; the next access fetches again.
    pub fn invalidate(&mut self) {
        self.items.clear();
        self.loaded = false;
        self.attached = false;
    }

    fn ensure_loaded(
        &mut self,
        client: &Client,
        parent_id: Option<&str>,
        foreign_key: &str,
    ) -> Result<()> {
        if self.loaded || self.attached {
            return Ok(());
        }
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        debug!("Loading {} for {}={}", T::OBJECT_TYPE, foreign_key, parent_id);
        let zoql = Zoql::select_all::<T>().filter(foreign_key, parent_id);
        self.items = T::query(client, &zoql)?;
        self.loaded = true;
        Ok(())
    }
}

/// `zns:<Type>` element holding the fields of one child
pub fn nested_element<T: ZObject>(child: &T) -> Element {
    let mut elem = api_element(T::OBJECT_TYPE);
    write_fields(child, &mut elem);
    for nested in child.nested_elements() {
        elem.children.push(XMLNode::Element(nested));
    }
    elem
}

/// `ons:<Type>Data` wrapping one `zns:<Type>` per child
pub fn nested_collection<T: ZObject>(children: &[T]) -> Element {
    let mut data = object_element(&format!("{}Data", T::OBJECT_TYPE));
    for child in children {
        data.children.push(XMLNode::Element(nested_element(child)));
    }
    data
}
