/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Loaded dictionary.
//!
//! A [`Dictionary`] owns a [`Schema`] together with every table derived from
//! it: the tag index, the delimiter tag of each group and the flattened
//! declaration order of each descriptor. It is built once and never mutated
//! afterwards, so it can be shared across threads behind an `Arc`.

use crate::index::{IndexEntry, SchemaIndex};
use crate::schema::{FieldHandle, HEADER, MessageDescriptor, MessageId, Schema, TRAILER};
use fixtree_core::error::SchemaError;
use fixtree_core::tree::MessageTree;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable schema plus derived lookup tables.
#[derive(Debug)]
pub struct Dictionary {
    schema: Schema,
    index: SchemaIndex,
    delimiters: HashMap<FieldHandle, u32>,
    orders: Vec<Arc<[u32]>>,
}

impl Dictionary {
    /// Builds every lookup table for `schema`.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the schema has unresolved references or
    /// component cycles.
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        let index = SchemaIndex::build(&schema)?;

        let mut delimiters = HashMap::new();
        for (id, message) in schema.messages() {
            for (position, field) in message.fields.iter().enumerate() {
                if !field.is_group() {
                    continue;
                }
                let template = schema.resolve(id, field)?;
                if let Some(tag) = first_tag(&schema, template)? {
                    delimiters.insert(FieldHandle::new(id, position as u32), tag);
                }
            }
        }

        let mut orders: Vec<Arc<[u32]>> = Vec::with_capacity(schema.len());
        for (id, _) in schema.messages() {
            let mut tags = Vec::new();
            flatten(&schema, id, &mut tags)?;
            orders.push(Arc::from(tags));
        }

        Ok(Self {
            schema,
            index,
            delimiters,
            orders,
        })
    }

    /// Returns the underlying schema.
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the tag index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &SchemaIndex {
        &self.index
    }

    /// Returns the namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.schema.namespace()
    }

    /// Returns the descriptor behind a handle.
    #[inline]
    #[must_use]
    pub fn message(&self, id: MessageId) -> &MessageDescriptor {
        self.schema.message(id)
    }

    /// Looks up the owner of `tag` inside `root`.
    #[inline]
    #[must_use]
    pub fn lookup(&self, tag: u32, root: MessageId) -> Option<&IndexEntry> {
        self.index.get(tag, root)
    }

    /// Resolves a descriptor by name.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownMessage` if no descriptor has that name.
    pub fn message_id(&self, name: &str) -> Result<MessageId, SchemaError> {
        self.schema
            .id_of(name)
            .ok_or_else(|| SchemaError::UnknownMessage(name.to_string()))
    }

    /// Resolves a descriptor by MsgType code.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownMsgType` if no descriptor declares that code.
    pub fn message_for_msg_type(&self, code: &str) -> Result<MessageId, SchemaError> {
        self.schema
            .id_of_msg_type(code)
            .ok_or_else(|| SchemaError::UnknownMsgType(code.to_string()))
    }

    /// Returns the header descriptor, if declared.
    #[inline]
    #[must_use]
    pub fn header(&self) -> Option<MessageId> {
        self.schema.header()
    }

    /// Returns the trailer descriptor, if declared.
    #[inline]
    #[must_use]
    pub fn trailer(&self) -> Option<MessageId> {
        self.schema.trailer()
    }

    /// Resolves the template of a complex field.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the reference cannot be resolved.
    pub fn template(&self, handle: FieldHandle) -> Result<MessageId, SchemaError> {
        self.schema
            .resolve(handle.message, self.schema.field(handle))
    }

    /// Returns the delimiter tag of a group field.
    ///
    /// The delimiter is the first tag reachable from the group's first member,
    /// descending through components.
    #[inline]
    #[must_use]
    pub fn delimiter(&self, group: FieldHandle) -> Option<u32> {
        self.delimiters.get(&group).copied()
    }

    /// Returns the tags of a descriptor flattened in declaration order.
    ///
    /// Components are expanded in place; a group contributes its own tag
    /// only. The `header` and `trailer` pseudo-fields are left out.
    #[must_use]
    pub fn field_order(&self, id: MessageId) -> Arc<[u32]> {
        Arc::clone(&self.orders[id.index()])
    }

    /// Creates an empty tree for the named descriptor.
    ///
    /// # Errors
    /// Returns `SchemaError::UnknownMessage` if no descriptor has that name.
    pub fn new_message(&self, name: &str) -> Result<MessageTree, SchemaError> {
        let id = self.message_id(name)?;
        Ok(self.tree_for(id))
    }

    /// Creates an empty tree for a descriptor handle, stamped with its metadata.
    #[must_use]
    pub fn tree_for(&self, id: MessageId) -> MessageTree {
        let descriptor = self.schema.message(id);
        let mut tree = MessageTree::new(self.schema.namespace(), descriptor.name.as_str());
        let metadata = tree.metadata_mut();
        metadata.admin = descriptor.is_admin();
        metadata.dictionary_uri = self.schema.uri().map(str::to_string);
        tree
    }
}

fn first_tag(schema: &Schema, template: MessageId) -> Result<Option<u32>, SchemaError> {
    let Some(first) = schema.message(template).fields.first() else {
        return Ok(None);
    };
    if first.is_component() {
        let child = schema.resolve(template, first)?;
        return first_tag(schema, child);
    }
    Ok(first.tag)
}

fn flatten(schema: &Schema, id: MessageId, out: &mut Vec<u32>) -> Result<(), SchemaError> {
    for field in &schema.message(id).fields {
        if field.name == HEADER || field.name == TRAILER {
            continue;
        }
        if field.is_component() {
            if let Some(tag) = field.tag {
                push_unique(out, tag);
            }
            let child = schema.resolve(id, field)?;
            flatten(schema, child, out)?;
        } else if let Some(tag) = field.tag {
            push_unique(out, tag);
        }
    }
    Ok(())
}

fn push_unique(out: &mut Vec<u32>, tag: u32) {
    if !out.contains(&tag) {
        out.push(tag);
    }
}
