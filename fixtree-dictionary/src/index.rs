/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag lookup tables.
//!
//! For every descriptor the index maps a wire tag to the field that owns it
//! and to the chain of components leading to that field. Components are
//! descended into; groups are recorded but not entered, since their members
//! are indexed under the group's own template.
//!
//! The same tag may mean different things in different messages, so entries
//! are always keyed by `(tag, root)`.

use crate::schema::{FieldHandle, MessageId, Schema};
use fixtree_core::error::SchemaError;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// Components traversed from a root to a field.
pub type FieldPath = SmallVec<[FieldHandle; 4]>;

/// Where a tag lives inside one root descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The field owning the tag.
    pub field: FieldHandle,
    /// Intermediate component fields, outermost first.
    pub path: FieldPath,
}

/// `(tag, root)` lookup table for a whole schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    entries: HashMap<(u32, MessageId), IndexEntry>,
}

impl SchemaIndex {
    /// Builds the index with one depth-first walk per descriptor.
    ///
    /// # Errors
    /// Returns a `SchemaError` if a complex field's reference cannot be
    /// resolved, or if a chain of components loops back on itself.
    pub fn build(schema: &Schema) -> Result<Self, SchemaError> {
        let mut index = Self::default();
        for (root, _) in schema.messages() {
            let mut walk = Walk {
                schema,
                root,
                path: FieldPath::new(),
                visiting: vec![root],
                entries: &mut index.entries,
            };
            walk.descend(root)?;
        }
        Ok(index)
    }

    /// Looks up the owner of `tag` inside `root`.
    #[inline]
    #[must_use]
    pub fn get(&self, tag: u32, root: MessageId) -> Option<&IndexEntry> {
        self.entries.get(&(tag, root))
    }

    /// Returns true if `tag` belongs to `root`.
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: u32, root: MessageId) -> bool {
        self.entries.contains_key(&(tag, root))
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Walk<'a> {
    schema: &'a Schema,
    root: MessageId,
    path: FieldPath,
    visiting: Vec<MessageId>,
    entries: &'a mut HashMap<(u32, MessageId), IndexEntry>,
}

impl Walk<'_> {
    fn descend(&mut self, current: MessageId) -> Result<(), SchemaError> {
        let schema = self.schema;
        for (position, field) in schema.message(current).fields.iter().enumerate() {
            let handle = FieldHandle::new(current, position as u32);

            if let Some(tag) = field.tag {
                match self.entries.entry((tag, self.root)) {
                    Entry::Vacant(slot) => {
                        slot.insert(IndexEntry {
                            field: handle,
                            path: self.path.clone(),
                        });
                    }
                    Entry::Occupied(existing) => {
                        let first = schema.field(existing.get().field);
                        warn!(
                            tag,
                            root = %schema.message(self.root).name,
                            kept = %first.name,
                            shadowed = %field.name,
                            "tag declared twice in one message, keeping first declaration"
                        );
                    }
                }
            }

            if field.is_group() {
                // Members are indexed under the template itself; only check it exists.
                schema.resolve(current, field)?;
            } else if field.is_component() {
                let child = schema.resolve(current, field)?;
                if self.visiting.contains(&child) {
                    return Err(SchemaError::Cycle {
                        message: schema.message(self.root).name.clone(),
                        path: self.render_path(handle),
                    });
                }
                self.visiting.push(child);
                self.path.push(handle);
                self.descend(child)?;
                self.path.pop();
                self.visiting.pop();
            }
        }
        Ok(())
    }

    fn render_path(&self, last: FieldHandle) -> String {
        let mut rendered = self.schema.message(self.root).name.clone();
        for handle in self.path.iter().chain(std::iter::once(&last)) {
            rendered.push('.');
            rendered.push_str(&self.schema.field(*handle).name);
        }
        rendered
    }
}
