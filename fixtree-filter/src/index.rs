/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Filter attribute index.
//!
//! For every descriptor, the fields flagged `Filter` or `SubFilter` are
//! collected once, descending through components but not into groups. Each
//! entry is the chain of field names leading from the root to the leaf.

use fixtree_core::error::SchemaError;
use fixtree_dictionary::Dictionary;
use fixtree_dictionary::schema::{FieldHandle, MessageId, attributes};
use std::collections::HashMap;

/// Schema attributes that drive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialAttribute {
    /// The field value must be admissible for the message to pass.
    Filter,
    /// The field value correlates a message with an earlier admitted one.
    SubFilter,
}

impl SpecialAttribute {
    /// Every special attribute.
    pub const ALL: [Self; 2] = [Self::Filter, Self::SubFilter];

    /// Returns the schema attribute key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Filter => attributes::FILTER,
            Self::SubFilter => attributes::SUB_FILTER,
        }
    }
}

/// Field names from a root down to a leaf.
pub type NamePath = Vec<String>;

/// Per-descriptor multimap from special attribute to field paths.
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    entries: HashMap<MessageId, HashMap<SpecialAttribute, Vec<NamePath>>>,
}

impl FilterIndex {
    /// Scans every descriptor of `dict`.
    ///
    /// # Errors
    /// Returns a `SchemaError` if a component reference cannot be resolved.
    pub fn build(dict: &Dictionary) -> Result<Self, SchemaError> {
        let mut index = Self::default();
        for (id, _) in dict.schema().messages() {
            let mut found = HashMap::new();
            scan(dict, id, &mut Vec::new(), &mut found)?;
            if !found.is_empty() {
                index.entries.insert(id, found);
            }
        }
        Ok(index)
    }

    /// Returns the paths of fields in `id` carrying `attribute`.
    #[must_use]
    pub fn fields(&self, id: MessageId, attribute: SpecialAttribute) -> &[NamePath] {
        self.entries
            .get(&id)
            .and_then(|m| m.get(&attribute))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if any field of `id` carries a special attribute.
    #[must_use]
    pub fn has_any(&self, id: MessageId) -> bool {
        self.entries.contains_key(&id)
    }
}

fn scan(
    dict: &Dictionary,
    id: MessageId,
    prefix: &mut Vec<String>,
    found: &mut HashMap<SpecialAttribute, Vec<NamePath>>,
) -> Result<(), SchemaError> {
    for (position, field) in dict.message(id).fields.iter().enumerate() {
        if field.is_group() {
            continue;
        }
        if field.is_component() {
            let child = dict.template(FieldHandle::new(id, position as u32))?;
            prefix.push(field.name.clone());
            scan(dict, child, prefix, found)?;
            prefix.pop();
            continue;
        }
        for attribute in SpecialAttribute::ALL {
            if field.has_flag(attribute.key()) {
                let mut path = prefix.clone();
                path.push(field.name.clone());
                found.entry(attribute).or_default().push(path);
            }
        }
    }
    Ok(())
}
