/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema definitions for FIX dictionaries.
//!
//! This module defines the structures that describe a dialect at load time:
//! - [`FieldDescriptor`]: One field of a message, component or group template
//! - [`MessageDescriptor`]: A named root (message type, component or group template)
//! - [`Schema`]: Arena of every descriptor of one namespace
//!
//! Complex fields refer to their type by name, so recursive graphs never form
//! ownership cycles. Descriptors are addressed by stable [`MessageId`] handles.

use fixtree_core::error::SchemaError;
use fixtree_core::value::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Well-known descriptor and field attribute keys.
pub mod attributes {
    /// Message attribute: wire MsgType (tag 35) code.
    pub const MESSAGE_TYPE: &str = "MessageType";
    /// Message attribute: `true` for session-level messages.
    pub const IS_ADMIN: &str = "IsAdmin";
    /// Field attribute: the field carries a filter key.
    pub const FILTER: &str = "Filter";
    /// Field attribute: the field carries a sub-filter key.
    pub const SUB_FILTER: &str = "SubFilter";
    /// Field attribute: timestamps are always encoded to whole seconds.
    pub const SECONDS_ONLY: &str = "SecondsOnly";
}

/// Name of the standard header descriptor and of its pseudo-field.
pub const HEADER: &str = "header";

/// Name of the standard trailer descriptor and of its pseudo-field.
pub const TRAILER: &str = "trailer";

/// Stable handle of a message descriptor inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct MessageId(u32);

impl MessageId {
    /// Returns the arena slot of this descriptor.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable handle of a field: its owning descriptor and declaration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldHandle {
    /// Owning descriptor.
    pub message: MessageId,
    /// Position in the owner's field list.
    pub position: u32,
}

impl FieldHandle {
    /// Creates a field handle.
    #[inline]
    #[must_use]
    pub const fn new(message: MessageId, position: u32) -> Self {
        Self { message, position }
    }
}

/// Structural role of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Plain field.
    #[default]
    Field,
    /// Reusable, non-repeating bundle inlined on the wire.
    Component,
    /// Repeating group.
    Group,
}

/// One declared enum value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Symbolic name (e.g. `Buy`).
    pub name: String,
    /// Wire value (e.g. `1`).
    pub value: String,
}

/// Definition of one field of a message, component or group template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its owner.
    pub name: String,
    /// Name of the descriptor that is the type of a complex field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Wire tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<u32>,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the field repeats.
    #[serde(default)]
    pub collection: bool,
    /// Whether the field is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Structural role.
    #[serde(default)]
    pub entity: EntityKind,
    /// Declared enum values, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EnumValue>,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Field description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Creates a plain tagged field.
    ///
    /// # Arguments
    /// * `name` - The field name
    /// * `tag` - The wire tag
    /// * `value_type` - The declared scalar type
    #[must_use]
    pub fn field(name: impl Into<String>, tag: u32, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            reference: None,
            tag: Some(tag),
            value_type,
            collection: false,
            required: false,
            entity: EntityKind::Field,
            values: Vec::new(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    /// Creates a component field whose children are the fields of `reference`.
    #[must_use]
    pub fn component(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            tag: None,
            value_type: ValueType::Complex,
            entity: EntityKind::Component,
            ..Self::field(name, 0, ValueType::Complex)
        }
    }

    /// Creates a repeating group counted by `tag`, instances typed by `reference`.
    #[must_use]
    pub fn group(name: impl Into<String>, tag: u32, reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            collection: true,
            entity: EntityKind::Group,
            ..Self::field(name, tag, ValueType::Complex)
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as a collection.
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Clears the wire tag.
    #[must_use]
    pub fn untagged(mut self) -> Self {
        self.tag = None;
        self
    }

    /// Adds an enum value.
    ///
    /// # Arguments
    /// * `value` - The wire value
    /// * `name` - The symbolic name
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>, name: impl Into<String>) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true for components and groups.
    #[inline]
    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.value_type == ValueType::Complex
    }

    /// Returns true if the field declares enum values.
    #[inline]
    #[must_use]
    pub fn is_enum(&self) -> bool {
        !self.values.is_empty()
    }

    /// Returns true for complex, repeating fields.
    #[inline]
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.is_complex() && self.collection
    }

    /// Returns true for complex, non-repeating fields.
    #[inline]
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.is_complex() && !self.collection
    }

    /// Returns the symbolic name declared for a wire value.
    #[must_use]
    pub fn enum_name(&self, value: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    /// Returns the wire value declared for a symbolic name.
    #[must_use]
    pub fn enum_value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns true if the attribute is present and not `false`.
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.attribute(key)
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }
}

/// A named root: message type, component template, or group template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Descriptor name.
    pub name: String,
    /// Namespace, assigned by the owning schema.
    #[serde(default)]
    pub namespace: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Descriptor description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MessageDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            fields: Vec::new(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the MsgType code.
    #[must_use]
    pub fn with_msg_type(self, code: impl Into<String>) -> Self {
        self.with_attribute(attributes::MESSAGE_TYPE, code)
    }

    /// Marks the descriptor as a session-level message.
    #[must_use]
    pub fn admin(self) -> Self {
        self.with_attribute(attributes::IS_ADMIN, "true")
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns the MsgType code, if declared.
    #[must_use]
    pub fn msg_type(&self) -> Option<&str> {
        self.attribute(attributes::MESSAGE_TYPE)
    }

    /// Returns true for session-level messages.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.attribute(attributes::IS_ADMIN)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "Y")
    }

    /// Finds a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Serialized form of a [`Schema`]; lookup tables are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaRepr {
    namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    messages: Vec<MessageDescriptor>,
}

/// Every descriptor of one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr", into = "SchemaRepr")]
pub struct Schema {
    namespace: String,
    uri: Option<String>,
    messages: Vec<MessageDescriptor>,
    by_name: HashMap<String, MessageId>,
    by_msg_type: HashMap<String, MessageId>,
}

impl Schema {
    /// Creates an empty schema.
    ///
    /// # Arguments
    /// * `namespace` - The dialect namespace (e.g. `FIX44`)
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            uri: None,
            messages: Vec::new(),
            by_name: HashMap::new(),
            by_msg_type: HashMap::new(),
        }
    }

    /// Sets the URI the schema was loaded from.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Adds a descriptor, stamping it with this schema's namespace.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateMessage` if the name is taken.
    pub fn add_message(&mut self, mut message: MessageDescriptor) -> Result<MessageId, SchemaError> {
        if self.by_name.contains_key(&message.name) {
            return Err(SchemaError::DuplicateMessage(message.name));
        }
        let id = MessageId(self.messages.len() as u32);
        message.namespace.clone_from(&self.namespace);
        self.by_name.insert(message.name.clone(), id);
        if let Some(code) = message.msg_type() {
            self.by_msg_type.insert(code.to_string(), id);
        }
        self.messages.push(message);
        Ok(id)
    }

    /// Builder-style [`add_message`](Self::add_message).
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateMessage` if the name is taken.
    pub fn with_message(mut self, message: MessageDescriptor) -> Result<Self, SchemaError> {
        self.add_message(message)?;
        Ok(self)
    }

    /// Returns the namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the URI the schema was loaded from.
    #[inline]
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Returns the descriptor behind a handle.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this schema.
    #[inline]
    #[must_use]
    pub fn message(&self, id: MessageId) -> &MessageDescriptor {
        &self.messages[id.index()]
    }

    /// Returns the field behind a handle.
    ///
    /// # Panics
    /// Panics if `handle` was not issued by this schema.
    #[inline]
    #[must_use]
    pub fn field(&self, handle: FieldHandle) -> &FieldDescriptor {
        &self.message(handle.message).fields[handle.position as usize]
    }

    /// Looks up a descriptor handle by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<MessageId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn message_by_name(&self, name: &str) -> Option<&MessageDescriptor> {
        self.id_of(name).map(|id| self.message(id))
    }

    /// Looks up a descriptor handle by MsgType code.
    #[must_use]
    pub fn id_of_msg_type(&self, code: &str) -> Option<MessageId> {
        self.by_msg_type.get(code).copied()
    }

    /// Resolves the descriptor a complex field refers to.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the field has no reference or the reference
    /// names no descriptor.
    pub fn resolve(&self, owner: MessageId, field: &FieldDescriptor) -> Result<MessageId, SchemaError> {
        let reference = field
            .reference
            .as_deref()
            .ok_or_else(|| SchemaError::MissingReference {
                message: self.message(owner).name.clone(),
                field: field.name.clone(),
            })?;
        self.id_of(reference)
            .ok_or_else(|| SchemaError::UnknownReference {
                message: self.message(owner).name.clone(),
                field: field.name.clone(),
                reference: reference.to_string(),
            })
    }

    /// Returns the header descriptor, if declared.
    #[must_use]
    pub fn header(&self) -> Option<MessageId> {
        self.id_of(HEADER)
    }

    /// Returns the trailer descriptor, if declared.
    #[must_use]
    pub fn trailer(&self) -> Option<MessageId> {
        self.id_of(TRAILER)
    }

    /// Returns an iterator over all descriptors with their handles.
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &MessageDescriptor)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i as u32), m))
    }

    /// Returns the number of descriptors.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the schema holds no descriptor.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl TryFrom<SchemaRepr> for Schema {
    type Error = SchemaError;

    fn try_from(repr: SchemaRepr) -> Result<Self, Self::Error> {
        let mut schema = Schema::new(repr.namespace);
        schema.uri = repr.uri;
        for message in repr.messages {
            schema.add_message(message)?;
        }
        Ok(schema)
    }
}

impl From<Schema> for SchemaRepr {
    fn from(schema: Schema) -> Self {
        Self {
            namespace: schema.namespace,
            uri: schema.uri,
            messages: schema.messages,
        }
    }
}
