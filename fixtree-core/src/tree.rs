/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Generic message tree.
//!
//! A [`MessageTree`] is the schema-typed, dynamically shaped representation
//! of one FIX message (or one component/group instance inside it). Field
//! values are a tagged union ([`FieldValue`]) so every consumer matches
//! exhaustively on the variant instead of testing runtime types.
//!
//! Nested trees are owned by the slot that holds them; `Clone` is a deep copy.

use crate::value::Scalar;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Value stored under a field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Leaf value.
    Scalar(Scalar),
    /// Component node, inlined on the wire.
    Message(MessageTree),
    /// Repeating group instances, in wire order.
    Group(Vec<MessageTree>),
    /// Collection of leaf values.
    Scalars(Vec<Scalar>),
}

impl FieldValue {
    /// Returns the scalar, if this is a Scalar variant.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested tree, if this is a Message variant.
    #[must_use]
    pub const fn as_message(&self) -> Option<&MessageTree> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the group instances, if this is a Group variant.
    #[must_use]
    pub fn as_group(&self) -> Option<&[MessageTree]> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.value_type().as_str(),
            Self::Message(_) => "message",
            Self::Group(_) => "group",
            Self::Scalars(_) => "list",
        }
    }
}

macro_rules! field_value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

field_value_from_scalar! {
    bool, i8, i16, i32, i64, f32, f64, char, String, &str,
    rust_decimal::Decimal,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<MessageTree> for FieldValue {
    fn from(value: MessageTree) -> Self {
        Self::Message(value)
    }
}

impl From<Vec<MessageTree>> for FieldValue {
    fn from(value: Vec<MessageTree>) -> Self {
        Self::Group(value)
    }
}

impl From<Vec<Scalar>> for FieldValue {
    fn from(value: Vec<Scalar>) -> Self {
        Self::Scalars(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Message(m) => write!(f, "{}", m),
            Self::Group(g) => {
                f.write_str("[")?;
                for (i, m) in g.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                f.write_str("]")
            }
            Self::Scalars(v) => {
                f.write_str("[")?;
                for (i, s) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", s)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Side information attached to a message tree.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Raw wire bytes the tree was decoded from.
    pub raw: Option<Bytes>,
    /// Declared protocol (BeginString).
    pub protocol: Option<String>,
    /// URI of the dictionary the tree was decoded against.
    pub dictionary_uri: Option<String>,
    /// Whether the message is session-level.
    pub admin: bool,
    /// Tags dropped as unknown by a tolerant decode, in arrival order.
    pub rejected_tags: Vec<u32>,
}

/// Generic, schema-described message node.
#[derive(Debug, Clone, Default)]
pub struct MessageTree {
    namespace: String,
    name: String,
    fields: BTreeMap<String, FieldValue>,
    metadata: Metadata,
}

impl MessageTree {
    /// Creates an empty tree for the given descriptor.
    ///
    /// # Arguments
    /// * `namespace` - Schema namespace
    /// * `name` - Message descriptor name
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            fields: BTreeMap::new(),
            metadata: Metadata::default(),
        }
    }

    /// Returns the schema namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the message descriptor name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the metadata record.
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the metadata record for modification.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Gets a field value for modification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Gets a leaf value.
    #[must_use]
    pub fn get_scalar(&self, name: &str) -> Option<&Scalar> {
        self.get(name).and_then(FieldValue::as_scalar)
    }

    /// Gets a string leaf value.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_scalar(name).and_then(Scalar::as_str)
    }

    /// Gets a nested component tree.
    #[must_use]
    pub fn get_message(&self, name: &str) -> Option<&MessageTree> {
        self.get(name).and_then(FieldValue::as_message)
    }

    /// Gets the instances of a repeating group.
    #[must_use]
    pub fn get_group(&self, name: &str) -> Option<&[MessageTree]> {
        self.get(name).and_then(FieldValue::as_group)
    }

    /// Returns the nested tree stored under `name`, creating it if absent.
    ///
    /// Returns `None` if the slot already holds a non-message value.
    pub fn component_mut(
        &mut self,
        name: &str,
        create: impl FnOnce() -> MessageTree,
    ) -> Option<&mut MessageTree> {
        match self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Message(create()))
        {
            FieldValue::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Appends an instance to the group stored under `name`, creating it if absent.
    ///
    /// Returns false, leaving the tree untouched, if the slot holds a non-group value.
    pub fn push_group(&mut self, name: &str, instance: MessageTree) -> bool {
        match self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Group(Vec::new()))
        {
            FieldValue::Group(g) => {
                g.push(instance);
                true
            }
            _ => false,
        }
    }

    /// Returns an iterator over fields, ordered by name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    /// Returns an iterator over field names, ordered by name.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Metadata is deliberately left out: two trees are equal when they carry the
// same fields, wherever they came from.
impl PartialEq for MessageTree {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name && self.fields == other.fields
    }
}

impl<'a> IntoIterator for &'a MessageTree {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for MessageTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}
