/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Wire-level message containers.
//!
//! A [`WireMessage`] holds three [`FieldMap`] sections: header, body and
//! trailer. Each map keeps its entries in insertion order; an entry is either
//! a plain field or a repeating group whose instances are field maps in turn.
//!
//! A message may also carry a [`FieldOrder`]. When present, serialization
//! sorts the top-level entries of each section by the order's tag lists.

use crate::decoder::SOH;
use crate::encoder::{DEFAULT_BEGIN_STRING, Encoder};
use bytes::BytesMut;
use fixtree_core::field::tags;
use std::sync::Arc;

/// A single `tag=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireField {
    /// Field tag.
    pub tag: u32,
    /// Field value as text.
    pub value: String,
}

/// A repeating group: count tag, delimiter tag, and its instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireGroup {
    /// Tag carrying the number of instances.
    pub tag: u32,
    /// Tag that opens every instance.
    pub delimiter: u32,
    /// The instances, in wire order.
    pub instances: Vec<FieldMap>,
}

impl WireGroup {
    /// Creates an empty group.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, delimiter: u32) -> Self {
        Self {
            tag,
            delimiter,
            instances: Vec::new(),
        }
    }

    /// Appends an instance.
    #[inline]
    pub fn push(&mut self, instance: FieldMap) {
        self.instances.push(instance);
    }

    /// Appends an instance, builder style.
    #[inline]
    #[must_use]
    pub fn with_instance(mut self, instance: FieldMap) -> Self {
        self.instances.push(instance);
        self
    }

    /// Returns the number of instances.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if the group has no instances.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// One entry of a [`FieldMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A plain field.
    Field(WireField),
    /// A repeating group.
    Group(WireGroup),
}

impl Entry {
    /// Returns the tag of the entry; for groups this is the count tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Self::Field(f) => f.tag,
            Self::Group(g) => g.tag,
        }
    }
}

/// Ordered collection of fields and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<Entry>,
}

impl FieldMap {
    /// Creates an empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a field, even if the tag is already present.
    pub fn push_field(&mut self, tag: u32, value: impl Into<String>) {
        self.entries.push(Entry::Field(WireField {
            tag,
            value: value.into(),
        }));
    }

    /// Replaces the value of the first field with `tag`, or appends it.
    pub fn set_field(&mut self, tag: u32, value: impl Into<String>) {
        let value = value.into();
        let existing = self.entries.iter_mut().find_map(|e| match e {
            Entry::Field(f) if f.tag == tag => Some(f),
            _ => None,
        });
        match existing {
            Some(field) => field.value = value,
            None => self.entries.push(Entry::Field(WireField { tag, value })),
        }
    }

    /// Appends a field, builder style.
    #[must_use]
    pub fn with_field(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.push_field(tag, value);
        self
    }

    /// Appends a group.
    #[inline]
    pub fn push_group(&mut self, group: WireGroup) {
        self.entries.push(Entry::Group(group));
    }

    /// Appends a group, builder style.
    #[must_use]
    pub fn with_group(mut self, group: WireGroup) -> Self {
        self.push_group(group);
        self
    }

    /// Returns the value of the first field with `tag`.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.entries.iter().find_map(|e| match e {
            Entry::Field(f) if f.tag == tag => Some(f.value.as_str()),
            _ => None,
        })
    }

    /// Returns the first group with count tag `tag`.
    #[must_use]
    pub fn group(&self, tag: u32) -> Option<&WireGroup> {
        self.entries.iter().find_map(|e| match e {
            Entry::Group(g) if g.tag == tag => Some(g),
            _ => None,
        })
    }

    /// Returns true if any entry has `tag`.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.entries.iter().any(|e| e.tag() == tag)
    }

    /// Removes every entry with `tag`; returns true if any was removed.
    pub fn remove(&mut self, tag: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.tag() != tag);
        self.entries.len() != before
    }

    /// Returns the entries in insertion order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns an iterator over the entries.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Returns the top-level tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(Entry::tag)
    }

    /// Returns the number of top-level entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries sorted by `order`.
    ///
    /// Listed tags come first, in list order; unlisted entries follow in
    /// insertion order.
    #[must_use]
    pub fn ordered(&self, order: &[u32]) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| {
            order
                .iter()
                .position(|&t| t == e.tag())
                .unwrap_or(usize::MAX)
        });
        sorted
    }

    /// Writes the entries, sorted by `order` when given.
    pub fn write_to(&self, encoder: &mut Encoder, order: Option<&[u32]>) {
        match order {
            Some(order) => write_entries(self.ordered(order), encoder),
            None => write_entries(self.entries.iter(), encoder),
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn write_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>, encoder: &mut Encoder) {
    for entry in entries {
        match entry {
            Entry::Field(field) => encoder.put_str(field.tag, &field.value),
            Entry::Group(group) => {
                encoder.put_uint(group.tag, group.instances.len() as u64);
                for instance in &group.instances {
                    write_entries(instance.iter(), encoder);
                }
            }
        }
    }
}

/// Per-section tag lists used to order serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOrder {
    /// Header tag order.
    pub header: Arc<[u32]>,
    /// Body tag order.
    pub body: Arc<[u32]>,
    /// Trailer tag order.
    pub trailer: Arc<[u32]>,
}

impl FieldOrder {
    /// Creates an order from three tag lists.
    #[must_use]
    pub fn new(header: Arc<[u32]>, body: Arc<[u32]>, trailer: Arc<[u32]>) -> Self {
        Self {
            header,
            body,
            trailer,
        }
    }

    /// Records the current top-level order of every section of `message`.
    #[must_use]
    pub fn capture(message: &WireMessage) -> Self {
        Self {
            header: message.header.tags().collect(),
            body: message.body.tags().collect(),
            trailer: message.trailer.tags().collect(),
        }
    }
}

/// A message split into header, body and trailer sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMessage {
    header: FieldMap,
    body: FieldMap,
    trailer: FieldMap,
    order: Option<FieldOrder>,
}

impl WireMessage {
    /// Creates an empty message without an order.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            header: FieldMap::new(),
            body: FieldMap::new(),
            trailer: FieldMap::new(),
            order: None,
        }
    }

    /// Returns the header section.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &FieldMap {
        &self.header
    }

    /// Returns the header section for modification.
    #[inline]
    pub fn header_mut(&mut self) -> &mut FieldMap {
        &mut self.header
    }

    /// Returns the body section.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> &FieldMap {
        &self.body
    }

    /// Returns the body section for modification.
    #[inline]
    pub fn body_mut(&mut self) -> &mut FieldMap {
        &mut self.body
    }

    /// Returns the trailer section.
    #[inline]
    #[must_use]
    pub const fn trailer(&self) -> &FieldMap {
        &self.trailer
    }

    /// Returns the trailer section for modification.
    #[inline]
    pub fn trailer_mut(&mut self) -> &mut FieldMap {
        &mut self.trailer
    }

    /// Returns the BeginString from the header, if set.
    #[must_use]
    pub fn begin_string(&self) -> Option<&str> {
        self.header.get(tags::BEGIN_STRING)
    }

    /// Returns the MsgType from the header, if set.
    #[must_use]
    pub fn msg_type(&self) -> Option<&str> {
        self.header.get(tags::MSG_TYPE)
    }

    /// Returns the attached order.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> Option<&FieldOrder> {
        self.order.as_ref()
    }

    /// Attaches or clears the order.
    #[inline]
    pub fn set_order(&mut self, order: Option<FieldOrder>) {
        self.order = order;
    }

    /// Attaches an order, builder style.
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: FieldOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Writes all sections into `encoder`, leaving out the framing tags.
    ///
    /// MsgType is written first so the framed message stays valid whatever
    /// the header order says.
    pub fn write_to(&self, encoder: &mut Encoder) {
        if let Some(msg_type) = self.msg_type() {
            encoder.put_str(tags::MSG_TYPE, msg_type);
        }

        let order = self.order.as_ref();
        let header = match order {
            Some(o) => self.header.ordered(&o.header),
            None => self.header.iter().collect(),
        };
        write_entries(
            header.into_iter().filter(|e| !is_framing(e.tag())),
            encoder,
        );

        self.body.write_to(encoder, order.map(|o| &*o.body));

        let trailer = match order {
            Some(o) => self.trailer.ordered(&o.trailer),
            None => self.trailer.iter().collect(),
        };
        write_entries(
            trailer.into_iter().filter(|e| !is_framing(e.tag())),
            encoder,
        );
    }

    /// Serializes the message with SOH delimiters.
    ///
    /// The BeginString comes from the header, falling back to `FIX.4.4`.
    #[must_use]
    pub fn to_bytes(&self) -> BytesMut {
        self.to_bytes_with_delimiter(SOH)
    }

    /// Serializes the message with a custom field delimiter.
    #[must_use]
    pub fn to_bytes_with_delimiter(&self, delimiter: u8) -> BytesMut {
        let begin_string = self.begin_string().unwrap_or(DEFAULT_BEGIN_STRING);
        let mut encoder = Encoder::new(begin_string).with_delimiter(delimiter);
        self.write_to(&mut encoder);
        encoder.finish()
    }

    /// Serializes only the body section.
    #[must_use]
    pub fn body_bytes(&self, delimiter: u8) -> BytesMut {
        let mut encoder = Encoder::default().with_delimiter(delimiter);
        self.body
            .write_to(&mut encoder, self.order.as_ref().map(|o| &*o.body));
        encoder.into_body()
    }
}

const fn is_framing(tag: u32) -> bool {
    matches!(
        tag,
        tags::BEGIN_STRING | tags::BODY_LENGTH | tags::CHECK_SUM | tags::MSG_TYPE
    )
}
