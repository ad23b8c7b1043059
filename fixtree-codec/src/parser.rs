/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema-aware structuring of flat field sequences.
//!
//! The tokenizer yields fields in wire order with no notion of nesting. This
//! module splits them into header, body and trailer sections and gathers
//! repeating groups into instances:
//!
//! - a group starts at its count tag;
//! - every instance starts at the group's delimiter tag;
//! - an instance closes on a tag it already holds, or on a tag owned by an
//!   enclosing scope (the message, header, trailer or an outer group), which
//!   hands control back to that scope;
//! - a tag unknown to every scope stays in the current instance, where the
//!   tree decoder drops or rejects it against the group's template.

use fixtree_core::error::DecodeError;
use fixtree_core::field::{FieldRef, tags};
use fixtree_dictionary::Dictionary;
use fixtree_dictionary::schema::{FieldHandle, MessageId};
use fixtree_tagvalue::message::{FieldMap, WireGroup, WireMessage};
use smallvec::SmallVec;
use tracing::{debug, warn};

#[derive(Clone, Copy)]
enum Section {
    Header,
    Body,
    Trailer,
}

/// Structures `fields` as a message of descriptor `root`.
///
/// # Errors
/// Returns `DecodeError` if a value is not UTF-8, a group count is not a
/// non-negative integer, a non-empty group has no delimiter, or a group
/// template cannot be resolved.
pub fn parse(
    dict: &Dictionary,
    root: MessageId,
    fields: &[FieldRef<'_>],
) -> Result<WireMessage, DecodeError> {
    let mut parser = Parser {
        dict,
        root,
        fields,
        pos: 0,
        scopes: SmallVec::new(),
    };
    let mut message = WireMessage::new();

    while let Some(tag) = parser.peek() {
        let (section, scope) = parser.classify(tag);
        let map = match section {
            Section::Header => message.header_mut(),
            Section::Body => message.body_mut(),
            Section::Trailer => message.trailer_mut(),
        };
        parser.parse_entry(scope, map)?;
    }
    Ok(message)
}

struct Parser<'d, 'f, 'a> {
    dict: &'d Dictionary,
    root: MessageId,
    fields: &'f [FieldRef<'a>],
    pos: usize,
    scopes: SmallVec<[MessageId; 4]>,
}

impl Parser<'_, '_, '_> {
    fn peek(&self) -> Option<u32> {
        self.fields.get(self.pos).map(|f| f.tag)
    }

    fn classify(&self, tag: u32) -> (Section, Option<MessageId>) {
        let index = self.dict.index();
        if index.contains(tag, self.root) {
            return (Section::Body, Some(self.root));
        }
        if let Some(header) = self.dict.header().filter(|&h| index.contains(tag, h)) {
            return (Section::Header, Some(header));
        }
        if let Some(trailer) = self.dict.trailer().filter(|&t| index.contains(tag, t)) {
            return (Section::Trailer, Some(trailer));
        }
        match tag {
            tags::BEGIN_STRING | tags::BODY_LENGTH | tags::MSG_TYPE => (Section::Header, None),
            tags::CHECK_SUM => (Section::Trailer, None),
            _ => (Section::Body, None),
        }
    }

    /// Returns true if `tag` belongs to the message or to an open group.
    fn is_owned_outside(&self, tag: u32) -> bool {
        if matches!(
            tag,
            tags::BEGIN_STRING | tags::BODY_LENGTH | tags::MSG_TYPE | tags::CHECK_SUM
        ) {
            return true;
        }
        let index = self.dict.index();
        index.contains(tag, self.root)
            || self.dict.header().is_some_and(|h| index.contains(tag, h))
            || self.dict.trailer().is_some_and(|t| index.contains(tag, t))
            || self.scopes.iter().any(|&scope| index.contains(tag, scope))
    }

    fn parse_entry(
        &mut self,
        scope: Option<MessageId>,
        map: &mut FieldMap,
    ) -> Result<(), DecodeError> {
        let dict = self.dict;
        let field = self.fields[self.pos];
        self.pos += 1;
        let value = field.as_str()?;

        let group = scope
            .and_then(|scope| dict.lookup(field.tag, scope))
            .map(|entry| entry.field)
            .filter(|&handle| dict.schema().field(handle).is_group());
        if let Some(handle) = group {
            let group = self.parse_group(handle, field.tag, value)?;
            map.push_group(group);
            return Ok(());
        }

        map.push_field(field.tag, value);
        Ok(())
    }

    fn parse_group(
        &mut self,
        handle: FieldHandle,
        tag: u32,
        raw_count: &str,
    ) -> Result<WireGroup, DecodeError> {
        let dict = self.dict;
        let owner = &dict.message(handle.message).name;
        let descriptor = dict.schema().field(handle);
        let count: usize = raw_count.parse().map_err(|_| DecodeError::InvalidFieldValue {
            tag,
            field: descriptor.name.clone(),
            message: owner.clone(),
            value: raw_count.to_string(),
            reason: "group count must be a non-negative integer".to_string(),
        })?;

        let template = dict.template(handle)?;
        let Some(delimiter) = dict.delimiter(handle) else {
            if count > 0 {
                return Err(DecodeError::StructureMismatch {
                    tag,
                    message: owner.clone(),
                    reason: format!("group {} has no delimiter tag", descriptor.name),
                });
            }
            return Ok(WireGroup::new(tag, 0));
        };

        let mut group = WireGroup::new(tag, delimiter);
        self.scopes.push(template);
        while self.peek() == Some(delimiter) {
            let mut instance = FieldMap::new();
            let mut seen: SmallVec<[u32; 16]> = SmallVec::new();
            while let Some(next) = self.peek() {
                if dict.index().contains(next, template) {
                    if seen.contains(&next) {
                        break;
                    }
                    seen.push(next);
                } else if self.is_owned_outside(next) {
                    break;
                }
                self.parse_entry(Some(template), &mut instance)?;
            }
            if instance.is_empty() {
                break;
            }
            group.push(instance);
        }
        self.scopes.pop();

        if group.len() > count {
            warn!(
                tag,
                group = %descriptor.name,
                declared = count,
                found = group.len(),
                "more group instances than declared"
            );
        } else if group.len() < count {
            debug!(
                tag,
                group = %descriptor.name,
                declared = count,
                found = group.len(),
                "fewer group instances than declared"
            );
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtree_dictionary::schema::{FieldDescriptor, MessageDescriptor, Schema};
    use fixtree_core::value::ValueType;
    use fixtree_tagvalue::decoder::Decoder;
    use fixtree_tagvalue::message::Entry;

    fn dictionary() -> Dictionary {
        let schema = Schema::new("FIX44")
            .with_message(
                MessageDescriptor::new("header")
                    .with_field(FieldDescriptor::field("BeginString", 8, ValueType::String))
                    .with_field(FieldDescriptor::field("BodyLength", 9, ValueType::Int))
                    .with_field(FieldDescriptor::field("MsgType", 35, ValueType::String))
                    .with_field(FieldDescriptor::field("SenderCompID", 49, ValueType::String)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("trailer")
                    .with_field(FieldDescriptor::field("CheckSum", 10, ValueType::String)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Order")
                    .with_msg_type("D")
                    .with_field(FieldDescriptor::field("ClOrdID", 11, ValueType::String))
                    .with_field(FieldDescriptor::group("Parties", 453, "Party"))
                    .with_field(FieldDescriptor::field("Side", 54, ValueType::Char)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Party")
                    .with_field(FieldDescriptor::field("PartyID", 448, ValueType::String))
                    .with_field(FieldDescriptor::field("PartyRole", 452, ValueType::Int))
                    .with_field(FieldDescriptor::group("PartySubIDs", 802, "PartySub")),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("PartySub")
                    .with_field(FieldDescriptor::field("PartySubID", 523, ValueType::String)),
            )
            .unwrap();
        Dictionary::new(schema).unwrap()
    }

    fn fields(input: &[u8]) -> Vec<FieldRef<'_>> {
        Decoder::new(input).with_delimiter(b'|').collect()
    }

    #[test]
    fn test_sections_are_split() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let input = b"8=FIX.4.4|9=20|35=D|49=S|11=A1|54=1|10=000|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        assert_eq!(message.header().tags().collect::<Vec<_>>(), vec![8, 9, 35, 49]);
        assert_eq!(message.body().tags().collect::<Vec<_>>(), vec![11, 54]);
        assert_eq!(message.trailer().tags().collect::<Vec<_>>(), vec![10]);
        assert_eq!(message.msg_type(), Some("D"));
    }

    #[test]
    fn test_group_instances_split_on_delimiter() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let input = b"11=A1|453=2|448=X|452=1|448=Y|54=1|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        let group = message.body().group(453).unwrap();
        assert_eq!(group.delimiter, 448);
        assert_eq!(group.len(), 2);
        assert_eq!(group.instances[0].get(452), Some("1"));
        assert_eq!(group.instances[1].get(448), Some("Y"));
        // Side closes the group and returns to the body.
        assert_eq!(message.body().get(54), Some("1"));
    }

    #[test]
    fn test_nested_groups() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let input = b"453=2|448=X|802=2|523=a|523=b|448=Y|54=2|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        let parties = message.body().group(453).unwrap();
        assert_eq!(parties.len(), 2);
        let subs = parties.instances[0].group(802).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs.instances[1].get(523), Some("b"));
        assert!(parties.instances[1].group(802).is_none());
    }

    #[test]
    fn test_repeated_tag_closes_instance() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        // 452 repeats inside the first instance without a new delimiter.
        let input = b"453=1|448=X|452=1|452=2|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        let parties = message.body().group(453).unwrap();
        assert_eq!(parties.len(), 1);
        let tail: Vec<u32> = message.body().tags().collect();
        assert_eq!(tail, vec![453, 452]);
    }

    #[test]
    fn test_zero_count_group() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let message = parse(&dict, root, &fields(b"453=0|54=1|")).unwrap();
        assert!(message.body().group(453).unwrap().is_empty());
        assert!(matches!(message.body().entries()[1], Entry::Field(_)));
    }

    #[test]
    fn test_bad_group_count() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        assert!(matches!(
            parse(&dict, root, &fields(b"453=two|448=X|")),
            Err(DecodeError::InvalidFieldValue { tag: 453, .. })
        ));
    }

    #[test]
    fn test_unknown_tags_stay_in_body() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let message = parse(&dict, root, &fields(b"11=A1|9999=x|")).unwrap();
        assert_eq!(message.body().get(9999), Some("x"));
    }

    #[test]
    fn test_unknown_tag_stays_inside_instance() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let input = b"11=A1|453=2|448=X|9999=z|452=3|448=Y|452=4|54=1|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        let parties = message.body().group(453).unwrap();
        assert_eq!(parties.len(), 2);
        assert_eq!(
            parties.instances[0].tags().collect::<Vec<_>>(),
            vec![448, 9999, 452]
        );
        assert_eq!(parties.instances[1].get(452), Some("4"));
        assert_eq!(message.body().tags().collect::<Vec<_>>(), vec![11, 453, 54]);
    }

    #[test]
    fn test_outer_group_tag_closes_nested_group() {
        let dict = dictionary();
        let root = dict.message_id("Order").unwrap();
        let input = b"453=1|448=X|802=1|523=a|452=7|54=1|";
        let message = parse(&dict, root, &fields(input)).unwrap();

        let party = &message.body().group(453).unwrap().instances[0];
        assert_eq!(party.group(802).unwrap().len(), 1);
        assert_eq!(party.get(452), Some("7"));
        assert_eq!(message.body().get(54), Some("1"));
    }
}
