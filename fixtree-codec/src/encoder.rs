/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message tree to wire message.
//!
//! Fields are emitted in schema declaration order. Components are inlined at
//! their position; each group instance becomes one wire instance opened by
//! the group's delimiter tag. The `header` and `trailer` nested trees are
//! written to their own sections.

use crate::convert::encode_scalar;
use crate::options::CodecOptions;
use crate::ordering;
use fixtree_core::error::EncodeError;
use fixtree_core::field::tags;
use fixtree_core::tree::{FieldValue, MessageTree};
use fixtree_dictionary::Dictionary;
use fixtree_dictionary::schema::{FieldDescriptor, FieldHandle, HEADER, MessageId, TRAILER};
use fixtree_tagvalue::message::{FieldMap, WireGroup, WireMessage};
use tracing::debug;

/// Encodes message trees into wire messages.
#[derive(Debug, Clone, Copy)]
pub struct TreeEncoder<'d> {
    dict: &'d Dictionary,
    options: CodecOptions,
}

impl<'d> TreeEncoder<'d> {
    /// Creates an encoder over a dictionary.
    #[inline]
    #[must_use]
    pub const fn new(dict: &'d Dictionary, options: CodecOptions) -> Self {
        Self { dict, options }
    }

    /// Encodes `tree` against the descriptor named after it.
    ///
    /// MsgType is filled in from the descriptor's `MessageType` attribute
    /// when the header does not carry one, and BeginString from the tree's
    /// protocol metadata. With `ordering_fields` the schema order is
    /// attached to the result.
    ///
    /// # Errors
    /// Returns a schema error if the tree's name is unknown,
    /// `EncodeError::TypeMismatch` if a value disagrees with its declared
    /// type, and `EncodeError::MissingGroupTag`,
    /// `EncodeError::UnresolvedGroupDelimiter` or
    /// `EncodeError::MissingDelimiterField` for groups that cannot be framed.
    pub fn encode(&self, tree: &MessageTree) -> Result<WireMessage, EncodeError> {
        let dict = self.dict;
        let root = dict.message_id(tree.name())?;
        let mut wire = WireMessage::new();

        if let (Some(header), Some(id)) = (tree.get(HEADER), dict.header()) {
            let header = expect_message(header, HEADER, tree.name())?;
            self.write(header, id, wire.header_mut())?;
        }
        self.write(tree, root, wire.body_mut())?;
        if let (Some(trailer), Some(id)) = (tree.get(TRAILER), dict.trailer()) {
            let trailer = expect_message(trailer, TRAILER, tree.name())?;
            self.write(trailer, id, wire.trailer_mut())?;
        }

        if wire.msg_type().is_none() {
            if let Some(code) = dict.message(root).msg_type() {
                wire.header_mut().set_field(tags::MSG_TYPE, code);
            }
        }
        if wire.begin_string().is_none() {
            if let Some(protocol) = tree.metadata().protocol.as_deref() {
                wire.header_mut().set_field(tags::BEGIN_STRING, protocol);
            }
        }

        if self.options.ordering_fields {
            wire.set_order(Some(ordering::schema_order(dict, root)));
        }
        Ok(wire)
    }

    fn write(
        &self,
        tree: &MessageTree,
        id: MessageId,
        map: &mut FieldMap,
    ) -> Result<(), EncodeError> {
        let dict = self.dict;
        let descriptor = dict.message(id);

        for (position, field) in descriptor.fields.iter().enumerate() {
            if field.name == HEADER || field.name == TRAILER {
                continue;
            }
            let Some(value) = tree.get(&field.name) else {
                continue;
            };
            let handle = FieldHandle::new(id, position as u32);

            if field.is_component() {
                let child = expect_message(value, &field.name, &descriptor.name)?;
                self.write(child, dict.template(handle)?, map)?;
            } else if field.is_group() {
                self.write_group(field, handle, value, &descriptor.name, map)?;
            } else {
                let Some(tag) = field.tag else {
                    debug!(field = %field.name, message = %descriptor.name, "skipping untagged field");
                    continue;
                };
                let text = match value {
                    FieldValue::Scalar(scalar) => {
                        encode_scalar(field, &descriptor.name, scalar, &self.options)?
                    }
                    FieldValue::Scalars(items) if field.collection => items
                        .iter()
                        .map(|s| encode_scalar(field, &descriptor.name, s, &self.options))
                        .collect::<Result<Vec<_>, _>>()?
                        .join(" "),
                    other => return Err(mismatch(field, &descriptor.name, other)),
                };
                map.push_field(tag, text);
            }
        }

        for name in tree.field_names() {
            if name != HEADER && name != TRAILER && descriptor.field(name).is_none() {
                debug!(field = name, message = %descriptor.name, "skipping field unknown to schema");
            }
        }
        Ok(())
    }

    fn write_group(
        &self,
        field: &FieldDescriptor,
        handle: FieldHandle,
        value: &FieldValue,
        owner: &str,
        map: &mut FieldMap,
    ) -> Result<(), EncodeError> {
        let FieldValue::Group(instances) = value else {
            return Err(mismatch(field, owner, value));
        };
        if instances.is_empty() {
            return Ok(());
        }

        let tag = field.tag.ok_or_else(|| EncodeError::MissingGroupTag {
            field: field.name.clone(),
            message: owner.to_string(),
        })?;
        let delimiter =
            self.dict
                .delimiter(handle)
                .ok_or_else(|| EncodeError::UnresolvedGroupDelimiter {
                    field: field.name.clone(),
                    message: owner.to_string(),
                })?;
        let template = self.dict.template(handle)?;

        let mut group = WireGroup::new(tag, delimiter);
        for (index, instance) in instances.iter().enumerate() {
            let mut entries = FieldMap::new();
            self.write(instance, template, &mut entries)?;
            if entries.tags().next() != Some(delimiter) {
                return Err(EncodeError::MissingDelimiterField {
                    field: field.name.clone(),
                    message: owner.to_string(),
                    index,
                    delimiter,
                });
            }
            group.push(entries);
        }
        map.push_group(group);
        Ok(())
    }
}

fn expect_message<'t>(
    value: &'t FieldValue,
    field: &str,
    owner: &str,
) -> Result<&'t MessageTree, EncodeError> {
    value.as_message().ok_or_else(|| EncodeError::TypeMismatch {
        field: field.to_string(),
        message: owner.to_string(),
        expected: "component".to_string(),
        found: value.kind().to_string(),
    })
}

fn mismatch(field: &FieldDescriptor, owner: &str, found: &FieldValue) -> EncodeError {
    let expected = if field.is_group() {
        "group"
    } else if field.collection {
        "scalar list"
    } else {
        field.value_type.as_str()
    };
    EncodeError::TypeMismatch {
        field: field.name.clone(),
        message: owner.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtree_core::value::{Scalar, ValueType};
    use fixtree_dictionary::schema::{MessageDescriptor, Schema};
    use rust_decimal::Decimal;

    fn dictionary() -> Dictionary {
        let schema = Schema::new("FIX44")
            .with_message(
                MessageDescriptor::new("header")
                    .with_field(FieldDescriptor::field("BeginString", 8, ValueType::String))
                    .with_field(FieldDescriptor::field("MsgType", 35, ValueType::String))
                    .with_field(FieldDescriptor::field("SenderCompID", 49, ValueType::String)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Order")
                    .with_msg_type("D")
                    .with_field(FieldDescriptor::field("ClOrdID", 11, ValueType::String))
                    .with_field(FieldDescriptor::component("Instrument", "Instrument"))
                    .with_field(
                        FieldDescriptor::field("Side", 54, ValueType::Char)
                            .with_value("1", "Buy")
                            .with_value("2", "Sell"),
                    )
                    .with_field(FieldDescriptor::field("Price", 44, ValueType::Decimal))
                    .with_field(FieldDescriptor::group("Parties", 453, "Party"))
                    .with_field(FieldDescriptor::group("Empty", 999, "Nothing")),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Instrument")
                    .with_field(FieldDescriptor::field("Symbol", 55, ValueType::String)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Party")
                    .with_field(FieldDescriptor::field("PartyID", 448, ValueType::String))
                    .with_field(FieldDescriptor::field("PartyRole", 452, ValueType::Int)),
            )
            .unwrap()
            .with_message(MessageDescriptor::new("Nothing"))
            .unwrap();
        Dictionary::new(schema).unwrap()
    }

    fn party(id: &str) -> MessageTree {
        MessageTree::new("FIX44", "Party").with("PartyID", id)
    }

    fn order() -> MessageTree {
        MessageTree::new("FIX44", "Order")
            .with("Side", "Sell")
            .with("ClOrdID", "A1")
            .with(
                "Instrument",
                MessageTree::new("FIX44", "Instrument").with("Symbol", "IBM"),
            )
            .with("Parties", vec![party("X"), party("Y").with("PartyRole", 3)])
    }

    #[test]
    fn test_encode_in_declaration_order() {
        let dict = dictionary();
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&order())
            .unwrap();

        assert_eq!(
            &wire.body_bytes(b'|')[..],
            b"11=A1|55=IBM|54=2|453=2|448=X|448=Y|452=3|"
        );
        assert_eq!(wire.msg_type(), Some("D"));
        assert!(wire.order().is_none());
    }

    #[test]
    fn test_encode_header_section() {
        let dict = dictionary();
        let tree = order().with(
            HEADER,
            MessageTree::new("FIX44", "header").with("SenderCompID", "ME"),
        );
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&tree)
            .unwrap();

        assert_eq!(wire.header().get(49), Some("ME"));
        assert_eq!(wire.header().get(35), Some("D"));
        assert!(!wire.body().contains(49));
    }

    #[test]
    fn test_ordering_fields_attaches_schema_order() {
        let dict = dictionary();
        let options = CodecOptions::default().with_ordering_fields(true);
        let wire = TreeEncoder::new(&dict, options).encode(&order()).unwrap();
        let order = wire.order().unwrap();
        assert_eq!(&*order.body, &[11, 55, 54, 44, 453, 999]);
        assert_eq!(&*order.header, &[8, 35, 49]);
        assert!(order.trailer.is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let dict = dictionary();
        let tree = order().with("Price", "cheap");
        assert_eq!(
            TreeEncoder::new(&dict, CodecOptions::default()).encode(&tree),
            Err(EncodeError::TypeMismatch {
                field: "Price".to_string(),
                message: "Order".to_string(),
                expected: "decimal".to_string(),
                found: "string".to_string(),
            })
        );

        let tree = order().with("Instrument", "IBM");
        assert!(matches!(
            TreeEncoder::new(&dict, CodecOptions::default()).encode(&tree),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_decimal_accepts_double() {
        let dict = dictionary();
        let tree = order().with("Price", 101.5);
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&tree)
            .unwrap();
        assert_eq!(wire.body().get(44), Some("101.5"));

        let tree = order().with("Price", Decimal::new(10125, 2));
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&tree)
            .unwrap();
        assert_eq!(wire.body().get(44), Some("101.25"));
    }

    #[test]
    fn test_empty_group_list_emits_nothing() {
        let dict = dictionary();
        let tree = order().with("Parties", Vec::<MessageTree>::new());
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&tree)
            .unwrap();
        assert!(!wire.body().contains(453));
    }

    #[test]
    fn test_unresolved_delimiter() {
        let dict = dictionary();
        let tree = order().with("Empty", vec![MessageTree::new("FIX44", "Nothing")]);
        assert_eq!(
            TreeEncoder::new(&dict, CodecOptions::default()).encode(&tree),
            Err(EncodeError::UnresolvedGroupDelimiter {
                field: "Empty".to_string(),
                message: "Order".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let dict = dictionary();
        let tree = order().with("Bogus", Scalar::Int(1));
        let wire = TreeEncoder::new(&dict, CodecOptions::default())
            .encode(&tree)
            .unwrap();
        assert_eq!(wire.body().len(), 4);
    }

    #[test]
    fn test_unknown_descriptor() {
        let dict = dictionary();
        let tree = MessageTree::new("FIX44", "Nope");
        assert!(matches!(
            TreeEncoder::new(&dict, CodecOptions::default()).encode(&tree),
            Err(EncodeError::Schema(_))
        ));
    }

    #[test]
    fn test_instance_without_delimiter_is_rejected() {
        let dict = dictionary();
        let tree = order().with(
            "Parties",
            vec![
                MessageTree::new("FIX44", "Party").with("PartyRole", 3),
                party("Y"),
            ],
        );
        assert_eq!(
            TreeEncoder::new(&dict, CodecOptions::default()).encode(&tree),
            Err(EncodeError::MissingDelimiterField {
                field: "Parties".to_string(),
                message: "Order".to_string(),
                index: 0,
                delimiter: 448,
            })
        );
    }

    #[test]
    fn test_ignore_field_type_writes_raw_strings() {
        let dict = dictionary();
        let tree = order()
            .with("Price", "101.250")
            .with("Parties", vec![party("X").with("PartyRole", "x1")]);
        let options = CodecOptions::default().with_ignore_field_type(true);
        let wire = TreeEncoder::new(&dict, options).encode(&tree).unwrap();

        assert_eq!(
            &wire.body_bytes(b'|')[..],
            b"11=A1|55=IBM|54=2|44=101.250|453=1|448=X|452=x1|"
        );
    }
}
