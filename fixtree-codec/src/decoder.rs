/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Wire message to message tree.
//!
//! Every wire entry is looked up by `(tag, root)` in the schema index. The
//! recorded component path is walked, creating nested trees on first visit,
//! and the value is stored under the owning field's name. Group instances
//! are decoded recursively against the group's template.

use crate::convert::decode_scalar;
use crate::options::CodecOptions;
use fixtree_core::error::DecodeError;
use fixtree_core::field::tags;
use fixtree_core::tree::{FieldValue, MessageTree};
use fixtree_core::value::Scalar;
use fixtree_dictionary::Dictionary;
use fixtree_dictionary::schema::{FieldHandle, HEADER, MessageId, TRAILER};
use fixtree_tagvalue::message::{Entry, FieldMap, WireMessage};
use tracing::debug;

/// Decodes wire messages into message trees.
#[derive(Debug, Clone, Copy)]
pub struct TreeDecoder<'d> {
    dict: &'d Dictionary,
    options: CodecOptions,
}

impl<'d> TreeDecoder<'d> {
    /// Creates a decoder over a dictionary.
    #[inline]
    #[must_use]
    pub const fn new(dict: &'d Dictionary, options: CodecOptions) -> Self {
        Self { dict, options }
    }

    /// Decodes `wire`, resolving the root descriptor from its MsgType.
    ///
    /// # Errors
    /// Returns `DecodeError::MissingMsgType` if the header has no MsgType,
    /// a schema error if no descriptor declares it, or any error from
    /// [`decode`](Self::decode).
    pub fn decode_message(&self, wire: &WireMessage) -> Result<MessageTree, DecodeError> {
        let code = wire.msg_type().ok_or(DecodeError::MissingMsgType)?;
        let root = self.dict.message_for_msg_type(code)?;
        self.decode(wire, root)
    }

    /// Decodes `wire` against the descriptor `root`.
    ///
    /// The header and trailer sections decode into nested trees named
    /// `header` and `trailer` when the dictionary declares them.
    ///
    /// # Errors
    /// Returns `DecodeError::UnknownTag` for unknown tags when `verify_tags`
    /// is set, `DecodeError::InvalidFieldValue` when a value does not convert
    /// to its declared type, and `DecodeError::StructureMismatch` when the
    /// wire shape contradicts the schema.
    pub fn decode(&self, wire: &WireMessage, root: MessageId) -> Result<MessageTree, DecodeError> {
        let mut rejected = Vec::new();
        let mut tree = self.dict.tree_for(root);

        if let Some(header) = self.section(wire.header(), self.dict.header(), &mut rejected)? {
            tree.set(HEADER, header);
        }
        self.fill(&mut tree, wire.body(), root, &mut rejected)?;
        if let Some(trailer) = self.section(wire.trailer(), self.dict.trailer(), &mut rejected)? {
            tree.set(TRAILER, trailer);
        }

        let metadata = tree.metadata_mut();
        metadata.protocol = wire.begin_string().map(str::to_string);
        metadata.rejected_tags = rejected;
        Ok(tree)
    }

    fn section(
        &self,
        map: &FieldMap,
        descriptor: Option<MessageId>,
        rejected: &mut Vec<u32>,
    ) -> Result<Option<MessageTree>, DecodeError> {
        let Some(id) = descriptor else {
            return Ok(None);
        };
        let mut tree = self.dict.tree_for(id);
        self.fill(&mut tree, map, id, rejected)?;
        Ok((!tree.is_empty()).then_some(tree))
    }

    fn fill(
        &self,
        tree: &mut MessageTree,
        map: &FieldMap,
        root: MessageId,
        rejected: &mut Vec<u32>,
    ) -> Result<(), DecodeError> {
        let dict = self.dict;
        let root_name = dict.message(root).name.as_str();

        for entry in map {
            let tag = entry.tag();
            if self.options.skip_tags && tags::is_skippable(tag) {
                continue;
            }

            let Some(index_entry) = dict.lookup(tag, root) else {
                if self.options.verify_tags {
                    return Err(DecodeError::UnknownTag {
                        tag,
                        message: root_name.to_string(),
                    });
                }
                debug!(tag, message = root_name, "dropping tag unknown to message");
                rejected.push(tag);
                continue;
            };

            let field = dict.schema().field(index_entry.field);

            match entry {
                Entry::Group(group) => {
                    if !field.is_group() {
                        return Err(DecodeError::StructureMismatch {
                            tag,
                            message: root_name.to_string(),
                            reason: format!("{} is not a repeating group", field.name),
                        });
                    }
                    if group.is_empty() {
                        continue;
                    }
                    let template = dict.template(index_entry.field)?;
                    let target = self.walk(tree, &index_entry.path, tag, root_name)?;
                    for wire_instance in &group.instances {
                        let mut instance = dict.tree_for(template);
                        self.fill(&mut instance, wire_instance, template, rejected)?;
                        target.push_group(&field.name, instance);
                    }
                }
                Entry::Field(wire_field) => {
                    if field.is_group() {
                        if wire_field.value.trim() == "0" {
                            continue;
                        }
                        return Err(DecodeError::StructureMismatch {
                            tag,
                            message: root_name.to_string(),
                            reason: format!("group {} has a count but no instances", field.name),
                        });
                    }
                    if field.is_component() {
                        return Err(DecodeError::StructureMismatch {
                            tag,
                            message: root_name.to_string(),
                            reason: format!("component {} carries a value", field.name),
                        });
                    }
                    if wire_field.value.is_empty() {
                        continue;
                    }

                    let value = if field.collection {
                        let items = wire_field
                            .value
                            .split(' ')
                            .filter(|s| !s.is_empty())
                            .map(|s| decode_scalar(field, root_name, s, &self.options))
                            .collect::<Result<Vec<Scalar>, _>>()?;
                        if items.is_empty() {
                            continue;
                        }
                        FieldValue::Scalars(items)
                    } else {
                        FieldValue::Scalar(decode_scalar(
                            field,
                            root_name,
                            &wire_field.value,
                            &self.options,
                        )?)
                    };
                    // Components along the path only exist once a value lands in them.
                    let target = self.walk(tree, &index_entry.path, tag, root_name)?;
                    target.set(field.name.as_str(), value);
                }
            }
        }
        Ok(())
    }

    fn walk<'t>(
        &self,
        tree: &'t mut MessageTree,
        path: &[FieldHandle],
        tag: u32,
        root_name: &str,
    ) -> Result<&'t mut MessageTree, DecodeError> {
        let dict = self.dict;
        let mut node = tree;
        for &handle in path {
            let component = dict.schema().field(handle);
            let template = dict.template(handle)?;
            node = node
                .component_mut(&component.name, || dict.tree_for(template))
                .ok_or_else(|| DecodeError::StructureMismatch {
                    tag,
                    message: root_name.to_string(),
                    reason: format!("{} already holds a non-component value", component.name),
                })?;
        }
        Ok(node)
    }
}
