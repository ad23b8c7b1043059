/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema-derived field orders.

use fixtree_dictionary::Dictionary;
use fixtree_dictionary::schema::MessageId;
use fixtree_tagvalue::message::FieldOrder;
use std::sync::Arc;

/// Builds the declaration order for `root` plus the header and trailer.
///
/// Sections without a descriptor get an empty list, which leaves their
/// entries in insertion order.
#[must_use]
pub fn schema_order(dict: &Dictionary, root: MessageId) -> FieldOrder {
    let section = |id: Option<MessageId>| -> Arc<[u32]> {
        id.map_or_else(|| Arc::from(Vec::new()), |id| dict.field_order(id))
    };
    FieldOrder::new(
        section(dict.header()),
        dict.field_order(root),
        section(dict.trailer()),
    )
}
