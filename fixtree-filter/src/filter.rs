/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Keep/drop decisions for decoded messages.
//!
//! A message whose descriptor declares `Filter` fields passes when one of
//! their values is admissible. Messages that pass also admit their
//! `SubFilter` values for the session, so that later messages carrying only
//! sub-filter fields pass when they correlate with an admitted one.

use crate::index::{FilterIndex, NamePath, SpecialAttribute};
use crate::session::{SessionFilterStore, SessionId};
use fixtree_core::error::SchemaError;
use fixtree_core::tree::{FieldValue, MessageTree};
use fixtree_dictionary::Dictionary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Values of `Filter` fields that let a message through.
    pub admissible: HashSet<String>,
}

impl FilterConfig {
    /// Creates a configuration admitting nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an admissible value.
    #[must_use]
    pub fn with_admissible(mut self, value: impl Into<String>) -> Self {
        self.admissible.insert(value.into());
        self
    }

    /// Returns true if `value` is admissible.
    #[must_use]
    pub fn is_admissible(&self, value: &str) -> bool {
        self.admissible.contains(value)
    }
}

/// Schema-driven message filter with per-session state.
#[derive(Debug)]
pub struct SchemaFilter {
    dictionary: Arc<Dictionary>,
    index: FilterIndex,
    config: FilterConfig,
    store: SessionFilterStore,
}

impl SchemaFilter {
    /// Builds the filter index for `dictionary`.
    ///
    /// # Errors
    /// Returns a `SchemaError` if a component reference cannot be resolved.
    pub fn new(dictionary: Arc<Dictionary>, config: FilterConfig) -> Result<Self, SchemaError> {
        let index = FilterIndex::build(&dictionary)?;
        Ok(Self {
            dictionary,
            index,
            config,
            store: SessionFilterStore::new(),
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns the attribute index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &FilterIndex {
        &self.index
    }

    /// Returns the session store.
    #[inline]
    #[must_use]
    pub const fn store(&self) -> &SessionFilterStore {
        &self.store
    }

    /// Decides whether `tree`, received on `session`, is kept.
    ///
    /// Trees whose descriptor is unknown to the dictionary are kept.
    #[must_use]
    pub fn accept(&self, session: &SessionId, tree: &MessageTree) -> bool {
        let Some(id) = self.dictionary.schema().id_of(tree.name()) else {
            trace!(%session, message = tree.name(), "keeping message of unknown descriptor");
            return true;
        };

        let filters = self.index.fields(id, SpecialAttribute::Filter);
        let sub_filters = self.index.fields(id, SpecialAttribute::SubFilter);

        if sub_filters.is_empty() {
            if filters.is_empty() {
                return true;
            }
            let keep = self.any_admissible(tree, filters);
            trace!(%session, message = tree.name(), keep, "filter decision");
            return keep;
        }

        let values = collect_values(tree, sub_filters);
        let admitted = self.store.session(session);
        let mut admitted = admitted.lock();

        let keep = if filters.is_empty() {
            values.iter().any(|v| admitted.contains(v))
        } else if self.any_admissible(tree, filters) {
            admitted.extend(values);
            true
        } else {
            false
        };
        trace!(%session, message = tree.name(), keep, "sub-filter decision");
        keep
    }

    fn any_admissible(&self, tree: &MessageTree, paths: &[NamePath]) -> bool {
        collect_values(tree, paths)
            .iter()
            .any(|v| self.config.is_admissible(v))
    }
}

fn collect_values(tree: &MessageTree, paths: &[NamePath]) -> Vec<String> {
    let mut values = Vec::new();
    for path in paths {
        let Some((leaf, components)) = path.split_last() else {
            continue;
        };
        let node = components
            .iter()
            .try_fold(tree, |node, name| node.get_message(name));
        match node.and_then(|n| n.get(leaf)) {
            Some(FieldValue::Scalar(s)) => values.push(s.to_string()),
            Some(FieldValue::Scalars(items)) => values.extend(items.iter().map(ToString::to_string)),
            _ => {}
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtree_core::value::ValueType;
    use fixtree_dictionary::schema::{
        FieldDescriptor, MessageDescriptor, Schema, attributes,
    };

    fn dictionary() -> Arc<Dictionary> {
        let schema = Schema::new("FIX44")
            .with_message(
                MessageDescriptor::new("Order")
                    .with_field(
                        FieldDescriptor::field("Account", 1, ValueType::String)
                            .with_attribute(attributes::FILTER, "true"),
                    )
                    .with_field(
                        FieldDescriptor::field("ClOrdID", 11, ValueType::String)
                            .with_attribute(attributes::SUB_FILTER, "true"),
                    ),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Fill").with_field(
                    FieldDescriptor::field("ClOrdID", 11, ValueType::String)
                        .with_attribute(attributes::SUB_FILTER, "true"),
                ),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Position")
                    .with_field(FieldDescriptor::component("Owner", "Owner")),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Owner").with_field(
                    FieldDescriptor::field("Account", 1, ValueType::String)
                        .with_attribute(attributes::FILTER, "true"),
                ),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("News")
                    .with_field(FieldDescriptor::field("Headline", 148, ValueType::String)),
            )
            .unwrap();
        Arc::new(Dictionary::new(schema).unwrap())
    }

    fn filter() -> SchemaFilter {
        SchemaFilter::new(dictionary(), FilterConfig::new().with_admissible("ACC1")).unwrap()
    }

    fn session() -> SessionId {
        SessionId::new("FIX.4.4", "CLIENT", "BROKER")
    }

    fn tree(name: &str) -> MessageTree {
        MessageTree::new("FIX44", name)
    }

    #[test]
    fn test_retroactive_admission() {
        let filter = filter();
        let order = tree("Order").with("Account", "ACC1").with("ClOrdID", "A1");
        assert!(filter.accept(&session(), &order));

        assert!(filter.accept(&session(), &tree("Fill").with("ClOrdID", "A1")));
        assert!(!filter.accept(&session(), &tree("Fill").with("ClOrdID", "B7")));
    }

    #[test]
    fn test_inadmissible_parent_admits_nothing() {
        let filter = filter();
        let order = tree("Order").with("Account", "OTHER").with("ClOrdID", "A1");
        assert!(!filter.accept(&session(), &order));
        assert!(!filter.accept(&session(), &tree("Fill").with("ClOrdID", "A1")));
    }

    #[test]
    fn test_admission_is_per_session() {
        let filter = filter();
        let order = tree("Order").with("Account", "ACC1").with("ClOrdID", "A1");
        assert!(filter.accept(&session(), &order));

        let other = SessionId::new("FIX.4.4", "CLIENT", "OTHER");
        assert!(!filter.accept(&other, &tree("Fill").with("ClOrdID", "A1")));

        filter.store().reset(&session());
        assert!(!filter.accept(&session(), &tree("Fill").with("ClOrdID", "A1")));
    }

    #[test]
    fn test_filter_only_and_plain_messages() {
        let filter = filter();
        let owned = |account: &str| {
            tree("Position").with("Owner", tree("Owner").with("Account", account))
        };
        assert!(filter.accept(&session(), &owned("ACC1")));
        assert!(!filter.accept(&session(), &owned("ACC2")));
        assert!(!filter.accept(&session(), &tree("Position")));

        assert!(filter.accept(&session(), &tree("News").with("Headline", "hi")));
        assert!(filter.accept(&session(), &tree("Unknown")));
        // Filter-only decisions never create session state.
        assert!(filter.store().is_empty());
    }

    #[test]
    fn test_concurrent_decisions() {
        let filter = Arc::new(filter());
        std::thread::scope(|scope| {
            for i in 0..4 {
                let filter = Arc::clone(&filter);
                scope.spawn(move || {
                    let id = format!("ORD-{i}");
                    let order = tree("Order").with("Account", "ACC1").with("ClOrdID", id.as_str());
                    assert!(filter.accept(&session(), &order));
                });
            }
        });
        assert_eq!(filter.store().admitted(&session()).len(), 4);
    }

    #[test]
    fn test_config_deserializes() {
        let config: FilterConfig = serde_json::from_str(r#"{"admissible": ["ACC1"]}"#).unwrap();
        assert!(config.is_admissible("ACC1"));
        let empty: FilterConfig = serde_json::from_str("{}").unwrap();
        assert!(empty.admissible.is_empty());
    }
}
