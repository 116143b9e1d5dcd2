use derive_more::Deref;
use std::collections::BTreeMap;

///
/// AliasTable
///
/// Collection name → iteration-variable binding for one compile pass.
/// Within a pass the same collection always maps to the same alias; the
/// table built by the filter pass is shared with the selection and order
/// passes so all three fragments agree.
///

#[derive(Clone, Debug, Default, Deref)]
pub struct AliasTable {
    bindings: BTreeMap<String, String>,
}

impl AliasTable {
    fn insert(&mut self, collection: impl Into<String>, alias: impl Into<String>) {
        self.bindings.insert(collection.into(), alias.into());
    }
}

///
/// CompilePass
///
/// Per-compile traversal state, constructed fresh on the stack for every
/// compile call. Replaces shared visitor instances: no locks, no
/// cross-call leakage.
///

#[derive(Debug, Default)]
pub(crate) struct CompilePass {
    aliases: AliasTable,
    counter: usize,
    preseeded: Option<String>,
}

impl CompilePass {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pass whose first (root) collection binds to a pre-seeded alias,
    /// used for nested sub-query compilation.
    pub(crate) fn with_preseeded(alias: impl Into<String>) -> Self {
        Self {
            preseeded: Some(alias.into()),
            ..Self::default()
        }
    }

    /// Resolve the alias for a collection, binding a new one on first use:
    /// lowercase first letter of the entity name plus a pass-local counter.
    pub(crate) fn alias_for(&mut self, collection: &str, entity_name: &str) -> String {
        if let Some(existing) = self.aliases.get(collection) {
            return existing.clone();
        }

        let alias = self.preseeded.take().unwrap_or_else(|| {
            let initial = entity_name
                .chars()
                .next()
                .map_or('x', |c| c.to_ascii_lowercase());
            format!("{initial}{}", self.counter)
        });
        self.counter += 1;
        self.aliases.insert(collection, alias.clone());

        alias
    }

    /// Record a collection the query touches without binding an alias
    /// (sub-fetches iterate with fixed variable names).
    pub(crate) fn touch(&mut self, collection: &str) {
        if !self.aliases.contains_key(collection) {
            self.aliases.insert(collection, String::new());
        }
    }

    /// Every collection this pass has touched, in stable order.
    pub(crate) fn collections(&self) -> Vec<String> {
        self.aliases.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_stable_within_a_pass() {
        let mut pass = CompilePass::new();
        let a = pass.alias_for("GroupQuery", "Group");
        let b = pass.alias_for("GroupQuery", "Group");

        assert_eq!(a, "g0");
        assert_eq!(a, b);
    }

    #[test]
    fn counter_advances_per_new_collection() {
        let mut pass = CompilePass::new();
        assert_eq!(pass.alias_for("GroupQuery", "Group"), "g0");
        assert_eq!(pass.alias_for("PersonQuery", "Person"), "p1");
        assert_eq!(pass.collections(), ["GroupQuery", "PersonQuery"]);
    }

    #[test]
    fn preseeded_alias_binds_the_first_collection_only() {
        let mut pass = CompilePass::with_preseeded("nested0");
        assert_eq!(pass.alias_for("PersonQuery", "Person"), "nested0");
        assert_eq!(pass.alias_for("GroupQuery", "Group"), "g1");
    }
}
