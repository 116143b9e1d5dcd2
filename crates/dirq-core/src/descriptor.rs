//! Module: descriptor
//! Responsibility: the fluent query-descriptor accumulator. Purely
//! declarative: no schema access, no planning, no rendering. Every
//! chained operator returns a new descriptor; a descriptor handed to a
//! derived one is never mutated.

use crate::{
    compile,
    error::CompileError,
    expr::{Combine, Condition, MemberPath},
    result::QueryResult,
};
use dirq_schema::{CollectionScope, SchemaProvider};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use ulid::Ulid;

/// Page-size default applied when pagination is requested without an
/// explicit limit, and the clamp target for negative limits.
pub const DEFAULT_LIMIT: i64 = 100;

/// Offset default, and the clamp target for negative offsets.
pub const DEFAULT_OFFSET: i64 = 0;

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_correlation() -> Ulid {
    let n = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ulid::from_parts(0, u128::from(n))
}

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

///
/// SortSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortSpec {
    pub path: MemberPath,
    pub order: SortOrder,
}

impl SortSpec {
    #[must_use]
    pub fn new(path: impl Into<MemberPath>, order: SortOrder) -> Self {
        Self {
            path: path.into(),
            order,
        }
    }
}

///
/// Projection
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Projection {
    /// Project the whole aliased entity.
    SelfEntity,
    /// Project a single member, honoring declared serialized names.
    Member(MemberPath),
}

///
/// QueryDescriptor
///
/// Accumulator for one query chain. Consumed exactly once by `compile`;
/// derived descriptors preserve the correlation id so settings registered
/// against it remain resolvable across the chain.
///

#[derive(Clone, Debug)]
pub struct QueryDescriptor {
    entity: &'static str,
    correlation: Ulid,
    pub(crate) filters: Vec<Condition>,
    pub(crate) projections: Vec<Projection>,
    pub(crate) sorts: Vec<SortSpec>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) distinct_key: Option<String>,
    pub(crate) conversions: BTreeSet<&'static str>,
    pub(crate) combine_default: Option<Combine>,
}

impl QueryDescriptor {
    /// Start a query chain for an entity type.
    #[must_use]
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            correlation: next_correlation(),
            filters: Vec::new(),
            projections: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
            distinct_key: None,
            conversions: BTreeSet::new(),
            combine_default: None,
        }
    }

    /// Fresh descriptor preserving entity tag, correlation id, and the
    /// registered combine default, with no accumulated state.
    #[must_use]
    pub fn derive(&self) -> Self {
        Self {
            entity: self.entity,
            correlation: self.correlation,
            combine_default: self.combine_default,
            ..Self::new(self.entity)
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    #[must_use]
    pub const fn correlation(&self) -> Ulid {
        self.correlation
    }

    // ------------------------------------------------------------------
    // Fluent operators (each returns a new descriptor)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn with_filter(&self, condition: impl Into<Condition>) -> Self {
        let mut next = self.clone();
        next.filters.push(condition.into());
        next
    }

    #[must_use]
    pub fn with_projection(&self, projection: Projection) -> Self {
        let mut next = self.clone();
        next.projections.push(projection);
        next
    }

    #[must_use]
    pub fn with_member_projection(&self, path: impl Into<MemberPath>) -> Self {
        self.with_projection(Projection::Member(path.into()))
    }

    #[must_use]
    pub fn with_sort(&self, path: impl Into<MemberPath>, order: SortOrder) -> Self {
        let mut next = self.clone();
        next.sorts.push(SortSpec::new(path, order));
        next
    }

    #[must_use]
    pub fn with_limit(&self, limit: i64) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    #[must_use]
    pub fn with_offset(&self, offset: i64) -> Self {
        let mut next = self.clone();
        next.offset = Some(offset);
        next
    }

    #[must_use]
    pub fn with_distinct_key(&self, field: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.distinct_key = Some(field.into());
        next
    }

    /// Activate a view conversion; the selection pass resolves it through
    /// the registered property mappings.
    #[must_use]
    pub fn activate_conversion(&self, view: &'static str) -> Self {
        let mut next = self.clone();
        next.conversions.insert(view);
        next
    }

    /// Register the combine default applied when a condition carries no
    /// explicit AND/OR relation. Without this the compiler uses AND.
    #[must_use]
    pub fn with_combine_default(&self, combine: Combine) -> Self {
        let mut next = self.clone();
        next.combine_default = Some(combine);
        next
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Compile this descriptor into the query/count-query pair.
    pub fn compile(
        &self,
        provider: &dyn SchemaProvider,
        scope: CollectionScope,
    ) -> Result<QueryResult, CompileError> {
        compile::compile(self, provider, scope, None)
    }

    /// Compile as a nested sub-query over the flattened output of an
    /// already-compiled (typically already-limited) outer query.
    pub fn compile_nested(
        &self,
        provider: &dyn SchemaProvider,
        scope: CollectionScope,
        inner: &QueryResult,
    ) -> Result<QueryResult, CompileError> {
        compile::compile(self, provider, scope, Some(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::Expr, value::Value};

    fn cond(field: &str, text: &str) -> Condition {
        Condition::single(Expr::eq(field, Value::Text(text.into())))
    }

    #[test]
    fn chained_operators_never_mutate_the_source() {
        let base = QueryDescriptor::new("Group");
        let extended = base.with_filter(cond("Name", "ops")).with_limit(5);

        assert!(base.filters.is_empty());
        assert_eq!(base.limit, None);
        assert_eq!(extended.filters.len(), 1);
        assert_eq!(extended.limit, Some(5));
    }

    #[test]
    fn chaining_order_is_preserved() {
        let a = cond("Name", "a");
        let b = cond("Name", "b");

        let chained = QueryDescriptor::new("Group")
            .with_filter(a.clone())
            .with_filter(b.clone());

        assert_eq!(chained.filters, vec![a, b]);
    }

    #[test]
    fn derive_preserves_identity_but_drops_state() {
        let base = QueryDescriptor::new("Group")
            .with_filter(cond("Name", "ops"))
            .with_combine_default(Combine::Or)
            .with_limit(10);
        let derived = base.derive();

        assert_eq!(derived.entity(), "Group");
        assert_eq!(derived.correlation(), base.correlation());
        assert_eq!(derived.combine_default, Some(Combine::Or));
        assert!(derived.filters.is_empty());
        assert_eq!(derived.limit, None);
    }

    #[test]
    fn last_projection_and_sort_win() {
        let descriptor = QueryDescriptor::new("Group")
            .with_member_projection("Members")
            .with_projection(Projection::SelfEntity)
            .with_sort("Name", SortOrder::Asc)
            .with_sort("DisplayName", SortOrder::Desc);

        assert_eq!(descriptor.projections.last(), Some(&Projection::SelfEntity));
        assert_eq!(
            descriptor.sorts.last(),
            Some(&SortSpec::new("DisplayName", SortOrder::Desc))
        );
    }

    #[test]
    fn conversions_deduplicate() {
        let descriptor = QueryDescriptor::new("Group")
            .activate_conversion("GroupMemberView")
            .activate_conversion("GroupMemberView");

        assert_eq!(descriptor.conversions.len(), 1);
    }

    #[test]
    fn correlation_ids_are_unique_per_chain() {
        let a = QueryDescriptor::new("Group");
        let b = QueryDescriptor::new("Group");
        assert_ne!(a.correlation(), b.correlation());
    }
}
