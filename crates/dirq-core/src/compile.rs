//! Module: compile
//! Responsibility: orchestrate one compile pass — filter, selection, and
//! order lowering share a single alias table so all fragments agree —
//! then hand the fragments to the result assembler.
//!
//! Compilation is synchronous, CPU-bound tree recursion with no I/O. All
//! traversal state is constructed fresh on the stack here, so concurrent
//! compiles against a shared provider need no synchronization.

use crate::{
    descriptor::{DEFAULT_LIMIT, DEFAULT_OFFSET, QueryDescriptor},
    error::CompileError,
    obs,
    result::QueryResult,
    visitor::{CompilePass, filter::FilterVisitor, order::OrderVisitor, select::SelectionVisitor},
};
use dirq_schema::{CollectionScope, SchemaProvider};

/// Alias pre-seeded for the root collection of a nested sub-query.
const NESTED_ALIAS: &str = "nested0";

pub(crate) fn compile(
    descriptor: &QueryDescriptor,
    provider: &dyn SchemaProvider,
    scope: CollectionScope,
    nested: Option<&QueryResult>,
) -> Result<QueryResult, CompileError> {
    obs::record_compile();

    let result = compile_inner(descriptor, provider, scope, nested);
    if let Err(err) = &result {
        obs::record_error(err.class());
    }

    result
}

fn compile_inner(
    descriptor: &QueryDescriptor,
    provider: &dyn SchemaProvider,
    scope: CollectionScope,
    nested: Option<&QueryResult>,
) -> Result<QueryResult, CompileError> {
    let model = provider.entity(descriptor.entity())?;
    let collection = model.collection(scope);

    let mut pass = if nested.is_some() {
        CompilePass::with_preseeded(NESTED_ALIAS)
    } else {
        CompilePass::new()
    };
    let alias = pass.alias_for(collection, model.entity_name);

    // The filter pass builds the alias bindings; selection and order reuse
    // them so every fragment agrees on iteration variables.
    let filter = FilterVisitor::new(model, &alias, nested.is_some())
        .render(&descriptor.filters, descriptor.combine_default)?;

    let conversions: Vec<&'static str> = descriptor.conversions.iter().copied().collect();
    let projected = SelectionVisitor::new(provider, scope, model, &alias).render(
        &descriptor.projections,
        &conversions,
        &mut pass,
    )?;

    let sort = OrderVisitor::new(model, &alias).render(&descriptor.sorts)?;
    let limit = render_limit(descriptor.limit, descriptor.offset);

    let source = match nested {
        Some(inner) => format!("FOR {alias} IN FLATTEN({})", inner.query()),
        None => format!("FOR {alias} IN {collection}"),
    };

    Ok(QueryResult::new(
        source,
        filter,
        sort,
        limit,
        projected,
        alias,
        descriptor.distinct_key.clone(),
        pass.collections(),
    ))
}

/// Render the pagination fragment. Negative values are clamped to the
/// defaults rather than rejected; setting either limit or offset renders
/// both.
fn render_limit(limit: Option<i64>, offset: Option<i64>) -> Option<String> {
    if limit.is_none() && offset.is_none() {
        return None;
    }

    let limit = limit.filter(|n| *n >= 0).unwrap_or(DEFAULT_LIMIT);
    let offset = offset.filter(|n| *n >= 0).unwrap_or(DEFAULT_OFFSET);

    Some(format!("LIMIT {offset},{limit}"))
}
