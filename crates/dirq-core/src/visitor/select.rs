use crate::{
    descriptor::Projection,
    error::CompileError,
    expr::MemberPath,
    visitor::{CompilePass, ExprVisitor, Fragment, VisitContext},
};
use dirq_schema::{CollectionScope, EntityModel, SchemaProvider};

///
/// SelectionVisitor
///
/// Lowers the active projection into the expression a `RETURN` wraps.
/// Three shapes: the whole aliased entity, a single member (honoring a
/// declared serialized name), or — whenever any view conversion is
/// activated — a MERGE with per-property cross-collection sub-fetches.
/// The conversion shape takes precedence over the other two.
///

pub(crate) struct SelectionVisitor<'a> {
    provider: &'a dyn SchemaProvider,
    scope: CollectionScope,
    model: &'a EntityModel,
    alias: String,
}

impl<'a> SelectionVisitor<'a> {
    pub(crate) fn new(
        provider: &'a dyn SchemaProvider,
        scope: CollectionScope,
        model: &'a EntityModel,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            scope,
            model,
            alias: alias.into(),
        }
    }

    /// Render the projected expression (the text a `RETURN` will wrap).
    pub(crate) fn render(
        &mut self,
        projections: &[Projection],
        conversions: &[&'static str],
        pass: &mut CompilePass,
    ) -> Result<String, CompileError> {
        if !conversions.is_empty() {
            return self.render_conversions(conversions, pass);
        }

        // Last registered projection wins; none registered defaults to
        // selecting the entity itself.
        let ctx = VisitContext::root(self.alias.clone());
        match projections.last() {
            None | Some(Projection::SelfEntity) => Ok(self.alias.clone()),
            Some(Projection::Member(path)) => {
                Ok(self.visit_member(path, &ctx)?.into_text()?)
            }
        }
    }

    fn render_conversions(
        &mut self,
        conversions: &[&'static str],
        pass: &mut CompilePass,
    ) -> Result<String, CompileError> {
        let mut mapped = Vec::new();
        for target in conversions {
            let mappings = self.provider.property_mappings(self.model.entity_name, target)?;
            for mapping in mappings {
                let resolving = self.provider.entity(mapping.resolving_entity)?;
                let collection = resolving.collection(self.scope);
                pass.touch(collection);

                let fields = mapping
                    .projected_fields
                    .iter()
                    .map(|(wire, source)| format!("\"{wire}\": p.{source}"))
                    .collect::<Vec<_>>()
                    .join(", ");

                mapped.push(format!(
                    "\"{target_prop}\": (FOR r IN NOT_NULL({alias}.{source_prop},[]) \
                     FOR p IN {collection} FILTER r == p.{id} RETURN {{{fields}}})",
                    target_prop = mapping.target_prop,
                    alias = self.alias,
                    source_prop = mapping.source_prop,
                    id = resolving.primary_key,
                ));
            }
        }

        Ok(format!("MERGE({}, {{{}}})", self.alias, mapped.join(", ")))
    }
}

impl ExprVisitor for SelectionVisitor<'_> {
    fn visit_root(&mut self, ctx: &VisitContext) -> Result<Fragment, CompileError> {
        Ok(Fragment::Text(ctx.alias.clone()))
    }

    fn visit_member(
        &mut self,
        path: &MemberPath,
        ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        // A declared serialized name replaces the final segment.
        let rendered = match path.last().and_then(|f| self.model.serialized_name(f)) {
            Some(wire) if path.is_simple() => format!("{}.{wire}", ctx.alias),
            Some(wire) => format!("{}.{wire}", path.parent().render(&ctx.alias)),
            None => path.render(&ctx.alias),
        };
        Ok(Fragment::Text(rendered))
    }
}
