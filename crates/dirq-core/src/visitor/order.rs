use crate::{
    descriptor::{SortOrder, SortSpec},
    error::CompileError,
    expr::MemberPath,
    visitor::{ExprVisitor, Fragment, VisitContext},
};
use dirq_schema::EntityModel;

///
/// OrderVisitor
///
/// Lowers the active sort expression into a `SORT` fragment. The primary
/// key of the aliased collection is always appended as a secondary,
/// ascending tie-break: the database's ordering for equal sort keys is
/// unspecified, and pagination must be deterministic.
///

pub(crate) struct OrderVisitor<'a> {
    model: &'a EntityModel,
    alias: String,
}

impl<'a> OrderVisitor<'a> {
    pub(crate) fn new(model: &'a EntityModel, alias: impl Into<String>) -> Self {
        Self {
            model,
            alias: alias.into(),
        }
    }

    /// Render the last-registered sort expression, if any.
    pub(crate) fn render(&mut self, sorts: &[SortSpec]) -> Result<Option<String>, CompileError> {
        let Some(spec) = sorts.last() else {
            return Ok(None);
        };

        let ctx = VisitContext::root(self.alias.clone());
        let key = self
            .visit_member(&spec.path, &ctx)?
            .into_text()?;
        let direction = match spec.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        Ok(Some(format!(
            "SORT {key} {direction},{}.{} ASC",
            self.alias, self.model.primary_key
        )))
    }
}

impl ExprVisitor for OrderVisitor<'_> {
    fn visit_member(
        &mut self,
        path: &MemberPath,
        ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        if !path.is_at_most_single_nested() {
            return Err(CompileError::unsupported(
                "member",
                format!(
                    "sort key '{}' exceeds single-level nesting",
                    path.dotted()
                ),
            ));
        }

        Ok(Fragment::Text(path.render(&ctx.alias)))
    }
}
