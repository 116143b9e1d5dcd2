//! Module: visitor::filter
//! Responsibility: lower the descriptor's condition list into a single
//! `FILTER <expr>` fragment. Owns discriminator scoping, batch/group
//! joining, and every supported predicate lowering.

use crate::{
    error::CompileError,
    expr::{CallExpr, Combine, CompareOp, Condition, Expr, MemberPath},
    value::{Value, escape_like_pattern},
    visitor::{ExprVisitor, Fragment, VisitContext},
};
use dirq_schema::{Discriminator, EntityModel, PropertyConversion};

///
/// FilterVisitor
///
/// One instance serves exactly one compile call; all traversal state lives
/// on the stack of that call.
///

pub(crate) struct FilterVisitor<'a> {
    model: &'a EntityModel,
    alias: String,
    /// Nested sub-query mode: rows are projected member documents of an
    /// outer query, so the type-discriminator scoping does not apply.
    nested: bool,
}

impl<'a> FilterVisitor<'a> {
    pub(crate) fn new(model: &'a EntityModel, alias: impl Into<String>, nested: bool) -> Self {
        Self {
            model,
            alias: alias.into(),
            nested,
        }
    }

    /// Render the condition list. Returns `None` when there is nothing to
    /// filter on: no conditions and no discriminator to scope by.
    pub(crate) fn render(
        &mut self,
        conditions: &[Condition],
        registered: Option<Combine>,
    ) -> Result<Option<String>, CompileError> {
        let discriminator = if self.nested {
            None
        } else {
            self.model.discriminator
        };

        if conditions.is_empty() {
            // Every query is at least scoped to its own type; a schema
            // without a discriminator skips filtering entirely.
            return Ok(discriminator
                .as_ref()
                .map(|d| format!("FILTER {}", self.type_filter(d))));
        }

        let mut parts = Vec::with_capacity(conditions.len());
        for (idx, condition) in conditions.iter().enumerate() {
            let standalone = conditions.len() == 1;
            let text = self.render_condition(condition, discriminator.as_ref(), standalone)?;
            if idx == 0 {
                parts.push(text);
            } else {
                parts.push(format!(
                    "{} {text}",
                    condition.resolve_combine(registered).as_aql()
                ));
            }
        }

        let joined = parts.join(" ");
        let expr = if conditions.len() > 1 {
            format!("({joined})")
        } else {
            joined
        };

        Ok(Some(format!("FILTER {expr}")))
    }

    fn render_condition(
        &mut self,
        condition: &Condition,
        discriminator: Option<&Discriminator>,
        standalone: bool,
    ) -> Result<String, CompileError> {
        let ctx = VisitContext::root(self.alias.clone());

        let body = match condition {
            Condition::Single { expr, .. } => self.visit(expr, &ctx)?.into_text()?,
            Condition::Batch { exprs, .. } => {
                if exprs.is_empty() {
                    return Err(CompileError::unsupported(
                        "batch",
                        "a batched condition must carry at least one predicate",
                    ));
                }
                let members = exprs
                    .iter()
                    .map(|expr| Ok(self.visit(expr, &ctx)?.into_text()?))
                    .collect::<Result<Vec<_>, CompileError>>()?;
                if members.len() >= 2 {
                    // Extra layer keeps the OR batch visually distinct from
                    // its siblings.
                    format!("(({}))", members.join(" OR "))
                } else {
                    members.into_iter().next().unwrap_or_default()
                }
            }
            Condition::Group { children, op, .. } => {
                let rendered = children
                    .iter()
                    .map(|child| self.render_condition(child, None, false))
                    .collect::<Result<Vec<_>, CompileError>>()?;
                format!("({})", rendered.join(&format!(" {} ", op.as_aql())))
            }
        };

        match discriminator {
            Some(d) if !Self::is_pure_type_filter(condition, d) => {
                let scoped = format!("{} AND {body}", self.type_filter(d));
                if standalone {
                    Ok(scoped)
                } else {
                    Ok(format!("({scoped})"))
                }
            }
            _ => Ok(body),
        }
    }

    fn type_filter(&self, d: &Discriminator) -> String {
        format!(
            "{}.{} == {}",
            self.alias,
            d.field,
            Value::Text(d.value.to_string()).render_aql()
        )
    }

    /// A condition that already *is* the type filter gets no second
    /// discriminator conjoined in front of it.
    fn is_pure_type_filter(condition: &Condition, d: &Discriminator) -> bool {
        let Condition::Single {
            expr: Expr::Compare { lhs, op, rhs },
            ..
        } = condition
        else {
            return false;
        };

        matches!(
            (lhs.as_ref(), op, rhs.as_ref()),
            (Expr::Member(path), CompareOp::Eq, Expr::Literal(_)) if path.dotted() == d.field
        )
    }

    // ------------------------------------------------------------------
    // Lowering helpers
    // ------------------------------------------------------------------

    /// Member path text with virtual-property expansion, trailing-Count
    /// collapsing, and array unwrapping applied.
    fn member_text(&mut self, path: &MemberPath, ctx: &VisitContext) -> String {
        let root = if ctx.inline_array {
            "CURRENT".to_string()
        } else {
            ctx.alias.clone()
        };

        if let Some(head) = path.first()
            && let Some(vp) = self.model.virtual_property(head)
        {
            let backing = format!("{root}.{}", vp.backing_path);
            let filter = vp
                .list_filter
                .map(ToString::to_string)
                .or_else(|| ctx.list_filter.clone());
            let base = match filter {
                Some(f) => format!("NOT_NULL({backing},[])[* FILTER {f}]"),
                None => backing,
            };
            let wants_count = vp.conversion == Some(PropertyConversion::Count)
                || (path.segments().len() == 2 && path.last() == Some("Count"));
            return if wants_count {
                format!("COUNT({base})")
            } else {
                base
            };
        }

        if path.segments().len() >= 2 && path.last() == Some("Count") {
            let parent = path.parent();
            return match &ctx.list_filter {
                Some(f) => format!("COUNT(NOT_NULL({},[])[* FILTER {f}])", parent.render(&root)),
                None => format!("COUNT({})", parent.render(&root)),
            };
        }

        if ctx.unwrap_nested && path.segments().len() >= 2 {
            let rest = path.segments()[1..].join(".");
            return format!("{root}.{}[*].{rest}", path.segments()[0]);
        }

        if let Some(f) = &ctx.list_filter {
            return format!("NOT_NULL({},[])[* FILTER {f}]", path.render(&root));
        }

        path.render(&root)
    }

    /// Cast a literal against the declared field type, collecting every
    /// failed element into one validation error.
    fn cast_literal(&self, field: &str, value: &Value) -> Result<Value, CompileError> {
        match self.model.field_type(field) {
            Some(ty) => value
                .cast(ty)
                .map_err(|failures| CompileError::validation(field, failures)),
            None => Ok(value.clone()),
        }
    }

    fn like_call(
        &mut self,
        path: &MemberPath,
        value: &Value,
        ctx: &VisitContext,
        prefix_wildcard: bool,
        suffix_wildcard: bool,
    ) -> Result<String, CompileError> {
        let text = value.as_pattern_text().ok_or_else(|| {
            CompileError::validation(
                path.dotted(),
                vec![format!("{value:?} is not a string pattern")],
            )
        })?;

        let mut pattern = String::new();
        if prefix_wildcard {
            pattern.push('%');
        }
        pattern.push_str(&escape_like_pattern(text));
        if suffix_wildcard {
            pattern.push('%');
        }

        Ok(format!(
            "LIKE({},{},true)",
            self.member_text(path, ctx),
            Value::Text(pattern).render_aql()
        ))
    }
}

impl ExprVisitor for FilterVisitor<'_> {
    fn visit_root(&mut self, ctx: &VisitContext) -> Result<Fragment, CompileError> {
        let text = if ctx.inline_array {
            "CURRENT".to_string()
        } else {
            ctx.alias.clone()
        };
        Ok(Fragment::Text(text))
    }

    fn visit_member(
        &mut self,
        path: &MemberPath,
        ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        Ok(Fragment::Text(self.member_text(path, ctx)))
    }

    fn visit_literal(
        &mut self,
        value: &Value,
        ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        if ctx.custom {
            Ok(Fragment::Value(value.clone()))
        } else {
            Ok(Fragment::Text(value.render_aql()))
        }
    }

    fn visit_compare(
        &mut self,
        lhs: &Expr,
        op: CompareOp,
        rhs: &Expr,
        ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        // Normalize literal-on-the-left shapes by flipping the operator.
        let (member_side, op, literal_side) = match (lhs, rhs) {
            (Expr::Literal(_), Expr::Literal(_)) => {
                return Err(CompileError::unsupported(
                    "compare",
                    "comparison between two literals has no member path to lower",
                ));
            }
            (Expr::Literal(_), _) => (rhs, op.flip(), lhs),
            _ => (lhs, op, rhs),
        };

        let member = self
            .visit(member_side, &ctx.clone().with_member_lhs(true))?
            .into_text()?;

        let field = match member_side {
            Expr::Member(path) => path.dotted(),
            _ => member.clone(),
        };
        let value = self
            .visit(literal_side, &ctx.clone().with_custom(true))?
            .into_value()?;
        let value = self.cast_literal(&field, &value)?;

        Ok(Fragment::Text(format!(
            "{member} {} {}",
            op.as_aql(),
            value.render_aql()
        )))
    }

    fn visit_call(&mut self, call: &CallExpr, ctx: &VisitContext) -> Result<Fragment, CompileError> {
        let text = match call {
            CallExpr::StartsWith { path, value } => {
                self.like_call(path, value, ctx, false, true)?
            }
            CallExpr::EndsWith { path, value } => self.like_call(path, value, ctx, true, false)?,
            CallExpr::Contains { path, value } => self.like_call(path, value, ctx, true, true)?,

            CallExpr::Any { path, inner } => {
                // Only a simple comparison body is lowerable; anything
                // richer must fail rather than miscompile.
                let Expr::Compare { lhs, op, rhs } = inner.as_ref() else {
                    return Err(CompileError::unsupported(
                        "lambda",
                        "Any(...) supports a simple comparison body only",
                    ));
                };
                let (Expr::Member(inner_path), Expr::Literal(value)) = (lhs.as_ref(), rhs.as_ref())
                else {
                    return Err(CompileError::unsupported(
                        "lambda",
                        "Any(...) body must compare an element member to a literal",
                    ));
                };
                if !inner_path.is_simple() {
                    return Err(CompileError::unsupported(
                        "lambda",
                        format!(
                            "Any(...) body member '{}' must be a direct element field",
                            inner_path.dotted()
                        ),
                    ));
                }

                let field = format!("{}.{}", path.dotted(), inner_path.dotted());
                let value = self.cast_literal(&field, value)?;
                let full = MemberPath::parse(&field);
                format!(
                    "{} ANY {} {}",
                    self.member_text(&full, &ctx.clone().with_unwrap_nested(true)),
                    op.as_aql(),
                    value.render_aql()
                )
            }

            CallExpr::Count { path, filter } => match filter {
                None => format!("COUNT({})", self.member_text(path, ctx)),
                Some(predicate) => {
                    let inner_ctx = ctx.clone().with_inline_array(true);
                    let pred = self.visit(predicate, &inner_ctx)?.into_text()?;
                    let filtered =
                        self.member_text(path, &ctx.clone().with_list_filter(Some(pred)));
                    format!("COUNT({filtered})")
                }
            },

            CallExpr::SequenceEqual { left, right } => {
                let a = self.visit(left, ctx)?.into_text()?;
                let b = self.visit(right, ctx)?.into_text()?;
                format!("{a} IN {b}")
            }

            CallExpr::ContainsValueOf {
                path,
                values,
                match_all,
                substring,
            } => {
                let quantifier = if *match_all { "ALL" } else { "ANY" };
                if *substring {
                    let likes = values
                        .iter()
                        .map(|value| {
                            let text = value.as_pattern_text().ok_or_else(|| {
                                CompileError::validation(
                                    path.dotted(),
                                    vec![format!("{value:?} is not a string pattern")],
                                )
                            })?;
                            Ok(format!(
                                "LIKE(x,{},true)",
                                Value::Text(format!("%{}%", escape_like_pattern(text)))
                                    .render_aql()
                            ))
                        })
                        .collect::<Result<Vec<_>, CompileError>>()?;
                    let body = if likes.len() > 1 {
                        format!("({})", likes.join(" OR "))
                    } else {
                        likes.into_iter().next().unwrap_or_default()
                    };
                    format!(
                        "(FOR x IN NOT_NULL({},[]) RETURN {body}) {quantifier} == true",
                        path.render(&ctx.alias)
                    )
                } else {
                    let list = self.cast_literal(&path.dotted(), &Value::List(values.clone()))?;
                    let member = self.member_text(path, ctx);
                    if ctx.member_is_lhs {
                        format!("{member} {quantifier} == {}", list.render_aql())
                    } else {
                        format!("{} {quantifier} == {member}", list.render_aql())
                    }
                }
            }
        };

        Ok(Fragment::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{GROUP, ORG_UNIT};

    fn filter(conditions: &[Condition]) -> Option<String> {
        FilterVisitor::new(&GROUP, "g0", false)
            .render(conditions, None)
            .unwrap()
    }

    #[test]
    fn empty_conditions_inject_the_type_discriminator() {
        assert_eq!(
            filter(&[]),
            Some("FILTER g0.Kind == \"Group\"".to_string())
        );
    }

    #[test]
    fn no_discriminator_means_no_filter_at_all() {
        let fragment = FilterVisitor::new(&ORG_UNIT, "o0", false)
            .render(&[], None)
            .unwrap();
        assert_eq!(fragment, None);
    }

    #[test]
    fn single_condition_gets_the_discriminator_conjoined() {
        let cond = Condition::single(Expr::gt("Members.Count", Value::Int(10)));
        assert_eq!(
            filter(&[cond]),
            Some("FILTER g0.Kind == \"Group\" AND COUNT(g0.Members) > 10".to_string())
        );
    }

    #[test]
    fn pure_type_filter_is_not_double_scoped() {
        let cond = Condition::single(Expr::eq("Kind", Value::Text("Group".into())));
        assert_eq!(
            filter(&[cond]),
            Some("FILTER g0.Kind == \"Group\"".to_string())
        );
    }

    #[test]
    fn multiple_conditions_join_with_resolved_combine_and_outer_parens() {
        let a = Condition::single(Expr::eq("Name", Value::Text("ops".into())));
        let b = Condition::single(Expr::gt("Members.Count", Value::Int(3)))
            .combined(Combine::Or);

        assert_eq!(
            filter(&[a, b]),
            Some(
                "FILTER ((g0.Kind == \"Group\" AND g0.Name == \"ops\") \
                 OR (g0.Kind == \"Group\" AND COUNT(g0.Members) > 3))"
                    .to_string()
            )
        );
    }

    #[test]
    fn unspecified_combine_defaults_to_and() {
        let a = Condition::single(Expr::eq("Name", Value::Text("ops".into())));
        let b = Condition::single(Expr::eq("Name", Value::Text("dev".into())));

        let rendered = filter(&[a, b]).unwrap();
        assert!(rendered.contains(") AND ("), "got: {rendered}");
    }

    #[test]
    fn batch_members_join_with_or_and_double_parens() {
        let batch = Condition::batch(vec![
            Expr::eq("Name", Value::Text("a".into())),
            Expr::eq("Name", Value::Text("b".into())),
        ]);

        assert_eq!(
            filter(&[batch]),
            Some(
                "FILTER g0.Kind == \"Group\" AND ((g0.Name == \"a\" OR g0.Name == \"b\"))"
                    .to_string()
            )
        );
    }

    #[test]
    fn single_member_batch_is_not_double_wrapped() {
        let batch = Condition::batch(vec![Expr::eq("Name", Value::Text("a".into()))]);
        assert_eq!(
            filter(&[batch]),
            Some("FILTER g0.Kind == \"Group\" AND g0.Name == \"a\"".to_string())
        );
    }

    #[test]
    fn groups_render_children_joined_by_their_operator() {
        let group = Condition::group(
            vec![
                Condition::single(Expr::eq("Name", Value::Text("a".into()))),
                Condition::single(Expr::eq("Name", Value::Text("b".into()))),
            ],
            Combine::Or,
        );

        assert_eq!(
            filter(&[group]),
            Some(
                "FILTER g0.Kind == \"Group\" AND (g0.Name == \"a\" OR g0.Name == \"b\")"
                    .to_string()
            )
        );
    }

    #[test]
    fn literal_on_the_left_flips_the_operator() {
        let cond = Condition::single(Expr::compare(
            Expr::Literal(Value::Int(10)),
            CompareOp::Lt,
            Expr::member("MemberCount"),
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(rendered.contains("g0.MemberCount > 10"), "got: {rendered}");
    }

    #[test]
    fn starts_with_lowers_to_case_insensitive_like() {
        let cond = Condition::single(Expr::starts_with("Name", "A"));
        let rendered = filter(&[cond]).unwrap();
        assert!(rendered.contains("LIKE(g0.Name,\"A%\",true)"), "got: {rendered}");
    }

    #[test]
    fn like_patterns_escape_wildcard_characters() {
        let cond = Condition::single(Expr::contains("Name", "50%_off"));
        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains("LIKE(g0.Name,\"%50\\\\%\\\\_off%\",true)"),
            "got: {rendered}"
        );
    }

    #[test]
    fn any_with_simple_comparison_body_lowers_to_array_quantifier() {
        let cond = Condition::single(Expr::any(
            "Members",
            Expr::eq("Name", Value::Text("alice".into())),
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains("g0.Members[*].Name ANY == \"alice\""),
            "got: {rendered}"
        );
    }

    #[test]
    fn any_with_arbitrary_body_is_unsupported() {
        let cond = Condition::single(Expr::any(
            "Members",
            Expr::starts_with("Name", "a"),
        ));

        let err = FilterVisitor::new(&GROUP, "g0", false)
            .render(&[cond], None)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedNode { node: "lambda", .. }));
    }

    #[test]
    fn count_with_predicate_filters_the_expansion() {
        let cond = Condition::single(Expr::compare(
            Expr::count_where("Members", Expr::eq("Active", Value::Bool(true))),
            CompareOp::Gt,
            Expr::Literal(Value::Int(0)),
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains("COUNT(NOT_NULL(g0.Members,[])[* FILTER CURRENT.Active == true]) > 0"),
            "got: {rendered}"
        );
    }

    #[test]
    fn sequence_equal_lowers_to_in() {
        let cond = Condition::single(Expr::sequence_equal(
            Expr::member("Name"),
            Expr::Literal(Value::List(vec![
                Value::Text("a".into()),
                Value::Text("b".into()),
            ])),
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(rendered.contains("g0.Name IN [\"a\",\"b\"]"), "got: {rendered}");
    }

    #[test]
    fn contains_value_of_scalar_renders_quantified_membership() {
        let cond = Condition::single(Expr::contains_value_of(
            "Name",
            vec![Value::Text("a".into()), Value::Text("b".into())],
            false,
            false,
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains("[\"a\",\"b\"] ANY == g0.Name"),
            "got: {rendered}"
        );
    }

    #[test]
    fn contains_value_of_substring_renders_inline_expansion() {
        let cond = Condition::single(Expr::contains_value_of(
            "Name",
            vec![Value::Text("must".into()), Value::Text("shall".into())],
            false,
            true,
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains(
                "(FOR x IN NOT_NULL(g0.Name,[]) RETURN \
                 (LIKE(x,\"%must%\",true) OR LIKE(x,\"%shall%\",true))) ANY == true"
            ),
            "got: {rendered}"
        );
    }

    #[test]
    fn contains_value_of_match_all_uses_all_quantifier() {
        let cond = Condition::single(Expr::contains_value_of(
            "Name",
            vec![Value::Text("x".into())],
            true,
            true,
        ));

        let rendered = filter(&[cond]).unwrap();
        assert!(rendered.contains(") ALL == true"), "got: {rendered}");
    }

    #[test]
    fn virtual_property_expands_backing_expression_and_conversion() {
        let cond = Condition::single(Expr::gt("Functions", Value::Int(5)));
        let rendered = filter(&[cond]).unwrap();
        assert!(
            rendered.contains(
                "COUNT(NOT_NULL(g0.Assignments,[])[* FILTER CURRENT.Kind == \"Function\"]) > 5"
            ),
            "got: {rendered}"
        );
    }

    #[test]
    fn declared_field_type_casts_literals() {
        let cond = Condition::single(Expr::eq("MemberCount", Value::Text("7".into())));
        let rendered = filter(&[cond]).unwrap();
        assert!(rendered.contains("g0.MemberCount == 7"), "got: {rendered}");
    }

    #[test]
    fn failed_casts_collect_every_offending_value() {
        let cond = Condition::single(Expr::contains_value_of(
            "MemberCount",
            vec![
                Value::Text("1".into()),
                Value::Text("x".into()),
                Value::Text("y".into()),
            ],
            false,
            false,
        ));

        let err = FilterVisitor::new(&GROUP, "g0", false)
            .render(&[cond], None)
            .unwrap_err();
        let CompileError::Validation { field, failures } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(field, "MemberCount");
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn nested_mode_skips_the_discriminator() {
        let cond = Condition::single(Expr::starts_with("Name", "A"));
        let rendered = FilterVisitor::new(&GROUP, "nested0", true)
            .render(&[cond], None)
            .unwrap();
        assert_eq!(
            rendered,
            Some("FILTER LIKE(nested0.Name,\"A%\",true)".to_string())
        );
    }
}
