///
/// VisitContext
///
/// Immutable directive bag threaded through visitor recursion. Created
/// fresh at the root of each visitor entry point and derived — never
/// mutated — at each recursive call via copy-with-overrides, so a
/// directive set deep in one sub-tree can never leak into a sibling.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct VisitContext {
    /// Iteration alias of the current collection.
    pub alias: String,
    /// Produce a `Fragment::Value` instead of emitting text.
    pub custom: bool,
    /// The member path under visit is the left-hand side of a comparison;
    /// affects operand ordering for quantified array expansions.
    pub member_is_lhs: bool,
    /// Apply nested-property unwrapping (`path[*].rest`) to member paths.
    pub unwrap_nested: bool,
    /// Inline `[* FILTER ...]` fragment for array expansions.
    pub list_filter: Option<String>,
    /// Inside an inline array projection; member paths render against the
    /// implicit `CURRENT` iterator instead of the collection alias.
    pub inline_array: bool,
}

impl VisitContext {
    pub(crate) fn root(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub(crate) fn with_custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }

    #[must_use]
    pub(crate) fn with_member_lhs(mut self, member_is_lhs: bool) -> Self {
        self.member_is_lhs = member_is_lhs;
        self
    }

    #[must_use]
    pub(crate) fn with_unwrap_nested(mut self, unwrap_nested: bool) -> Self {
        self.unwrap_nested = unwrap_nested;
        self
    }

    #[must_use]
    pub(crate) fn with_list_filter(mut self, list_filter: Option<String>) -> Self {
        self.list_filter = list_filter;
        self
    }

    #[must_use]
    pub(crate) fn with_inline_array(mut self, inline_array: bool) -> Self {
        self.inline_array = inline_array;
        self
    }
}
