//! Module: result
//! Responsibility: assemble rendered fragments into the final query string
//! and its count-query counterpart. Fragments are immutable once built;
//! both strings are pure functions of the fragments.

///
/// QueryResult
///
/// Rendered fragments for one compiled query plus the collections the
/// query touches. The distinct-by-key stage, when present, is inserted
/// between filter and sort/limit; its count variant reuses the grouping
/// without sort/limit.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryResult {
    source: String,
    filter: Option<String>,
    sort: Option<String>,
    limit: Option<String>,
    /// Expression the final `RETURN` wraps.
    projected: String,
    alias: String,
    distinct_key: Option<String>,
    collections: Vec<String>,
}

impl QueryResult {
    #[expect(clippy::too_many_arguments)]
    pub(crate) const fn new(
        source: String,
        filter: Option<String>,
        sort: Option<String>,
        limit: Option<String>,
        projected: String,
        alias: String,
        distinct_key: Option<String>,
        collections: Vec<String>,
    ) -> Self {
        Self {
            source,
            filter,
            sort,
            limit,
            projected,
            alias,
            distinct_key,
            collections,
        }
    }

    /// Iteration alias bound to the root collection.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Collections this query touches, in stable order.
    #[must_use]
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// The full query string.
    #[must_use]
    pub fn query(&self) -> String {
        let mut parts = vec![self.source.clone()];
        parts.extend(self.filter.clone());
        match &self.distinct_key {
            None => {
                parts.extend(self.sort.clone());
                parts.extend(self.limit.clone());
                parts.push(format!("RETURN {}", self.projected));
            }
            Some(key) => {
                parts.push(self.distinct_stage(key));
                parts.extend(self.sort.clone());
                parts.extend(self.limit.clone());
                parts.push(format!("RETURN {}", self.alias));
            }
        }
        parts.join(" ")
    }

    /// The companion count query: the same selection, filter, and
    /// projection wrapped in a LENGTH(...) expression. Sort and limit are
    /// irrelevant to a count and are dropped.
    #[must_use]
    pub fn count_query(&self) -> String {
        let mut parts = vec![self.source.clone()];
        parts.extend(self.filter.clone());
        match &self.distinct_key {
            None => parts.push(format!("RETURN {}", self.projected)),
            Some(key) => {
                parts.push(self.distinct_stage(key));
                parts.push(format!("RETURN {}", self.alias));
            }
        }

        format!("RETURN {{DocumentCount: LENGTH({})}}", parts.join(" "))
    }

    /// Group/collect/first deduplication stage for distinct-by-key
    /// queries.
    fn distinct_stage(&self, key: &str) -> String {
        format!(
            "LET value = FIRST([{projected}]) COLLECT key = value.{key} \
             INTO grouped = value LET {alias} = FIRST(grouped)",
            projected = self.projected,
            alias = self.alias,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(distinct: Option<&str>) -> QueryResult {
        QueryResult::new(
            "FOR g0 IN GroupQuery".to_string(),
            Some("FILTER g0.Kind == \"Group\"".to_string()),
            Some("SORT g0.Name ASC,g0.Id ASC".to_string()),
            Some("LIMIT 0,100".to_string()),
            "g0".to_string(),
            "g0".to_string(),
            distinct.map(ToString::to_string),
            vec!["GroupQuery".to_string()],
        )
    }

    #[test]
    fn plain_query_orders_fragments() {
        assert_eq!(
            result(None).query(),
            "FOR g0 IN GroupQuery FILTER g0.Kind == \"Group\" \
             SORT g0.Name ASC,g0.Id ASC LIMIT 0,100 RETURN g0"
        );
    }

    #[test]
    fn plain_count_drops_sort_and_limit() {
        assert_eq!(
            result(None).count_query(),
            "RETURN {DocumentCount: LENGTH(FOR g0 IN GroupQuery \
             FILTER g0.Kind == \"Group\" RETURN g0)}"
        );
    }

    #[test]
    fn distinct_query_inserts_the_grouping_stage_between_filter_and_sort() {
        assert_eq!(
            result(Some("Name")).query(),
            "FOR g0 IN GroupQuery FILTER g0.Kind == \"Group\" \
             LET value = FIRST([g0]) COLLECT key = value.Name \
             INTO grouped = value LET g0 = FIRST(grouped) \
             SORT g0.Name ASC,g0.Id ASC LIMIT 0,100 RETURN g0"
        );
    }

    #[test]
    fn distinct_count_reuses_grouping_without_sort_or_limit() {
        assert_eq!(
            result(Some("Name")).count_query(),
            "RETURN {DocumentCount: LENGTH(FOR g0 IN GroupQuery \
             FILTER g0.Kind == \"Group\" LET value = FIRST([g0]) \
             COLLECT key = value.Name INTO grouped = value \
             LET g0 = FIRST(grouped) RETURN g0)}"
        );
    }

    #[test]
    fn missing_fragments_leave_no_double_spaces() {
        let sparse = QueryResult::new(
            "FOR o0 IN OrgUnits".to_string(),
            None,
            None,
            None,
            "o0".to_string(),
            "o0".to_string(),
            None,
            vec!["OrgUnits".to_string()],
        );

        assert_eq!(sparse.query(), "FOR o0 IN OrgUnits RETURN o0");
    }
}
