//! Listing SQL builder using SeaQuery.
//!
//! Produces the paired SELECT and COUNT statements for a filtered, sorted,
//! paged listing. Filters are applied in contract order: category first,
//! then free-text search (AND-ed together), then the rank sort with an id
//! tie-break, then the page window. The COUNT statement carries the exact
//! same predicates with no ordering or window.

use sea_query::{
    Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SimpleExpr,
    extension::postgres::PgExpr,
};

use super::SortDirection;

/// The reserved pseudo-category meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

/// Builder for a single listing query.
pub struct ListingQuery {
    table: &'static str,
    conds: Vec<SimpleExpr>,
    rank: Option<(&'static str, Order)>,
}

impl ListingQuery {
    /// Start a query against the given table.
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            conds: Vec::new(),
            rank: None,
        }
    }

    /// Exact-match category filter. `None`, the empty string, and the
    /// reserved `"all"` slug leave the listing unfiltered. The match is
    /// case-sensitive: an unknown slug yields zero rows, never an error.
    pub fn filter_category(mut self, col: &'static str, value: Option<&str>) -> Self {
        if let Some(slug) = value {
            if !slug.is_empty() && slug != CATEGORY_ALL {
                self.conds.push(Expr::col(Alias::new(col)).eq(slug));
            }
        }
        self
    }

    /// Exact-match filter on an arbitrary column.
    pub fn filter_eq<V>(mut self, col: &'static str, value: V) -> Self
    where
        V: Into<sea_query::Value>,
    {
        self.conds.push(Expr::col(Alias::new(col)).eq(value.into()));
        self
    }

    /// Optional exact-match month filter (1-12).
    pub fn filter_month(mut self, col: &'static str, month: Option<i16>) -> Self {
        if let Some(m) = month {
            self.conds.push(Expr::col(Alias::new(col)).eq(m));
        }
        self
    }

    /// Case-insensitive substring search OR-ed across the given columns and
    /// AND-ed with the other filters. Empty or missing input is a no-op.
    pub fn search(mut self, cols: &[&'static str], query: Option<&str>) -> Self {
        let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return self;
        };
        let pattern = format!("%{}%", escape_like(q));
        let mut matched: Option<SimpleExpr> = None;
        for col in cols {
            let expr = Expr::col(Alias::new(*col)).ilike(pattern.clone());
            matched = Some(match matched {
                Some(prev) => prev.or(expr),
                None => expr,
            });
        }
        if let Some(expr) = matched {
            self.conds.push(expr);
        }
        self
    }

    /// Sort by the rank column, tie-broken on `id` in the same direction so
    /// repeated identical requests paginate deterministically.
    pub fn order_by_rank(mut self, col: &'static str, direction: SortDirection) -> Self {
        let order = if direction.is_asc() {
            Order::Asc
        } else {
            Order::Desc
        };
        self.rank = Some((col, order));
        self
    }

    /// Build the SELECT statement for one page window.
    pub fn build_select(&self, cols: &[&'static str], page: i64, page_size: i64) -> String {
        let mut query = Query::select();

        for col in cols {
            query.column(Alias::new(*col));
        }
        query.from(Alias::new(self.table));

        for cond in &self.conds {
            query.and_where(cond.clone());
        }

        if let Some((col, order)) = &self.rank {
            query.order_by(Alias::new(*col), order.clone());
            query.order_by(Alias::new("id"), order.clone());
        }

        let page = page.max(1);
        let page_size = page_size.max(1);
        query.limit(page_size as u64);
        query.offset(((page - 1) * page_size) as u64);

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a SELECT with the filters and ordering but no page window.
    ///
    /// For feed projections whose rank is computed in the application: the
    /// store does the filtering, the caller sorts and windows.
    pub fn build_select_all(&self, cols: &[&'static str]) -> String {
        let mut query = Query::select();

        for col in cols {
            query.column(Alias::new(*col));
        }
        query.from(Alias::new(self.table));

        for cond in &self.conds {
            query.and_where(cond.clone());
        }

        if let Some((col, order)) = &self.rank {
            query.order_by(Alias::new(*col), order.clone());
            query.order_by(Alias::new("id"), order.clone());
        }

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the matching COUNT statement (same predicates, no window).
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(self.table));

        for cond in &self.conds {
            query.and_where(cond.clone());
        }

        query.to_string(PostgresQueryBuilder)
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base() -> ListingQuery {
        ListingQuery::table("post").order_by_rank("created", SortDirection::Desc)
    }

    #[test]
    fn select_without_filters_has_only_window_and_order() {
        let sql = base().build_select(&["id", "title"], 1, 6);
        assert_eq!(
            sql,
            r#"SELECT "id", "title" FROM "post" ORDER BY "created" DESC, "id" DESC LIMIT 6 OFFSET 0"#
        );
    }

    #[test]
    fn category_all_emits_no_predicate() {
        let sql = base()
            .filter_category("category", Some("all"))
            .build_select(&["id"], 1, 6);
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn category_filter_is_exact_match() {
        let sql = base()
            .filter_category("category", Some("jersey"))
            .build_select(&["id"], 1, 6);
        assert!(sql.contains(r#""category" = 'jersey'"#));
    }

    #[test]
    fn search_ors_across_fields_and_ands_with_category() {
        let sql = base()
            .filter_category("category", Some("news"))
            .search(&["title", "body", "excerpt"], Some("garuda"))
            .build_select(&["id"], 1, 6);
        assert!(sql.contains(r#""category" = 'news'"#));
        assert!(sql.contains(r#""title" ILIKE '%garuda%'"#));
        assert!(sql.contains(r#""body" ILIKE '%garuda%'"#));
        assert!(sql.contains(r#""excerpt" ILIKE '%garuda%'"#));
        // Search is one AND-ed group: category AND (title OR body OR excerpt).
        assert!(sql.contains("AND ("));
    }

    #[test]
    fn blank_search_is_a_noop() {
        let sql = base()
            .search(&["title"], Some("   "))
            .build_select(&["id"], 1, 6);
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        let sql = base()
            .search(&["title"], Some("100%_sure"))
            .build_select(&["id"], 1, 6);
        assert!(sql.contains(r"100\%\_sure"));
    }

    #[test]
    fn window_comes_from_page_and_size() {
        let sql = base().build_select(&["id"], 3, 6);
        assert!(sql.ends_with("LIMIT 6 OFFSET 12"));
    }

    #[test]
    fn ascending_sort_reverses_rank_and_tiebreak() {
        let sql = ListingQuery::table("post")
            .order_by_rank("created", SortDirection::Asc)
            .build_select(&["id"], 1, 6);
        assert!(sql.contains(r#"ORDER BY "created" ASC, "id" ASC"#));
    }

    #[test]
    fn count_carries_identical_predicates_without_order_or_window() {
        let q = ListingQuery::table("post")
            .filter_category("category", Some("news"))
            .search(&["title", "body"], Some("cup"))
            .order_by_rank("created", SortDirection::Desc);
        let count = q.build_count();
        assert!(count.starts_with(r#"SELECT COUNT(*) FROM "post""#));
        assert!(count.contains(r#""category" = 'news'"#));
        assert!(count.contains("ILIKE"));
        assert!(!count.contains("ORDER BY"));
        assert!(!count.contains("LIMIT"));
    }

    #[test]
    fn month_filter_is_exact() {
        let sql = ListingQuery::table("news")
            .filter_month("published_month", Some(10))
            .order_by_rank("id", SortDirection::Desc)
            .build_select(&["id"], 1, 20);
        assert!(sql.contains(r#""published_month" = 10"#));

        let none = ListingQuery::table("news")
            .filter_month("published_month", None)
            .build_count();
        assert!(!none.contains("published_month"));
    }
}
