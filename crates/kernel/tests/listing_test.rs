#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Listing engine contract tests.
//!
//! Exercises the page window math, parameter normalization, and the SQL the
//! query builder emits — the parts of the listing contract that hold for
//! every store.

use garuda_kernel::listing::{
    Listing, ListingQuery, Pager, SortDirection, month_from, page_from, page_size_from,
};

#[test]
fn eleven_items_at_page_size_six_split_six_then_five() {
    let items: Vec<u32> = (0..11).collect();

    let first = Listing::from_sorted(items.clone(), 1, 6);
    assert_eq!(first.items.len(), 6);
    assert!(first.pager.has_next());
    assert_eq!(first.pager.total, 11);

    let second = Listing::from_sorted(items, 2, 6);
    assert_eq!(second.items.len(), 5);
    assert!(!second.pager.has_next());
}

#[test]
fn page_far_past_the_end_is_an_empty_success() {
    let listing = Listing::from_sorted(vec![1, 2, 3], 999, 6);
    assert!(listing.items.is_empty());
    assert!(!listing.pager.has_next());
}

#[test]
fn concatenated_pages_reproduce_the_filtered_set_exactly_once() {
    let items: Vec<u32> = (0..40).collect();
    let mut collected = Vec::new();
    let mut page = 1;
    loop {
        let listing = Listing::from_sorted(items.clone(), page, 7);
        collected.extend(listing.items);
        if !listing.pager.has_next() {
            break;
        }
        page += 1;
    }
    assert_eq!(collected, items);
}

#[test]
fn has_next_matches_the_page_size_arithmetic() {
    for total in 0..30i64 {
        for page in 1..6i64 {
            let pager = Pager::new(page, 6, total);
            assert_eq!(pager.has_next(), page * 6 < total, "page={page} total={total}");
        }
    }
}

#[test]
fn malformed_page_inputs_fall_back_to_defaults() {
    assert_eq!(page_from(Some("seven")), 1);
    assert_eq!(page_from(Some("")), 1);
    assert_eq!(page_from(None), 1);
    assert_eq!(page_from(Some("3")), 3);

    assert_eq!(page_size_from(Some("9999"), 20), 100);
    assert_eq!(page_size_from(Some("-1"), 20), 1);
    assert_eq!(page_size_from(Some("oops"), 20), 20);

    assert_eq!(month_from(Some("10")), Some(10));
    assert_eq!(month_from(Some("0")), None);
    assert_eq!(month_from(Some("13")), None);
}

#[test]
fn category_then_search_then_sort_then_window() {
    let sql = ListingQuery::table("post")
        .filter_category("category", Some("news"))
        .search(&["title", "body"], Some("garuda"))
        .order_by_rank("created", SortDirection::Desc)
        .build_select(&["id", "title"], 2, 6);

    let where_pos = sql.find("WHERE").unwrap();
    let category_pos = sql.find(r#""category" = 'news'"#).unwrap();
    let search_pos = sql.find("ILIKE").unwrap();
    let order_pos = sql.find("ORDER BY").unwrap();
    let limit_pos = sql.find("LIMIT 6 OFFSET 6").unwrap();

    assert!(where_pos < category_pos);
    assert!(category_pos < search_pos);
    assert!(search_pos < order_pos);
    assert!(order_pos < limit_pos);
}

#[test]
fn all_category_and_missing_search_emit_no_predicates() {
    let sql = ListingQuery::table("merch")
        .filter_category("category", Some("all"))
        .search(&["name", "description"], None)
        .order_by_rank("created", SortDirection::Desc)
        .build_select(&["id"], 1, 12);
    assert!(!sql.contains("WHERE"));
}

#[test]
fn count_and_select_share_predicates() {
    let query = ListingQuery::table("merch")
        .filter_category("category", Some("jersey"))
        .search(&["name", "description"], Some("away kit"))
        .order_by_rank("created", SortDirection::Desc);

    let select = query.build_select(&["id"], 1, 12);
    let count = query.build_count();

    for predicate in [r#""category" = 'jersey'"#, "ILIKE", "away kit"] {
        assert!(select.contains(predicate), "select missing {predicate}");
        assert!(count.contains(predicate), "count missing {predicate}");
    }
    assert!(!count.contains("LIMIT"));
    assert!(!count.contains("ORDER BY"));
}

#[test]
fn sort_toggle_reverses_ordering_exactly() {
    // Unique rank values: ascending output is the exact reverse of descending.
    let ranks = vec![5u32, 1, 9, 3, 7];

    let mut asc = ranks.clone();
    asc.sort_unstable();
    let mut desc = asc.clone();
    desc.reverse();

    let asc_listing = Listing::from_sorted(asc.clone(), 1, 10);
    let desc_listing = Listing::from_sorted(desc.clone(), 1, 10);

    let mut reversed = desc_listing.items.clone();
    reversed.reverse();
    assert_eq!(asc_listing.items, reversed);
}

#[test]
fn sort_direction_changes_order_by_clause() {
    let desc = ListingQuery::table("news")
        .order_by_rank("id", SortDirection::Desc)
        .build_select(&["id"], 1, 20);
    let asc = ListingQuery::table("news")
        .order_by_rank("id", SortDirection::Asc)
        .build_select(&["id"], 1, 20);

    assert!(desc.contains(r#"ORDER BY "id" DESC, "id" DESC"#));
    assert!(asc.contains(r#"ORDER BY "id" ASC, "id" ASC"#));
}
