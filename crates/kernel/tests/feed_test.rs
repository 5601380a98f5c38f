#![allow(clippy::unwrap_used, clippy::expect_used)]
//! News feed contract tests: month filtering, date-ranked ordering, and the
//! windowing the feed applies after its in-memory sort.

use garuda_kernel::listing::{Listing, SortDirection};
use garuda_kernel::models::News;
use garuda_kernel::services::publish_date;
use uuid::Uuid;

fn article(title: &str, date: &str) -> News {
    News {
        id: Uuid::now_v7(),
        title: title.to_string(),
        category: "Cat".to_string(),
        publish_date: date.to_string(),
        published_month: publish_date::extract_month(date).map(|m| m as i16),
        content: format!("content {title}"),
    }
}

/// The feed's rank-and-window steps, applied to an in-memory set the way
/// `News::feed` applies them after the store filter.
fn rank_and_window(
    mut items: Vec<News>,
    sort: SortDirection,
    page: i64,
    page_size: i64,
) -> Listing<News> {
    items.sort_by_key(|n| (publish_date::parse_for_sort(&n.publish_date), n.id));
    if !sort.is_asc() {
        items.reverse();
    }
    Listing::from_sorted(items, page, page_size)
}

fn fixture() -> Vec<News> {
    vec![
        article("A", "09 Okt 2025 13:40"),
        article("B", "08 Sep 2025 09:00"),
        article("C", "01 Mei 2024"),
        article("D", ""),
    ]
}

#[test]
fn default_sort_is_descending_with_undated_last() {
    let listing = rank_and_window(fixture(), SortDirection::Desc, 1, 20);
    let titles: Vec<&str> = listing.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C", "D"]);
    assert_eq!(listing.pager.total, 4);
}

#[test]
fn ascending_sort_reverses_the_feed() {
    let listing = rank_and_window(fixture(), SortDirection::Asc, 1, 20);
    let titles: Vec<&str> = listing.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["D", "C", "B", "A"]);
}

#[test]
fn month_filter_keeps_exactly_the_matching_month() {
    // published_month across the fixture: {10, 9, 5, None}
    let filtered: Vec<News> = fixture()
        .into_iter()
        .filter(|n| n.published_month == Some(10))
        .collect();

    let listing = rank_and_window(filtered, SortDirection::Desc, 1, 20);
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].title, "A");
}

#[test]
fn feed_pagination_windows_are_stable() {
    let listing = rank_and_window(fixture(), SortDirection::Desc, 1, 2);
    let titles: Vec<&str> = listing.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["A", "B"]);
    assert!(listing.pager.has_next());

    let listing2 = rank_and_window(fixture(), SortDirection::Desc, 2, 2);
    let titles2: Vec<&str> = listing2.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles2, ["C", "D"]);
    assert!(!listing2.pager.has_next());
}

#[test]
fn derived_month_follows_the_display_date() {
    assert_eq!(article("X", "09 Okt 2025 13:40").published_month, Some(10));
    assert_eq!(article("X", "08 Sep 2025 09:00").published_month, Some(9));
    assert_eq!(article("X", "").published_month, None);
    assert_eq!(article("X", "July 2025").published_month, None);
}
