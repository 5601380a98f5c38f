//! News article model and the feed projection.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::{Listing, ListingQuery, SortDirection};
use crate::services::publish_date;

/// Default page size for the news feed.
pub const FEED_PAGE_SIZE: i64 = 20;

const NEWS_COLUMNS: [&str; 6] = [
    "id",
    "title",
    "category",
    "publish_date",
    "published_month",
    "content",
];

/// News record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct News {
    pub id: Uuid,
    pub title: String,

    /// Free-form category label.
    pub category: String,

    /// Display date string, mixed locales. See `services::publish_date`.
    pub publish_date: String,

    /// Calendar month derived from `publish_date` at write time.
    pub published_month: Option<i16>,

    pub content: String,
}

/// Input for creating a news article.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNews {
    pub title: String,
    pub category: String,
    pub publish_date: String,
    pub content: String,
}

/// Input for updating a news article.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNews {
    pub title: Option<String>,
    pub category: Option<String>,
    pub publish_date: Option<String>,
    pub content: Option<String>,
}

impl News {
    /// Create an article; `published_month` is derived from the date string.
    pub async fn create(pool: &PgPool, input: CreateNews) -> Result<Self> {
        let month = publish_date::extract_month(&input.publish_date).map(|m| m as i16);

        let news = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (id, title, category, publish_date, published_month, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, category, publish_date, published_month, content
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.title)
        .bind(&input.category)
        .bind(&input.publish_date)
        .bind(month)
        .bind(&input.content)
        .fetch_one(pool)
        .await
        .context("failed to create news")?;

        Ok(news)
    }

    /// Update an article, re-deriving `published_month` when the date changes.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateNews) -> Result<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let category = input.category.unwrap_or(current.category);
        let date = input.publish_date.unwrap_or(current.publish_date);
        let content = input.content.unwrap_or(current.content);
        let month = publish_date::extract_month(&date).map(|m| m as i16);

        let news = sqlx::query_as::<_, News>(
            r#"
            UPDATE news SET title = $1, category = $2, publish_date = $3, published_month = $4, content = $5
            WHERE id = $6
            RETURNING id, title, category, publish_date, published_month, content
            "#,
        )
        .bind(&title)
        .bind(&category)
        .bind(&date)
        .bind(month)
        .bind(&content)
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to update news")?;

        Ok(Some(news))
    }

    /// Find an article by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, category, publish_date, published_month, content FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch news by id")?;

        Ok(news)
    }

    /// List all articles, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, category, publish_date, published_month, content FROM news ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list news")?;

        Ok(news)
    }

    /// Feed projection: optional exact-month filter, ranked by the datetime
    /// parsed from `publish_date` (unparseable dates rank lowest, so they
    /// trail the descending feed), paged in memory.
    ///
    /// The rank lives in a display string only the application can parse, so
    /// unlike the forum listing the sort and window run here rather than in
    /// SQL; the month filter still runs in the store.
    pub async fn feed(
        pool: &PgPool,
        month: Option<i16>,
        sort: SortDirection,
        page: i64,
        page_size: i64,
    ) -> Result<Listing<Self>> {
        let listing_query = ListingQuery::table("news").filter_month("published_month", month);

        let sql = listing_query.build_select_all(&NEWS_COLUMNS);
        let mut items = sqlx::query_as::<_, News>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list news for feed")?;

        items.sort_by_key(|n| (publish_date::parse_for_sort(&n.publish_date), n.id));
        if !sort.is_asc() {
            items.reverse();
        }

        Ok(Listing::from_sorted(items, page, page_size))
    }

    /// Delete an article.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete news")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

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

    fn sort_titles(mut items: Vec<News>, sort: SortDirection) -> Vec<String> {
        items.sort_by_key(|n| (publish_date::parse_for_sort(&n.publish_date), n.id));
        if !sort.is_asc() {
            items.reverse();
        }
        items.into_iter().map(|n| n.title).collect()
    }

    #[test]
    fn feed_rank_is_parsed_date_desc_with_unparseable_last() {
        let items = vec![
            article("B", "08 Sep 2025 09:00"),
            article("D", ""),
            article("A", "09 Okt 2025 13:40"),
            article("C", "01 Mei 2024"),
        ];
        assert_eq!(
            sort_titles(items, SortDirection::Desc),
            vec!["A", "B", "C", "D"]
        );
    }

    #[test]
    fn feed_asc_is_the_exact_reverse() {
        let items = vec![
            article("A", "09 Okt 2025 13:40"),
            article("B", "08 Sep 2025 09:00"),
            article("C", "01 Mei 2024"),
            article("D", ""),
        ];
        let desc = sort_titles(items.clone(), SortDirection::Desc);
        let mut asc = sort_titles(items, SortDirection::Asc);
        asc.reverse();
        assert_eq!(desc, asc);
    }
}
