//! Merchandise model.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::{Listing, ListingQuery, Pager, SortDirection};

/// Fixed page size for the merch catalog listing.
pub const MERCH_PAGE_SIZE: i64 = 12;

/// Valid merchandise categories; anything else is stored as `others`.
pub const MERCH_CATEGORIES: [&str; 7] = [
    "cap", "hoodie", "jacket", "jersey", "keychain", "scarf", "others",
];

const MERCH_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "vendor",
    "price",
    "stock",
    "description",
    "thumbnail",
    "category",
    "link",
    "created",
];

/// Merchandise record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Merch {
    pub id: Uuid,
    pub name: String,
    pub vendor: String,

    /// Price in whole rupiah, never negative.
    pub price: i64,

    /// Units in stock, never negative.
    pub stock: i64,

    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub link: String,

    /// Unix timestamp when created (listing rank).
    pub created: i64,
}

/// Input for creating a merch item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMerch {
    pub name: String,
    pub vendor: String,
    pub price: i64,
    pub stock: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub link: String,
}

/// Input for updating a merch item. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMerch {
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
}

/// Normalize a requested category to a known label.
pub fn normalize_category(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if MERCH_CATEGORIES.contains(&lowered.as_str()) {
        lowered
    } else {
        "others".to_string()
    }
}

impl Merch {
    /// Create a merch item.
    pub async fn create(pool: &PgPool, input: CreateMerch) -> Result<Self> {
        let merch = sqlx::query_as::<_, Merch>(
            r#"
            INSERT INTO merch (id, name, vendor, price, stock, description, thumbnail, category, link, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, vendor, price, stock, description, thumbnail, category, link, created
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.vendor)
        .bind(input.price.max(0))
        .bind(input.stock.max(0))
        .bind(&input.description)
        .bind(&input.thumbnail)
        .bind(normalize_category(&input.category))
        .bind(&input.link)
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(pool)
        .await
        .context("failed to create merch")?;

        Ok(merch)
    }

    /// Update a merch item, keeping current values for absent fields.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateMerch) -> Result<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let category = input
            .category
            .map(|c| normalize_category(&c))
            .unwrap_or(current.category);

        let merch = sqlx::query_as::<_, Merch>(
            r#"
            UPDATE merch SET name = $1, vendor = $2, price = $3, stock = $4, description = $5, thumbnail = $6, category = $7, link = $8
            WHERE id = $9
            RETURNING id, name, vendor, price, stock, description, thumbnail, category, link, created
            "#,
        )
        .bind(input.name.unwrap_or(current.name))
        .bind(input.vendor.unwrap_or(current.vendor))
        .bind(input.price.unwrap_or(current.price).max(0))
        .bind(input.stock.unwrap_or(current.stock).max(0))
        .bind(input.description.unwrap_or(current.description))
        .bind(input.thumbnail.unwrap_or(current.thumbnail))
        .bind(category)
        .bind(input.link.unwrap_or(current.link))
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to update merch")?;

        Ok(Some(merch))
    }

    /// Find a merch item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let merch = sqlx::query_as::<_, Merch>(
            "SELECT id, name, vendor, price, stock, description, thumbnail, category, link, created FROM merch WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch merch by id")?;

        Ok(merch)
    }

    /// List all merch, newest first (JSON feed).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let merch = sqlx::query_as::<_, Merch>(
            "SELECT id, name, vendor, price, stock, description, thumbnail, category, link, created FROM merch ORDER BY created DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list merch")?;

        Ok(merch)
    }

    /// Catalog listing: category filter plus free-text search over name and
    /// description, newest first, fixed page size.
    pub async fn list_filtered(
        pool: &PgPool,
        category: Option<&str>,
        query: Option<&str>,
        page: i64,
    ) -> Result<Listing<Self>> {
        let listing_query = ListingQuery::table("merch")
            .filter_category("category", category)
            .search(&["name", "description"], query)
            .order_by_rank("created", SortDirection::Desc);

        let total: i64 = sqlx::query_scalar(&listing_query.build_count())
            .fetch_one(pool)
            .await
            .context("failed to count merch")?;

        let sql = listing_query.build_select(&MERCH_COLUMNS, page, MERCH_PAGE_SIZE);
        let items = sqlx::query_as::<_, Merch>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list merch")?;

        Ok(Listing {
            items,
            pager: Pager::new(page, MERCH_PAGE_SIZE, total),
        })
    }

    /// Delete a merch item.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM merch WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete merch")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_categories_become_others() {
        assert_eq!(normalize_category("jersey"), "jersey");
        assert_eq!(normalize_category("JERSEY"), "jersey");
        assert_eq!(normalize_category(" scarf "), "scarf");
        assert_eq!(normalize_category("spaceship"), "others");
        assert_eq!(normalize_category(""), "others");
    }
}
