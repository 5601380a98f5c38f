//! Forum category model.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Category record. A named partition label over forum posts; the reserved
/// slug `"all"` never exists as a row and means "no filter".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// The default set seeded into an empty forum.
const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("News", "news"),
    ("Player", "player"),
    ("Merch", "merch"),
    ("Ticket", "ticket"),
    ("Match", "match"),
];

impl Category {
    /// List all categories ordered by name.
    pub async fn all(pool: &PgPool) -> Result<Vec<Self>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM category ORDER BY name")
                .fetch_all(pool)
                .await
                .context("failed to list categories")?;

        Ok(categories)
    }

    /// Find a category by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM category WHERE slug = $1")
                .bind(slug)
                .fetch_optional(pool)
                .await
                .context("failed to fetch category by slug")?;

        Ok(category)
    }

    /// Create a category.
    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Self> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO category (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("failed to create category")?;

        Ok(category)
    }

    /// Seed the default categories when none exist yet.
    pub async fn ensure_defaults(pool: &PgPool) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(pool)
            .await
            .context("failed to count categories")?;

        if count > 0 {
            return Ok(());
        }

        for (name, slug) in DEFAULT_CATEGORIES {
            Self::create(pool, name, slug).await?;
        }

        Ok(())
    }
}
