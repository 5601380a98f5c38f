//! Forum post and comment models.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::query::CATEGORY_ALL;
use crate::listing::{Listing, ListingQuery, Pager, SortDirection};

use super::Category;

/// Fixed page size for the forum listing.
pub const FORUM_PAGE_SIZE: i64 = 6;

/// Auto-derived excerpts keep the first 220 characters of the body.
const EXCERPT_LEN: usize = 220;

/// Maximum slug length.
const SLUG_LEN: usize = 220;

/// Published status value.
pub const STATUS_PUBLISHED: &str = "published";

/// Draft status value.
pub const STATUS_DRAFT: &str = "draft";

const POST_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "slug",
    "author_name",
    "category_id",
    "excerpt",
    "body",
    "status",
    "created",
    "changed",
    "like_count",
];

/// Forum post record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,

    /// URL slug, unique, derived from the title.
    pub slug: String,

    pub author_name: String,
    pub category_id: Uuid,

    /// Short teaser; derived from the body when not supplied.
    pub excerpt: String,

    pub body: String,

    /// `published` or `draft`. Only published posts are listed.
    pub status: String,

    /// Unix timestamp when created (listing rank).
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,

    /// Denormalized like counter, never negative.
    pub like_count: i32,
}

/// Comment record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created: i64,
}

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub author_name: String,
    pub category_id: Uuid,
    pub body: String,
    pub excerpt: Option<String>,
    pub status: Option<String>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub post_id: Uuid,
    pub author_name: String,
    pub body: String,
}

impl Post {
    /// Check if this post is published.
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }

    /// Create a post, deriving the slug and excerpt where absent.
    pub async fn create(pool: &PgPool, input: CreatePost) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let slug = unique_slug(pool, &input.title).await?;
        let excerpt = match input.excerpt {
            Some(e) if !e.trim().is_empty() => e,
            _ => input.body.chars().take(EXCERPT_LEN).collect(),
        };

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO post (id, title, slug, author_name, category_id, excerpt, body, status, created, changed, like_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0)
            RETURNING id, title, slug, author_name, category_id, excerpt, body, status, created, changed, like_count
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.title)
        .bind(&slug)
        .bind(&input.author_name)
        .bind(input.category_id)
        .bind(&excerpt)
        .bind(&input.body)
        .bind(input.status.as_deref().unwrap_or(STATUS_PUBLISHED))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create post")?;

        Ok(post)
    }

    /// Find a published post by slug.
    pub async fn find_published_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, slug, author_name, category_id, excerpt, body, status, created, changed, like_count FROM post WHERE slug = $1 AND status = $2",
        )
        .bind(slug)
        .bind(STATUS_PUBLISHED)
        .fetch_optional(pool)
        .await
        .context("failed to fetch post by slug")?;

        Ok(post)
    }

    /// Find a post by slug regardless of status.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, slug, author_name, category_id, excerpt, body, status, created, changed, like_count FROM post WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("failed to fetch post by slug")?;

        Ok(post)
    }

    /// List published posts filtered by category slug and free-text query,
    /// newest first, one fixed-size page at a time.
    ///
    /// An unknown category slug yields an empty listing, not an error. The
    /// count and the slice run as two statements; a write landing between
    /// them only skews `total`, never the window itself.
    pub async fn list_filtered(
        pool: &PgPool,
        category_slug: Option<&str>,
        query: Option<&str>,
        page: i64,
    ) -> Result<Listing<Self>> {
        let mut listing_query = ListingQuery::table("post")
            .filter_eq("status", STATUS_PUBLISHED)
            .order_by_rank("created", SortDirection::Desc);

        if let Some(slug) = category_slug.filter(|s| !s.is_empty() && *s != CATEGORY_ALL) {
            let Some(category) = Category::find_by_slug(pool, slug).await? else {
                return Ok(Listing {
                    items: Vec::new(),
                    pager: Pager::new(page, FORUM_PAGE_SIZE, 0),
                });
            };
            listing_query = listing_query.filter_eq("category_id", category.id);
        }

        listing_query = listing_query.search(&["title", "body", "excerpt"], query);

        let total: i64 = sqlx::query_scalar(&listing_query.build_count())
            .fetch_one(pool)
            .await
            .context("failed to count posts")?;

        let sql = listing_query.build_select(&POST_COLUMNS, page, FORUM_PAGE_SIZE);
        let items = sqlx::query_as::<_, Post>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list posts")?;

        Ok(Listing {
            items,
            pager: Pager::new(page, FORUM_PAGE_SIZE, total),
        })
    }

    /// Apply a like or unlike to the denormalized counter.
    ///
    /// The decrement is guarded so the counter never drops below zero even
    /// if ledger and counter ever disagree.
    pub async fn apply_like(pool: &PgPool, id: Uuid, liked: bool) -> Result<i32> {
        let sql = if liked {
            "UPDATE post SET like_count = like_count + 1 WHERE id = $1 RETURNING like_count"
        } else {
            "UPDATE post SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1 RETURNING like_count"
        };

        let count: i32 = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(pool)
            .await
            .context("failed to update like count")?;

        Ok(count)
    }

    /// Delete a post and its comments.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        // Comments are deleted via CASCADE
        let result = sqlx::query("DELETE FROM post WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}

impl Comment {
    /// Create a comment on a post.
    pub async fn create(pool: &PgPool, input: CreateComment) -> Result<Self> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comment (id, post_id, author_name, body, created)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_name, body, created
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.post_id)
        .bind(&input.author_name)
        .bind(&input.body)
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(pool)
        .await
        .context("failed to create comment")?;

        Ok(comment)
    }

    /// List comments for a post, oldest first.
    pub async fn list_for_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<Self>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_name, body, created FROM comment WHERE post_id = $1 ORDER BY created, id",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("failed to list comments")?;

        Ok(comments)
    }

    /// Find a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_name, body, created FROM comment WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch comment by id")?;

        Ok(comment)
    }

    /// Delete a comment.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comment WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Turn a title into a URL slug: lowercase, alphanumerics kept, runs of
/// anything else collapsed to single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    let slug: String = slug.trim_end_matches('-').chars().take(SLUG_LEN).collect();
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Derive a slug that does not collide with an existing post.
async fn unique_slug(pool: &PgPool, title: &str) -> Result<String> {
    let base = slugify(title);
    if Post::find_by_slug(pool, &base).await?.is_none() {
        return Ok(base);
    }
    let suffix = Uuid::now_v7().simple().to_string();
    Ok(format!("{}-{}", base, &suffix[..8]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Garuda Wins Again"), "garuda-wins-again");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("Skor 3-0"), "skor-3-0");
    }

    #[test]
    fn slugify_never_empty() {
        assert_eq!(slugify("!!!"), "post");
        assert_eq!(slugify(""), "post");
    }

    #[test]
    fn slugify_truncates_long_titles() {
        let long = "a".repeat(500);
        assert_eq!(slugify(&long).len(), 220);
    }

    #[test]
    fn post_status_check() {
        let post = Post {
            id: Uuid::now_v7(),
            title: "T".to_string(),
            slug: "t".to_string(),
            author_name: "A".to_string(),
            category_id: Uuid::now_v7(),
            excerpt: String::new(),
            body: String::new(),
            status: STATUS_PUBLISHED.to_string(),
            created: 0,
            changed: 0,
            like_count: 0,
        };
        assert!(post.is_published());
    }
}
