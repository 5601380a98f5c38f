//! Event ticket models: matches with nested vendor links.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Ticketed match record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketMatch {
    pub id: Uuid,
    pub team1: String,
    pub team2: String,
    pub img_team1: String,
    pub img_team2: String,
    pub img_cup: Option<String>,
    pub place: Option<String>,
    pub date: NaiveDate,
}

/// Vendor link offering tickets for a match.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketLink {
    pub id: Uuid,
    pub vendor: String,
    pub vendor_link: String,

    /// Price in whole rupiah, never negative.
    pub price: i64,

    pub img_vendor: String,
    pub match_id: Uuid,
}

/// Input for creating a ticketed match.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketMatch {
    pub team1: String,
    pub team2: String,
    pub img_team1: String,
    pub img_team2: String,
    pub img_cup: Option<String>,
    pub place: Option<String>,
    pub date: NaiveDate,
}

/// Input for creating a vendor link.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketLink {
    pub vendor: String,
    pub vendor_link: String,
    pub price: i64,
    pub img_vendor: String,
}

impl TicketMatch {
    /// Create a ticketed match.
    pub async fn create(pool: &PgPool, input: CreateTicketMatch) -> Result<Self> {
        let m = sqlx::query_as::<_, TicketMatch>(
            r#"
            INSERT INTO ticket_match (id, team1, team2, img_team1, img_team2, img_cup, place, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, team1, team2, img_team1, img_team2, img_cup, place, date
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.team1)
        .bind(&input.team2)
        .bind(&input.img_team1)
        .bind(&input.img_team2)
        .bind(&input.img_cup)
        .bind(&input.place)
        .bind(input.date)
        .fetch_one(pool)
        .await
        .context("failed to create ticket match")?;

        Ok(m)
    }

    /// Find a ticketed match by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let m = sqlx::query_as::<_, TicketMatch>(
            "SELECT id, team1, team2, img_team1, img_team2, img_cup, place, date FROM ticket_match WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch ticket match by id")?;

        Ok(m)
    }

    /// List all ticketed matches, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let matches = sqlx::query_as::<_, TicketMatch>(
            "SELECT id, team1, team2, img_team1, img_team2, img_cup, place, date FROM ticket_match ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list ticket matches")?;

        Ok(matches)
    }

    /// Delete a ticketed match and its links.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        // Links are deleted via CASCADE
        let result = sqlx::query("DELETE FROM ticket_match WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete ticket match")?;

        Ok(result.rows_affected() > 0)
    }
}

impl TicketLink {
    /// Create a vendor link for a match.
    pub async fn create(pool: &PgPool, match_id: Uuid, input: CreateTicketLink) -> Result<Self> {
        let link = sqlx::query_as::<_, TicketLink>(
            r#"
            INSERT INTO ticket_link (id, vendor, vendor_link, price, img_vendor, match_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, vendor, vendor_link, price, img_vendor, match_id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.vendor)
        .bind(&input.vendor_link)
        .bind(input.price.max(0))
        .bind(&input.img_vendor)
        .bind(match_id)
        .fetch_one(pool)
        .await
        .context("failed to create ticket link")?;

        Ok(link)
    }

    /// List vendor links for a match, oldest first.
    pub async fn list_for_match(pool: &PgPool, match_id: Uuid) -> Result<Vec<Self>> {
        let links = sqlx::query_as::<_, TicketLink>(
            "SELECT id, vendor, vendor_link, price, img_vendor, match_id FROM ticket_link WHERE match_id = $1 ORDER BY id",
        )
        .bind(match_id)
        .fetch_all(pool)
        .await
        .context("failed to list ticket links")?;

        Ok(links)
    }

    /// Delete a vendor link.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ticket_link WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete ticket link")?;

        Ok(result.rows_affected() > 0)
    }
}
