//! Squad player model.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Field positions a player may be registered for. Blank is allowed.
pub const POSITIONS: [&str; 14] = [
    "GK", "LWB", "LB", "CB", "RB", "RWB", "LM", "CM", "CDM", "CAM", "RM", "LW", "ST", "RW",
];

/// Player record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub photo_url: String,
    pub birth_date: Option<NaiveDate>,
    pub club: String,
    pub height_cm: Option<i32>,

    /// Up to three registered positions; the first drives the role tag.
    pub position1: String,
    pub position2: String,
    pub position3: String,

    pub caps: i32,
    pub goals: i32,
    pub assists: i32,

    /// Unix timestamp when created (roster sort key, ascending).
    pub created: i64,
}

/// Input for creating a player.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayer {
    pub name: String,
    pub photo_url: String,
    pub club: String,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<i32>,
    pub position1: String,
    pub position2: String,
    pub position3: String,
    pub caps: i32,
    pub goals: i32,
    pub assists: i32,
}

/// Input for updating a player. The same shape as creation: the edit form
/// always posts every field.
pub type UpdatePlayer = CreatePlayer;

/// Keep a position only if it is on the allowlist; anything else is blank.
pub fn sanitize_position(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if POSITIONS.contains(&upper.as_str()) {
        upper
    } else {
        String::new()
    }
}

impl Player {
    /// Role grouping derived from the primary position.
    pub fn role_tag(&self) -> &'static str {
        match self.position1.as_str() {
            "GK" => "GOALKEEPER",
            "LWB" | "LB" | "CB" | "RB" | "RWB" => "DEFENDER",
            "LW" | "ST" | "RW" => "ATTACKER",
            _ => "MIDFIELDER",
        }
    }

    /// Registered positions, blanks dropped.
    pub fn positions_list(&self) -> Vec<&str> {
        [&self.position1, &self.position2, &self.position3]
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Age in whole years as of `today`, when the birth date is known.
    pub fn age(&self, today: NaiveDate) -> Option<i32> {
        use chrono::Datelike;

        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age)
    }

    /// Create a player.
    pub async fn create(pool: &PgPool, input: CreatePlayer) -> Result<Self> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO player (id, name, photo_url, birth_date, club, height_cm, position1, position2, position3, caps, goals, assists, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, name, photo_url, birth_date, club, height_cm, position1, position2, position3, caps, goals, assists, created
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.photo_url)
        .bind(input.birth_date)
        .bind(&input.club)
        .bind(input.height_cm)
        .bind(sanitize_position(&input.position1))
        .bind(sanitize_position(&input.position2))
        .bind(sanitize_position(&input.position3))
        .bind(input.caps.max(0))
        .bind(input.goals.max(0))
        .bind(input.assists.max(0))
        .bind(chrono::Utc::now().timestamp())
        .fetch_one(pool)
        .await
        .context("failed to create player")?;

        Ok(player)
    }

    /// Update a player from a full form submission.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdatePlayer) -> Result<Option<Self>> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            UPDATE player SET name = $1, photo_url = $2, birth_date = $3, club = $4, height_cm = $5,
                position1 = $6, position2 = $7, position3 = $8, caps = $9, goals = $10, assists = $11
            WHERE id = $12
            RETURNING id, name, photo_url, birth_date, club, height_cm, position1, position2, position3, caps, goals, assists, created
            "#,
        )
        .bind(&input.name)
        .bind(&input.photo_url)
        .bind(input.birth_date)
        .bind(&input.club)
        .bind(input.height_cm)
        .bind(sanitize_position(&input.position1))
        .bind(sanitize_position(&input.position2))
        .bind(sanitize_position(&input.position3))
        .bind(input.caps.max(0))
        .bind(input.goals.max(0))
        .bind(input.assists.max(0))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update player")?;

        Ok(player)
    }

    /// Find a player by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let player = sqlx::query_as::<_, Player>(
            "SELECT id, name, photo_url, birth_date, club, height_cm, position1, position2, position3, caps, goals, assists, created FROM player WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch player by id")?;

        Ok(player)
    }

    /// Roster listing, oldest first then by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, name, photo_url, birth_date, club, height_cm, position1, position2, position3, caps, goals, assists, created FROM player ORDER BY created, name",
        )
        .fetch_all(pool)
        .await
        .context("failed to list players")?;

        Ok(players)
    }

    /// Delete a player.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM player WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete player")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn player(p1: &str, p2: &str, p3: &str) -> Player {
        Player {
            id: Uuid::now_v7(),
            name: "Test".to_string(),
            photo_url: String::new(),
            birth_date: None,
            club: String::new(),
            height_cm: None,
            position1: p1.to_string(),
            position2: p2.to_string(),
            position3: p3.to_string(),
            caps: 0,
            goals: 0,
            assists: 0,
            created: 0,
        }
    }

    #[test]
    fn role_tag_follows_primary_position() {
        assert_eq!(player("GK", "", "").role_tag(), "GOALKEEPER");
        assert_eq!(player("CB", "", "").role_tag(), "DEFENDER");
        assert_eq!(player("CAM", "", "").role_tag(), "MIDFIELDER");
        assert_eq!(player("ST", "LW", "").role_tag(), "ATTACKER");
        assert_eq!(player("", "", "").role_tag(), "MIDFIELDER");
    }

    #[test]
    fn positions_outside_the_allowlist_are_blanked() {
        assert_eq!(sanitize_position("gk"), "GK");
        assert_eq!(sanitize_position(" st "), "ST");
        assert_eq!(sanitize_position("libero"), "");
        assert_eq!(sanitize_position(""), "");
    }

    #[test]
    fn positions_list_drops_blanks() {
        assert_eq!(player("ST", "", "RW").positions_list(), vec!["ST", "RW"]);
        assert!(player("", "", "").positions_list().is_empty());
    }

    #[test]
    fn age_counts_whole_years() {
        let mut p = player("ST", "", "");
        p.birth_date = NaiveDate::from_ymd_opt(2000, 6, 15);

        let before_birthday = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(p.age(before_birthday), Some(25));
        assert_eq!(p.age(on_birthday), Some(26));

        p.birth_date = None;
        assert_eq!(p.age(on_birthday), None);
    }
}
