//! National team match schedule model.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

/// Competition categories a match may belong to.
pub const MATCH_CATEGORIES: [&str; 8] = [
    "FIFA Matchday A",
    "FIFA Matchday B",
    "AFF Championship",
    "AFC Qualifiers",
    "AFC Cup",
    "World Cup Qualifiers",
    "World Cup",
    "Other",
];

/// Per-side match statistics. All optional: friendlies and future fixtures
/// have none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub shots_home: Option<i32>,
    pub shots_away: Option<i32>,
    pub shots_on_target_home: Option<i32>,
    pub shots_on_target_away: Option<i32>,
    pub possession_home: Option<i32>,
    pub possession_away: Option<i32>,
    pub passes_home: Option<i32>,
    pub passes_away: Option<i32>,
    pub pass_accuracy_home: Option<i32>,
    pub pass_accuracy_away: Option<i32>,
    pub fouls_home: Option<i32>,
    pub fouls_away: Option<i32>,
    pub yellow_cards_home: Option<i32>,
    pub yellow_cards_away: Option<i32>,
    pub red_cards_home: Option<i32>,
    pub red_cards_away: Option<i32>,
    pub offsides_home: Option<i32>,
    pub offsides_away: Option<i32>,
    pub corners_home: Option<i32>,
    pub corners_away: Option<i32>,
}

/// Match record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub home_code: Option<String>,
    pub away_code: Option<String>,
    pub match_date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub home_score: Option<i16>,
    pub away_score: Option<i16>,
    pub lineup: Option<String>,
    pub review: Option<String>,
    pub stats: Json<MatchStats>,
    pub created: i64,
    pub changed: i64,
}

/// Input for creating a match.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMatch {
    pub home_team: String,
    pub away_team: String,
    pub home_code: Option<String>,
    pub away_code: Option<String>,
    pub match_date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub home_score: Option<i16>,
    pub away_score: Option<i16>,
    pub lineup: Option<String>,
    pub review: Option<String>,
    pub stats: MatchStats,
}

/// Input for updating a match; the edit form posts every field.
pub type UpdateMatch = CreateMatch;

impl Match {
    /// Whether the fixture is still upcoming.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.match_date > now
    }

    /// Badge image for the match's competition.
    pub fn category_image_url(&self) -> &'static str {
        match self.category.as_str() {
            "AFF Championship" => {
                "https://upload.wikimedia.org/wikipedia/en/thumb/0/08/ASEAN_Mitsubishi_Electric_Cup_2024_logo.svg/1200px-ASEAN_Mitsubishi_Electric_Cup_2024_logo.svg.png"
            }
            "AFC Qualifiers" | "AFC Cup" => {
                "https://upload.wikimedia.org/wikipedia/id/4/4d/AFC_Asian_Cup.png"
            }
            "World Cup Qualifiers" | "World Cup" => {
                "https://brandlogos.net/wp-content/uploads/2023/08/2026-FIFA-World-Cup-logo.png"
            }
            _ => "",
        }
    }

    /// Home/away stat pairs for the detail table, in display order.
    pub fn stat_pairs(&self) -> Vec<(&'static str, Option<i32>, Option<i32>)> {
        let s = &self.stats.0;
        vec![
            ("Shots", s.shots_home, s.shots_away),
            ("Shots on Target", s.shots_on_target_home, s.shots_on_target_away),
            ("Possession (%)", s.possession_home, s.possession_away),
            ("Passes", s.passes_home, s.passes_away),
            ("Pass Accuracy (%)", s.pass_accuracy_home, s.pass_accuracy_away),
            ("Fouls", s.fouls_home, s.fouls_away),
            ("Yellow Cards", s.yellow_cards_home, s.yellow_cards_away),
            ("Red Cards", s.red_cards_home, s.red_cards_away),
            ("Offsides", s.offsides_home, s.offsides_away),
            ("Corners", s.corners_home, s.corners_away),
        ]
    }

    /// Create a match.
    pub async fn create(pool: &PgPool, input: CreateMatch) -> Result<Self> {
        let now = Utc::now().timestamp();

        let m = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO schedule (id, home_team, away_team, home_code, away_code, match_date, location, category, home_score, away_score, lineup, review, stats, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, home_team, away_team, home_code, away_code, match_date, location, category, home_score, away_score, lineup, review, stats, created, changed
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.home_team)
        .bind(&input.away_team)
        .bind(&input.home_code)
        .bind(&input.away_code)
        .bind(input.match_date)
        .bind(&input.location)
        .bind(&input.category)
        .bind(input.home_score)
        .bind(input.away_score)
        .bind(&input.lineup)
        .bind(&input.review)
        .bind(Json(&input.stats))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create match")?;

        Ok(m)
    }

    /// Update a match from a full form submission.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateMatch) -> Result<Option<Self>> {
        let m = sqlx::query_as::<_, Match>(
            r#"
            UPDATE schedule SET home_team = $1, away_team = $2, home_code = $3, away_code = $4, match_date = $5,
                location = $6, category = $7, home_score = $8, away_score = $9, lineup = $10, review = $11,
                stats = $12, changed = $13
            WHERE id = $14
            RETURNING id, home_team, away_team, home_code, away_code, match_date, location, category, home_score, away_score, lineup, review, stats, created, changed
            "#,
        )
        .bind(&input.home_team)
        .bind(&input.away_team)
        .bind(&input.home_code)
        .bind(&input.away_code)
        .bind(input.match_date)
        .bind(&input.location)
        .bind(&input.category)
        .bind(input.home_score)
        .bind(input.away_score)
        .bind(&input.lineup)
        .bind(&input.review)
        .bind(Json(&input.stats))
        .bind(Utc::now().timestamp())
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update match")?;

        Ok(m)
    }

    /// Find a match by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let m = sqlx::query_as::<_, Match>(
            "SELECT id, home_team, away_team, home_code, away_code, match_date, location, category, home_score, away_score, lineup, review, stats, created, changed FROM schedule WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch match by id")?;

        Ok(m)
    }

    /// List all matches, most recent fixture first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let matches = sqlx::query_as::<_, Match>(
            "SELECT id, home_team, away_team, home_code, away_code, match_date, location, category, home_score, away_score, lineup, review, stats, created, changed FROM schedule ORDER BY match_date DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list matches")?;

        Ok(matches)
    }

    /// Delete a match.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM schedule WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete match")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fixture(category: &str) -> Match {
        Match {
            id: Uuid::now_v7(),
            home_team: "Indonesia".to_string(),
            away_team: "Vietnam".to_string(),
            home_code: Some("IDN".to_string()),
            away_code: Some("VIE".to_string()),
            match_date: Utc::now(),
            location: "Gelora Bung Karno".to_string(),
            category: category.to_string(),
            home_score: None,
            away_score: None,
            lineup: None,
            review: None,
            stats: Json(MatchStats::default()),
            created: 0,
            changed: 0,
        }
    }

    #[test]
    fn category_badges() {
        assert!(fixture("World Cup").category_image_url().contains("World-Cup"));
        assert!(fixture("AFC Cup").category_image_url().contains("AFC"));
        assert_eq!(fixture("FIFA Matchday A").category_image_url(), "");
        assert_eq!(fixture("Other").category_image_url(), "");
    }

    #[test]
    fn stat_pairs_follow_display_order() {
        let mut m = fixture("Other");
        m.stats = Json(MatchStats {
            shots_home: Some(12),
            shots_away: Some(7),
            ..MatchStats::default()
        });

        let pairs = m.stat_pairs();
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[0], ("Shots", Some(12), Some(7)));
        assert_eq!(pairs[9].0, "Corners");
    }

    #[test]
    fn upcoming_is_relative_to_now() {
        let mut m = fixture("Other");
        m.match_date = Utc::now() + chrono::Duration::days(7);
        assert!(m.is_upcoming(Utc::now()));
        m.match_date = Utc::now() - chrono::Duration::days(7);
        assert!(!m.is_upcoming(Utc::now()));
    }
}
