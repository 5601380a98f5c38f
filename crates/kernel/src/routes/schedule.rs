//! Match schedule route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::listing::params::parse_opt_nonneg;
use crate::models::{CreateMatch, Match, MatchStats, schedule::MATCH_CATEGORIES};
use crate::state::AppState;

use super::helpers::{html_escape, require_login, require_moderator, strip_tags, xml_document, xml_object};

/// Create the schedule router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(show_main))
        .route("/schedule/json", get(show_json))
        .route("/schedule/xml", get(show_xml))
        .route("/schedule/json/{id}", get(show_json_by_id))
        .route("/schedule/xml/{id}", get(show_xml_by_id))
        .route("/schedule/match/{id}", get(show_match))
        .route("/schedule/add-ajax", post(create_match_ajax))
        .route("/schedule/{id}/edit-ajax", post(update_match_ajax))
        .route("/schedule/{id}/delete-ajax", post(delete_match_ajax))
}

/// Form payload for creating or editing a match. Everything arrives as raw
/// strings; numeric fields go through parse-or-default.
#[derive(Debug, Default, Deserialize)]
pub struct MatchForm {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_code: Option<String>,
    pub away_code: Option<String>,
    pub match_date: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub home_score: Option<String>,
    pub away_score: Option<String>,
    pub lineup: Option<String>,
    pub review: Option<String>,
    pub shots_home: Option<String>,
    pub shots_away: Option<String>,
    pub shots_on_target_home: Option<String>,
    pub shots_on_target_away: Option<String>,
    pub possession_home: Option<String>,
    pub possession_away: Option<String>,
    pub passes_home: Option<String>,
    pub passes_away: Option<String>,
    pub pass_accuracy_home: Option<String>,
    pub pass_accuracy_away: Option<String>,
    pub fouls_home: Option<String>,
    pub fouls_away: Option<String>,
    pub yellow_cards_home: Option<String>,
    pub yellow_cards_away: Option<String>,
    pub red_cards_home: Option<String>,
    pub red_cards_away: Option<String>,
    pub offsides_home: Option<String>,
    pub offsides_away: Option<String>,
    pub corners_home: Option<String>,
    pub corners_away: Option<String>,
}

/// Full match payload for the JSON feed and edit modal.
#[derive(Debug, Serialize)]
pub struct MatchPayload {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub home_code: Option<String>,
    pub away_code: Option<String>,
    pub match_date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub category_image_url: String,
    pub home_score: Option<i16>,
    pub away_score: Option<i16>,
    pub lineup: Option<String>,
    pub review: Option<String>,
    #[serde(flatten)]
    pub stats: MatchStats,
}

impl MatchPayload {
    fn from_match(m: Match) -> Self {
        let category_image_url = m.category_image_url().to_string();
        Self {
            id: m.id,
            home_team: m.home_team,
            away_team: m.away_team,
            home_code: m.home_code,
            away_code: m.away_code,
            match_date: m.match_date,
            location: m.location,
            category: m.category,
            category_image_url,
            home_score: m.home_score,
            away_score: m.away_score,
            lineup: m.lineup,
            review: m.review,
            stats: m.stats.0,
        }
    }
}

/// Parse the form's datetime string. Accepts `datetime-local` input and a
/// couple of plain fallbacks.
fn parse_match_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(parsed.and_utc())
}

fn stats_from_form(form: &MatchForm) -> MatchStats {
    MatchStats {
        shots_home: parse_opt_nonneg(form.shots_home.as_deref()),
        shots_away: parse_opt_nonneg(form.shots_away.as_deref()),
        shots_on_target_home: parse_opt_nonneg(form.shots_on_target_home.as_deref()),
        shots_on_target_away: parse_opt_nonneg(form.shots_on_target_away.as_deref()),
        possession_home: parse_opt_nonneg(form.possession_home.as_deref()),
        possession_away: parse_opt_nonneg(form.possession_away.as_deref()),
        passes_home: parse_opt_nonneg(form.passes_home.as_deref()),
        passes_away: parse_opt_nonneg(form.passes_away.as_deref()),
        pass_accuracy_home: parse_opt_nonneg(form.pass_accuracy_home.as_deref()),
        pass_accuracy_away: parse_opt_nonneg(form.pass_accuracy_away.as_deref()),
        fouls_home: parse_opt_nonneg(form.fouls_home.as_deref()),
        fouls_away: parse_opt_nonneg(form.fouls_away.as_deref()),
        yellow_cards_home: parse_opt_nonneg(form.yellow_cards_home.as_deref()),
        yellow_cards_away: parse_opt_nonneg(form.yellow_cards_away.as_deref()),
        red_cards_home: parse_opt_nonneg(form.red_cards_home.as_deref()),
        red_cards_away: parse_opt_nonneg(form.red_cards_away.as_deref()),
        offsides_home: parse_opt_nonneg(form.offsides_home.as_deref()),
        offsides_away: parse_opt_nonneg(form.offsides_away.as_deref()),
        corners_home: parse_opt_nonneg(form.corners_home.as_deref()),
        corners_away: parse_opt_nonneg(form.corners_away.as_deref()),
    }
}

/// Build match input from a form; `Err` names the problem.
fn clean_match_form(form: &MatchForm) -> Result<CreateMatch, &'static str> {
    let home_team = strip_tags(form.home_team.as_deref().unwrap_or(""));
    let away_team = strip_tags(form.away_team.as_deref().unwrap_or(""));
    let location = strip_tags(form.location.as_deref().unwrap_or(""));
    let category = strip_tags(form.category.as_deref().unwrap_or(""));
    let date_raw = strip_tags(form.match_date.as_deref().unwrap_or(""));

    if home_team.is_empty()
        || away_team.is_empty()
        || date_raw.is_empty()
        || location.is_empty()
        || category.is_empty()
    {
        return Err("Missing required fields");
    }

    let Some(match_date) = parse_match_date(&date_raw) else {
        return Err("Unparseable match_date");
    };

    let optional = |v: &Option<String>| {
        v.as_deref()
            .map(strip_tags)
            .filter(|s| !s.is_empty())
    };

    Ok(CreateMatch {
        home_team,
        away_team,
        home_code: optional(&form.home_code),
        away_code: optional(&form.away_code),
        match_date,
        location,
        category,
        home_score: parse_opt_nonneg(form.home_score.as_deref()).map(|v| v as i16),
        away_score: parse_opt_nonneg(form.away_score.as_deref()).map(|v| v as i16),
        lineup: form.lineup.clone().filter(|s| !s.trim().is_empty()),
        review: form.review.clone().filter(|s| !s.trim().is_empty()),
        stats: stats_from_form(form),
    })
}

fn match_xml_fields(m: &Match) -> Vec<(&'static str, String)> {
    vec![
        ("home_team", m.home_team.clone()),
        ("away_team", m.away_team.clone()),
        ("match_date", m.match_date.to_rfc3339()),
        ("location", m.location.clone()),
        ("category", m.category.clone()),
        ("home_score", m.home_score.map(|s| s.to_string()).unwrap_or_default()),
        ("away_score", m.away_score.map(|s| s.to_string()).unwrap_or_default()),
    ]
}

/// Schedule page: competition chips and one card per fixture.
async fn show_main(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let matches = Match::list_all(state.db()).await?;

    let mut chips = String::from(r#"<div class="category-chips">"#);
    for category in MATCH_CATEGORIES {
        chips.push_str(&format!(r#"<span class="chip">{category}</span>"#));
    }
    chips.push_str("</div>");

    let mut fragments = String::new();
    for m in &matches {
        let mut context = tera::Context::new();
        context.insert("match", m);
        context.insert("has_score", &(m.home_score.is_some() && m.away_score.is_some()));
        fragments.push_str(&state.theme().render("elements/match_card.html", &context)?);
    }

    let content =
        format!(r#"<h1>Schedule</h1>{chips}<div id="match-list">{fragments}</div>"#);
    let html = state.theme().render_page("Schedule", &content)?;

    Ok(Html(html))
}

/// Match detail with the home/away stat table.
async fn show_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let m = Match::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let score = match (m.home_score, m.away_score) {
        (Some(h), Some(a)) => format!("{h} – {a}"),
        _ => "vs".to_string(),
    };

    let mut stats_rows = String::new();
    for (label, home, away) in m.stat_pairs() {
        stats_rows.push_str(&format!(
            "<tr><td>{}</td><th>{}</th><td>{}</td></tr>",
            home.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            label,
            away.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
    }

    let review = m
        .review
        .as_deref()
        .map(|r| format!("<section><h2>Review</h2><p>{}</p></section>", html_escape(r)))
        .unwrap_or_default();

    let content = format!(
        r#"<article class="match-detail">
            <h1>{} {} {}</h1>
            <p class="muted">{} · {}</p>
            <table class="match-stats"><tbody>{}</tbody></table>
            {}
        </article>"#,
        html_escape(&m.home_team),
        score,
        html_escape(&m.away_team),
        html_escape(&m.category),
        html_escape(&m.location),
        stats_rows,
        review,
    );

    let title = format!("{} vs {}", m.home_team, m.away_team);
    let html = state.theme().render_page(&title, &content)?;

    Ok(Html(html))
}

/// JSON feed of all matches, most recent fixture first.
async fn show_json(State(state): State<AppState>) -> Result<Json<Vec<MatchPayload>>, AppError> {
    let matches = Match::list_all(state.db()).await?;
    Ok(Json(matches.into_iter().map(MatchPayload::from_match).collect()))
}

/// Single-match JSON lookup.
async fn show_json_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    match Match::find_by_id(state.db(), id).await? {
        Some(m) => Ok(Json(MatchPayload::from_match(m)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}

/// XML feed of all matches.
async fn show_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let matches = Match::list_all(state.db()).await?;

    let mut objects = String::new();
    for m in &matches {
        objects.push_str(&xml_object("schedule", &m.id.to_string(), &match_xml_fields(m)));
    }

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml_document(&objects),
    )
        .into_response())
}

/// Single-match XML lookup.
async fn show_xml_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let objects = match Match::find_by_id(state.db(), id).await? {
        Some(m) => xml_object("schedule", &m.id.to_string(), &match_xml_fields(&m)),
        None => String::new(),
    };

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml_document(&objects),
    )
        .into_response())
}

/// AJAX create: 201 `CREATED` on success, 400 with the reason otherwise.
async fn create_match_ajax(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<MatchForm>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let input = match clean_match_form(&form) {
        Ok(input) => input,
        Err(msg) => {
            return Ok((StatusCode::BAD_REQUEST, format!("INVALID: {msg}")).into_response());
        }
    };

    Match::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    Ok((StatusCode::CREATED, "CREATED").into_response())
}

/// AJAX update (moderators only): returns the updated payload so the edit
/// modal can refresh in place.
async fn update_match_ajax(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<MatchForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let input = match clean_match_form(&form) {
        Ok(input) => input,
        Err(msg) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "detail": "Validation failed",
                    "errors": {"match": [msg]},
                })),
            )
                .into_response());
        }
    };

    let updated = Match::update(state.db(), id, input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    match updated {
        Some(m) => Ok(Json(MatchPayload::from_match(m)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}

/// AJAX delete (moderators only).
async fn delete_match_ajax(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = Match::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Json(serde_json::json!({"deleted": id})).into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn match_date_accepts_datetime_local_and_plain_dates() {
        assert!(parse_match_date("2025-10-09T19:30").is_some());
        assert!(parse_match_date("2025-10-09 19:30").is_some());
        assert!(parse_match_date("2025-10-09").is_some());
        assert!(parse_match_date("next tuesday").is_none());
        assert!(parse_match_date("").is_none());
    }

    #[test]
    fn clean_form_requires_core_fields() {
        let mut form = MatchForm {
            home_team: Some("Indonesia".to_string()),
            away_team: Some("Vietnam".to_string()),
            match_date: Some("2025-10-09T19:30".to_string()),
            location: Some("GBK".to_string()),
            category: Some("AFC Qualifiers".to_string()),
            ..MatchForm::default()
        };
        assert!(clean_match_form(&form).is_ok());

        form.location = None;
        assert_eq!(clean_match_form(&form).unwrap_err(), "Missing required fields");
    }

    #[test]
    fn stats_parse_leniently() {
        let form = MatchForm {
            shots_home: Some("12".to_string()),
            shots_away: Some("-3".to_string()),
            possession_home: Some("lots".to_string()),
            ..MatchForm::default()
        };
        let stats = stats_from_form(&form);
        assert_eq!(stats.shots_home, Some(12));
        assert_eq!(stats.shots_away, None);
        assert_eq!(stats.possession_home, None);
    }
}
