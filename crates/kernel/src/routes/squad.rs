//! Squad roster route handlers.
//!
//! Mutations are moderator-only and return rendered card/form fragments so
//! the roster page can update in place.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::listing::params::parse_opt_nonneg;
use crate::models::{CreatePlayer, Player, player::POSITIONS};
use crate::state::AppState;

use super::helpers::{html_escape, require_moderator, strip_tags};

/// Role groups in roster display order.
const ROLE_ORDER: [&str; 4] = ["GOALKEEPER", "DEFENDER", "MIDFIELDER", "ATTACKER"];

/// Create the squad router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/squad", get(index))
        .route("/squad/players/new", get(player_form))
        .route("/squad/players", post(player_create))
        .route("/squad/player/{id}", get(player_detail))
        .route("/squad/player/{id}/edit", get(player_edit_form))
        .route("/squad/player/{id}/edit", post(player_edit))
        .route("/squad/player/{id}/delete", post(player_delete))
}

/// Form payload for creating or editing a player. Numeric fields arrive as
/// raw strings and go through parse-or-default.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerForm {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub birth_date: Option<String>,
    pub club: Option<String>,
    pub height_cm: Option<String>,
    pub position1: Option<String>,
    pub position2: Option<String>,
    pub position3: Option<String>,
    pub caps: Option<String>,
    pub goals: Option<String>,
    pub assists: Option<String>,
}

/// Parse a `YYYY-MM-DD` birth date; anything else is treated as absent.
fn parse_birth_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}

/// Build player input from a form; `Err` when the name is missing.
fn clean_player_form(form: &PlayerForm) -> Result<CreatePlayer, &'static str> {
    let name = strip_tags(form.name.as_deref().unwrap_or(""));
    if name.is_empty() {
        return Err("Nama pemain wajib diisi.");
    }

    Ok(CreatePlayer {
        name,
        photo_url: strip_tags(form.photo_url.as_deref().unwrap_or("")),
        club: strip_tags(form.club.as_deref().unwrap_or("")),
        birth_date: parse_birth_date(form.birth_date.as_deref()),
        height_cm: parse_opt_nonneg(form.height_cm.as_deref()),
        position1: form.position1.clone().unwrap_or_default(),
        position2: form.position2.clone().unwrap_or_default(),
        position3: form.position3.clone().unwrap_or_default(),
        caps: parse_opt_nonneg(form.caps.as_deref()).unwrap_or(0),
        goals: parse_opt_nonneg(form.goals.as_deref()).unwrap_or(0),
        assists: parse_opt_nonneg(form.assists.as_deref()).unwrap_or(0),
    })
}

/// Render a player card fragment.
fn render_player_card(state: &AppState, player: &Player) -> Result<String, AppError> {
    let mut context = tera::Context::new();
    context.insert("player", player);
    context.insert("role_tag", player.role_tag());
    context.insert("positions", &player.positions_list().join(", "));
    Ok(state.theme().render("elements/player_card.html", &context)?)
}

/// Render the add/edit form fragment.
fn render_player_form(
    state: &AppState,
    player: Option<&Player>,
    submit_url: &str,
    title: &str,
) -> Result<String, AppError> {
    let mut context = tera::Context::new();
    let selected = match player {
        Some(p) => {
            context.insert("player", p);
            [p.position1.clone(), p.position2.clone(), p.position3.clone()]
        }
        None => [String::new(), String::new(), String::new()],
    };
    context.insert("selected", &selected);
    context.insert("positions", &POSITIONS);
    context.insert("submit_url", submit_url);
    context.insert("form_title", title);
    Ok(state.theme().render("elements/player_form.html", &context)?)
}

/// Roster page grouped by role tag.
async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let players = Player::list_all(state.db()).await?;

    let mut content = String::from("<h1>Squad</h1>");
    for role in ROLE_ORDER {
        let group: Vec<&Player> = players.iter().filter(|p| p.role_tag() == role).collect();
        if group.is_empty() {
            continue;
        }
        content.push_str(&format!(r#"<section class="role-group"><h2>{role}</h2>"#));
        for player in group {
            content.push_str(&render_player_card(&state, player)?);
        }
        content.push_str("</section>");
    }

    let html = state.theme().render_page("Squad", &content)?;
    Ok(Html(html))
}

/// Player detail page.
async fn player_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let player = Player::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;

    let age = player
        .age(chrono::Utc::now().date_naive())
        .map(|a| format!("{a} years"))
        .unwrap_or_else(|| "-".to_string());
    let height = player
        .height_cm
        .map(|h| format!("{h} cm"))
        .unwrap_or_else(|| "-".to_string());

    let photo = if player.photo_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{}" width="240">"#,
            html_escape(&player.photo_url),
            html_escape(&player.name)
        )
    };

    let content = format!(
        r#"<article class="player-detail">
            {photo}
            <h1>{}</h1>
            <span class="chip">{}</span>
            <p class="muted">{}</p>
            <dl>
                <dt>Club</dt><dd>{}</dd>
                <dt>Age</dt><dd>{age}</dd>
                <dt>Height</dt><dd>{height}</dd>
                <dt>Caps</dt><dd>{}</dd>
                <dt>Goals</dt><dd>{}</dd>
                <dt>Assists</dt><dd>{}</dd>
            </dl>
        </article>"#,
        html_escape(&player.name),
        player.role_tag(),
        player.positions_list().join(", "),
        html_escape(&player.club),
        player.caps,
        player.goals,
        player.assists,
    );

    let html = state.theme().render_page(&player.name, &content)?;
    Ok(Html(html))
}

/// Blank add-player form fragment (moderators only).
async fn player_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let html = render_player_form(&state, None, "/squad/players", "Tambah Pemain")
        .map_err(IntoResponse::into_response)?;

    Ok(Json(serde_json::json!({"html": html})).into_response())
}

/// Create a player (moderators only); returns the rendered card.
async fn player_create(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<PlayerForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let input = match clean_player_form(&form) {
        Ok(input) => input,
        Err(msg) => return Ok((StatusCode::BAD_REQUEST, msg).into_response()),
    };

    let player = Player::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let html = render_player_card(&state, &player).map_err(IntoResponse::into_response)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": player.id,
            "role_tag": player.role_tag(),
            "html": html,
        })),
    )
        .into_response())
}

/// Prefilled edit form fragment (moderators only).
async fn player_edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let player = Player::find_by_id(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let submit_url = format!("/squad/player/{}/edit", player.id);
    let title = format!("Edit {}", player.name);
    let html = render_player_form(&state, Some(&player), &submit_url, &title)
        .map_err(IntoResponse::into_response)?;

    Ok(Json(serde_json::json!({"html": html})).into_response())
}

/// Apply an edit (moderators only). `moved` flags a role-tag change so the
/// page can re-home the card.
async fn player_edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<PlayerForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let current = Player::find_by_id(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;
    let old_role = current.role_tag();

    let input = match clean_player_form(&form) {
        Ok(input) => input,
        Err(msg) => return Ok((StatusCode::BAD_REQUEST, msg).into_response()),
    };

    let player = Player::update(state.db(), id, input)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let html = render_player_card(&state, &player).map_err(IntoResponse::into_response)?;

    Ok(Json(serde_json::json!({
        "id": player.id,
        "role_tag": player.role_tag(),
        "html": html,
        "moved": player.role_tag() != old_role,
    }))
    .into_response())
}

/// Delete a player (moderators only).
async fn player_delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = Player::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Json(serde_json::json!({"ok": true, "id": id})).into_response())
    } else {
        Err(AppError::NotFound.into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_parses_iso_or_nothing() {
        assert_eq!(
            parse_birth_date(Some("2000-06-15")),
            NaiveDate::from_ymd_opt(2000, 6, 15)
        );
        assert_eq!(parse_birth_date(Some("15/06/2000")), None);
        assert_eq!(parse_birth_date(Some("")), None);
        assert_eq!(parse_birth_date(None), None);
    }

    #[test]
    fn player_form_requires_a_name() {
        let form = PlayerForm::default();
        assert!(clean_player_form(&form).is_err());

        let form = PlayerForm {
            name: Some("<b>Asnawi</b>".to_string()),
            caps: Some("-4".to_string()),
            height_cm: Some("183".to_string()),
            ..PlayerForm::default()
        };
        let input = clean_player_form(&form).unwrap();
        assert_eq!(input.name, "Asnawi");
        assert_eq!(input.caps, 0);
        assert_eq!(input.height_cm, Some(183));
    }
}
