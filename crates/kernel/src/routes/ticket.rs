//! Event ticket route handlers: match feeds with nested vendor links.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::listing::parse_nonneg_or;
use crate::models::{CreateTicketLink, CreateTicketMatch, TicketLink, TicketMatch};
use crate::state::AppState;

use super::helpers::{html_escape, require_moderator, strip_tags, xml_document, xml_object};

/// Create the ticket router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(main_view))
        .route("/tickets", post(create_ticket_match))
        .route("/tickets/json", get(show_json))
        .route("/tickets/xml", get(show_xml))
        .route("/tickets/json/{id}", get(show_json_by_id))
        .route("/tickets/xml/{id}", get(show_xml_by_id))
        .route("/tickets/{id}/delete", post(delete_ticket_match))
        .route("/tickets/{id}/links", post(create_link))
        .route("/tickets/links/{id}/delete", post(delete_link))
}

/// Form payload for creating a ticketed match.
#[derive(Debug, Deserialize)]
pub struct TicketMatchForm {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub img_team1: Option<String>,
    pub img_team2: Option<String>,
    pub img_cup: Option<String>,
    pub place: Option<String>,
    pub date: Option<String>,
}

/// Form payload for creating a vendor link.
#[derive(Debug, Deserialize)]
pub struct TicketLinkForm {
    pub vendor: Option<String>,
    pub vendor_link: Option<String>,
    pub price: Option<String>,
    pub img_vendor: Option<String>,
}

/// One vendor link in the JSON feed.
#[derive(Debug, Serialize)]
pub struct LinkPayload {
    pub uuid: Uuid,
    pub vendor: String,
    pub vendor_link: String,
    pub price: i64,
    pub img_vendor: String,
}

/// One match with its nested links.
#[derive(Debug, Serialize)]
pub struct TicketMatchPayload {
    pub uuid: Uuid,
    pub team1: String,
    pub team2: String,
    pub img_team1: String,
    pub img_team2: String,
    pub img_cup: Option<String>,
    pub place: Option<String>,
    pub date: NaiveDate,
    pub links: Vec<LinkPayload>,
}

/// Assemble a match payload with its links.
async fn match_payload(pool: &PgPool, m: TicketMatch) -> Result<TicketMatchPayload, AppError> {
    let links = TicketLink::list_for_match(pool, m.id).await?;
    Ok(TicketMatchPayload {
        uuid: m.id,
        team1: m.team1,
        team2: m.team2,
        img_team1: m.img_team1,
        img_team2: m.img_team2,
        img_cup: m.img_cup,
        place: m.place,
        date: m.date,
        links: links
            .into_iter()
            .map(|l| LinkPayload {
                uuid: l.id,
                vendor: l.vendor,
                vendor_link: l.vendor_link,
                price: l.price,
                img_vendor: l.img_vendor,
            })
            .collect(),
    })
}

fn ticket_xml(m: &TicketMatch, links: &[TicketLink]) -> String {
    let mut out = xml_object(
        "ticket_match",
        &m.id.to_string(),
        &[
            ("team1", m.team1.clone()),
            ("team2", m.team2.clone()),
            ("place", m.place.clone().unwrap_or_default()),
            ("date", m.date.to_string()),
        ],
    );
    for link in links {
        out.push_str(&xml_object(
            "ticket_link",
            &link.id.to_string(),
            &[
                ("vendor", link.vendor.clone()),
                ("vendor_link", link.vendor_link.clone()),
                ("price", link.price.to_string()),
            ],
        ));
    }
    out
}

/// Tickets page: one card per match with its vendor links.
async fn main_view(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let matches = TicketMatch::list_all(state.db()).await?;

    let mut cards = String::new();
    for m in matches {
        let links = TicketLink::list_for_match(state.db(), m.id).await?;
        let mut link_rows = String::new();
        for link in &links {
            link_rows.push_str(&format!(
                r#"<li><a href="{}" rel="noopener">{}</a> — Rp{}</li>"#,
                html_escape(&link.vendor_link),
                html_escape(&link.vendor),
                link.price
            ));
        }
        if link_rows.is_empty() {
            link_rows = r#"<li class="muted">No vendors yet</li>"#.to_string();
        }

        cards.push_str(&format!(
            r#"<article class="card ticket-card" data-id="{}">
                <h3>{} vs {}</h3>
                <p class="muted">{} · {}</p>
                <ul class="vendors">{}</ul>
            </article>"#,
            m.id,
            html_escape(&m.team1),
            html_escape(&m.team2),
            html_escape(m.place.as_deref().unwrap_or("TBA")),
            m.date,
            link_rows,
        ));
    }

    let content = format!(r#"<h1>Tickets</h1><div id="ticket-list">{cards}</div>"#);
    let html = state.theme().render_page("Tickets", &content)?;

    Ok(Html(html))
}

/// JSON feed: every match with nested links.
async fn show_json(
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketMatchPayload>>, AppError> {
    let matches = TicketMatch::list_all(state.db()).await?;

    let mut payloads = Vec::with_capacity(matches.len());
    for m in matches {
        payloads.push(match_payload(state.db(), m).await?);
    }

    Ok(Json(payloads))
}

/// Single-match JSON lookup.
async fn show_json_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    match TicketMatch::find_by_id(state.db(), id).await? {
        Some(m) => Ok(Json(match_payload(state.db(), m).await?).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}

/// XML feed: each match followed by its links.
async fn show_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let matches = TicketMatch::list_all(state.db()).await?;

    let mut objects = String::new();
    for m in &matches {
        let links = TicketLink::list_for_match(state.db(), m.id).await?;
        objects.push_str(&ticket_xml(m, &links));
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
    let m = TicketMatch::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    let links = TicketLink::list_for_match(state.db(), m.id).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml_document(&ticket_xml(&m, &links)),
    )
        .into_response())
}

/// Create a ticketed match (moderators only).
async fn create_ticket_match(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<TicketMatchForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let team1 = strip_tags(form.team1.as_deref().unwrap_or(""));
    let team2 = strip_tags(form.team2.as_deref().unwrap_or(""));
    let date = form
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    if team1.is_empty() || team2.is_empty() {
        return Err(AppError::BadRequest("team1 and team2 are required".to_string()).into_response());
    }
    let Some(date) = date else {
        return Err(AppError::BadRequest("date must be YYYY-MM-DD".to_string()).into_response());
    };

    let created = TicketMatch::create(
        state.db(),
        CreateTicketMatch {
            team1,
            team2,
            img_team1: form.img_team1.unwrap_or_default(),
            img_team2: form.img_team2.unwrap_or_default(),
            img_cup: form.img_cup.filter(|s| !s.trim().is_empty()),
            place: form.place.map(|p| strip_tags(&p)).filter(|s| !s.is_empty()),
            date,
        },
    )
    .await
    .map_err(|e| AppError::from(e).into_response())?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"uuid": created.id})),
    )
        .into_response())
}

/// Delete a ticketed match and its links (moderators only).
async fn delete_ticket_match(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = TicketMatch::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Json(serde_json::json!({"deleted": id})).into_response())
    } else {
        Err(AppError::NotFound.into_response())
    }
}

/// Add a vendor link to a match (moderators only).
async fn create_link(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<TicketLinkForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let m = TicketMatch::find_by_id(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let vendor = strip_tags(form.vendor.as_deref().unwrap_or(""));
    let vendor_link = form.vendor_link.unwrap_or_default();
    if vendor.is_empty() || vendor_link.trim().is_empty() {
        return Err(
            AppError::BadRequest("vendor and vendor_link are required".to_string()).into_response(),
        );
    }

    let created = TicketLink::create(
        state.db(),
        m.id,
        CreateTicketLink {
            vendor,
            vendor_link,
            price: parse_nonneg_or(form.price.as_deref(), 0),
            img_vendor: form.img_vendor.unwrap_or_default(),
        },
    )
    .await
    .map_err(|e| AppError::from(e).into_response())?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"uuid": created.id})),
    )
        .into_response())
}

/// Remove a vendor link (moderators only).
async fn delete_link(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = TicketLink::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Json(serde_json::json!({"deleted": id})).into_response())
    } else {
        Err(AppError::NotFound.into_response())
    }
}
