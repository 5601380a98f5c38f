//! Merchandise catalog route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::listing::{page_from, parse_nonneg_or};
use crate::models::{CreateMerch, Merch, UpdateMerch, merch::MERCH_CATEGORIES};
use crate::state::AppState;

use super::helpers::{html_escape, require_login, strip_tags};

/// Create the merch router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/merch", get(show_merch))
        .route("/merch", post(create_merch))
        .route("/merch/json", get(show_json))
        .route("/merch/json/{id}", get(show_json_by_id))
        .route("/merch/{id}", get(merch_detail))
        .route("/merch/{id}/edit", post(update_merch))
        .route("/merch/{id}/delete", post(delete_merch))
}

/// Catalog filter parameters. `filter` carries the category, matching the
/// original storefront; numeric fields stay raw strings for silent fallback.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub filter: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Form payload for creating or editing a merch item. Prices and stock
/// arrive as raw strings and go through parse-or-default.
#[derive(Debug, Deserialize)]
pub struct MerchForm {
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
}

/// JSON payload for one merch item.
#[derive(Debug, Serialize)]
pub struct MerchPayload {
    pub id: Uuid,
    pub name: String,
    pub vendor: String,
    pub price: i64,
    pub stock: i64,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub link: String,
}

impl MerchPayload {
    fn from_merch(m: Merch) -> Self {
        Self {
            id: m.id,
            name: m.name,
            vendor: m.vendor,
            price: m.price,
            stock: m.stock,
            description: m.description,
            thumbnail: m.thumbnail,
            category: m.category,
            link: m.link,
        }
    }
}

/// Catalog page: category filter plus free-text search, paged.
///
/// An out-of-range page clamps to an empty result.
async fn show_merch(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CatalogQuery>,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let page = page_from(params.page.as_deref());
    let listing = Merch::list_filtered(
        state.db(),
        params.filter.as_deref(),
        params.q.as_deref(),
        page,
    )
    .await
    .map_err(|e| AppError::from(e).into_response())?;

    let active = params.filter.as_deref().unwrap_or("all");

    let mut chips = String::from(r#"<div class="category-chips"><a href="/merch" class="chip">All</a>"#);
    for category in MERCH_CATEGORIES {
        chips.push_str(&format!(
            r#"<a href="/merch?filter={category}" class="chip{}">{category}</a>"#,
            if category == active { " active" } else { "" },
        ));
    }
    chips.push_str("</div>");

    let mut fragments = String::new();
    for item in &listing.items {
        let mut context = tera::Context::new();
        context.insert("merch", item);
        fragments.push_str(
            &state
                .theme()
                .render("elements/merch_card.html", &context)
                .map_err(|e| AppError::from(e).into_response())?,
        );
    }

    if listing.items.is_empty() {
        fragments = r#"<p class="muted">Tidak ada data.</p>"#.to_string();
    }

    let pager_nav = if listing.pager.has_next() {
        format!(
            r#"<a href="/merch?filter={}&q={}&page={}" class="next-page">Next page</a>"#,
            html_escape(active),
            html_escape(params.q.as_deref().unwrap_or("")),
            listing.pager.page + 1
        )
    } else {
        String::new()
    };

    let content =
        format!(r#"<h1>Merch</h1>{chips}<div id="merch-list">{fragments}</div>{pager_nav}"#);

    let html = state
        .theme()
        .render_page("Merch", &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(html))
}

/// Merch detail page.
async fn merch_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let item = Merch::find_by_id(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let thumbnail = if item.thumbnail.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{}" width="320">"#,
            html_escape(&item.thumbnail),
            html_escape(&item.name)
        )
    };

    let content = format!(
        r#"<article class="merch-detail">
            {thumbnail}
            <h1>{}</h1>
            <span class="chip">{}</span>
            <p class="muted">{}</p>
            <p>Rp{} · stock {}</p>
            <div>{}</div>
        </article>"#,
        html_escape(&item.name),
        html_escape(&item.category),
        html_escape(&item.vendor),
        item.price,
        item.stock,
        html_escape(&item.description),
    );

    let html = state
        .theme()
        .render_page(&item.name, &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(html))
}

/// Create a merch item; numeric fields fall back to zero on junk input.
async fn create_merch(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<MerchForm>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let name = strip_tags(form.name.as_deref().unwrap_or(""));
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()).into_response());
    }

    let input = CreateMerch {
        name,
        vendor: strip_tags(form.vendor.as_deref().unwrap_or("")),
        price: parse_nonneg_or(form.price.as_deref(), 0),
        stock: parse_nonneg_or(form.stock.as_deref(), 0),
        description: strip_tags(form.description.as_deref().unwrap_or("")),
        thumbnail: form.thumbnail.unwrap_or_default(),
        category: form.category.unwrap_or_default(),
        link: form.link.unwrap_or_default(),
    };

    let created = Merch::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    Ok((
        StatusCode::CREATED,
        Json(MerchPayload::from_merch(created)),
    )
        .into_response())
}

/// Update a merch item. A payload without `name` is rejected outright.
async fn update_merch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<MerchForm>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let Some(name) = form.name else {
        return Err(AppError::BadRequest("Invalid payload".to_string()).into_response());
    };

    let input = UpdateMerch {
        name: Some(strip_tags(&name)),
        vendor: form.vendor.map(|v| strip_tags(&v)),
        price: form.price.as_deref().map(|p| parse_nonneg_or(Some(p), 0)),
        stock: form.stock.as_deref().map(|s| parse_nonneg_or(Some(s), 0)),
        description: form.description.map(|d| strip_tags(&d)),
        thumbnail: form.thumbnail,
        category: form.category,
        link: form.link,
    };

    let updated = Merch::update(state.db(), id, input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    match updated {
        Some(item) => Ok(Json(MerchPayload::from_merch(item)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}

/// Delete a merch item: 204 on success, structured 404 otherwise.
async fn delete_merch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let deleted = Merch::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response())
    }
}

/// JSON feed of the whole catalog.
async fn show_json(State(state): State<AppState>) -> Result<Json<Vec<MerchPayload>>, AppError> {
    let items = Merch::list_all(state.db()).await?;
    Ok(Json(items.into_iter().map(MerchPayload::from_merch).collect()))
}

/// Single-item JSON lookup.
async fn show_json_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    match Merch::find_by_id(state.db(), id).await? {
        Some(item) => Ok(Json(MerchPayload::from_merch(item)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}
