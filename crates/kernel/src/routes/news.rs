//! News route handlers: listing page, moderator CRUD, and the JSON/XML
//! feeds with month filter, sort toggle, and bounded pagination.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::listing::{SortDirection, month_from, page_from, page_size_from};
use crate::models::{CreateNews, News, UpdateNews, news::FEED_PAGE_SIZE};
use crate::state::AppState;

use super::helpers::{html_escape, require_login, require_moderator, strip_tags, xml_document, xml_object};

/// Create the news router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/news", get(news_list))
        .route("/news", post(create_news))
        .route("/news/json", get(feed_json))
        .route("/news/xml", get(feed_xml))
        .route("/news/json/{id}", get(feed_json_by_id))
        .route("/news/xml/{id}", get(feed_xml_by_id))
        .route("/news/add", post(add_news_ajax))
        .route("/news/{id}", get(news_detail))
        .route("/news/{id}/edit", post(edit_news))
        .route("/news/{id}/delete", post(delete_news))
        .route("/news/{id}/delete-ajax", post(delete_news_ajax))
}

/// Feed query parameters, raw strings so malformed input falls back.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub sort: Option<String>,
    pub month: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// One article in the JSON feed.
#[derive(Debug, Serialize)]
pub struct NewsPayload {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub publish_date: String,
    pub content: String,
}

/// JSON feed response envelope.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub items: Vec<NewsPayload>,
    pub page: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub total: i64,
}

/// Form payload for creating or editing an article.
#[derive(Debug, Deserialize)]
pub struct NewsForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub publish_date: Option<String>,
    pub content: Option<String>,
}

impl NewsPayload {
    fn from_news(n: News) -> Self {
        Self {
            id: n.id,
            title: n.title,
            category: n.category,
            publish_date: n.publish_date,
            content: n.content,
        }
    }
}

fn news_xml_fields(n: &News) -> Vec<(&'static str, String)> {
    vec![
        ("title", n.title.clone()),
        ("category", n.category.clone()),
        ("publish_date", n.publish_date.clone()),
        ("content", n.content.clone()),
    ]
}

/// News listing page, newest first.
async fn news_list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let articles = News::list_all(state.db())
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let mut fragments = String::new();
    for article in &articles {
        let mut context = tera::Context::new();
        context.insert("news", article);
        fragments.push_str(
            &state
                .theme()
                .render("elements/news_card.html", &context)
                .map_err(|e| AppError::from(e).into_response())?,
        );
    }

    let content = format!(r#"<h1>News</h1><div id="news-list">{fragments}</div>"#);
    let page = state
        .theme()
        .render_page("News", &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(page))
}

/// News detail page.
async fn news_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let article = News::find_by_id(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let content = format!(
        r#"<article class="news-detail">
            <h1>{}</h1>
            <p class="muted">{} · {}</p>
            <div class="news-body">{}</div>
        </article>"#,
        html_escape(&article.title),
        html_escape(&article.category),
        html_escape(&article.publish_date),
        html_escape(&article.content),
    );

    let page = state
        .theme()
        .render_page(&article.title, &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(page))
}

/// Validate and strip a news form; `Err` carries the field errors.
fn clean_news_form(form: NewsForm) -> Result<CreateNews, &'static str> {
    let title = strip_tags(form.title.as_deref().unwrap_or(""));
    let category = strip_tags(form.category.as_deref().unwrap_or(""));
    let publish_date = strip_tags(form.publish_date.as_deref().unwrap_or(""));
    let content = strip_tags(form.content.as_deref().unwrap_or(""));

    if title.is_empty() || category.is_empty() || content.is_empty() {
        return Err("title, category, content are required");
    }

    Ok(CreateNews {
        title,
        category,
        publish_date,
        content,
    })
}

/// Create an article (moderators only), redirecting back to the listing.
async fn create_news(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<NewsForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let input = clean_news_form(form)
        .map_err(|msg| AppError::BadRequest(msg.to_string()).into_response())?;

    News::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Redirect::to("/news").into_response())
}

/// Edit an article (moderators only).
async fn edit_news(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<NewsForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let input = UpdateNews {
        title: form.title.map(|t| strip_tags(&t)),
        category: form.category.map(|c| strip_tags(&c)),
        publish_date: form.publish_date.map(|d| strip_tags(&d)),
        content: form.content.map(|c| strip_tags(&c)),
    };

    let updated = News::update(state.db(), id, input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    match updated {
        Some(article) => Ok(Redirect::to(&format!("/news/{}", article.id)).into_response()),
        None => Err(AppError::NotFound.into_response()),
    }
}

/// Delete an article (moderators only).
async fn delete_news(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = News::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Redirect::to("/news").into_response())
    } else {
        Err(AppError::NotFound.into_response())
    }
}

/// JSON feed: `?sort=asc|desc&month=1-12&page=N&page_size=N`.
///
/// Pagination overrun yields an empty `items` array with success status.
async fn feed_json(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, AppError> {
    let sort = SortDirection::from_param(params.sort.as_deref());
    let month = month_from(params.month.as_deref());
    let page = page_from(params.page.as_deref());
    let page_size = page_size_from(params.page_size.as_deref(), FEED_PAGE_SIZE);

    let listing = News::feed(state.db(), month, sort, page, page_size).await?;

    Ok(Json(FeedResponse {
        page: listing.pager.page,
        page_size: listing.pager.page_size,
        has_next: listing.pager.has_next(),
        total: listing.pager.total,
        items: listing.items.into_iter().map(NewsPayload::from_news).collect(),
    }))
}

/// Single-article JSON lookup; unknown ids get a structured 404.
async fn feed_json_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    match News::find_by_id(state.db(), id).await? {
        Some(article) => Ok(Json(NewsPayload::from_news(article)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found"})),
        )
            .into_response()),
    }
}

/// XML feed of every article.
async fn feed_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let articles = News::list_all(state.db()).await?;

    let mut objects = String::new();
    for article in &articles {
        objects.push_str(&xml_object(
            "news",
            &article.id.to_string(),
            &news_xml_fields(article),
        ));
    }

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml_document(&objects),
    )
        .into_response())
}

/// Single-article XML lookup.
async fn feed_xml_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let objects = match News::find_by_id(state.db(), id).await? {
        Some(article) => xml_object("news", &article.id.to_string(), &news_xml_fields(&article)),
        None => String::new(),
    };

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml_document(&objects),
    )
        .into_response())
}

/// AJAX create (moderators only): 201 with the created payload, 400 when
/// required fields are missing.
async fn add_news_ajax(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<NewsForm>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let input = match clean_news_form(form) {
        Ok(input) => input,
        Err(msg) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": msg})),
            )
                .into_response());
        }
    };

    let created = News::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    Ok((
        StatusCode::CREATED,
        Json(NewsPayload::from_news(created)),
    )
        .into_response())
}

/// AJAX delete (moderators only).
async fn delete_news_ajax(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_moderator(&state, &session).await?;

    let deleted = News::delete(state.db(), id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    if deleted {
        Ok(Json(serde_json::json!({"deleted": id})).into_response())
    } else {
        Err(AppError::NotFound.into_response())
    }
}
