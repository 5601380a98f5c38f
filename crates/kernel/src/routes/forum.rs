//! Forum route handlers.
//!
//! The forum listing is served in two modes over the same query: a full page
//! render and an AJAX partial returning `{html, has_next, page}` for
//! load-more and filter refinement.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::listing::{Listing, page_from};
use crate::models::{Category, Comment, CreateComment, CreatePost, Post};
use crate::state::AppState;

use super::helpers::{
    html_escape, is_ajax, require_login, require_moderator, session_like_key, strip_tags,
};

/// Create the forum router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forum", get(post_list))
        .route("/forum/partial", get(post_list_partial))
        .route("/forum/posts", post(create_post))
        .route("/forum/p/{slug}", get(post_detail))
        .route("/forum/p/{slug}/comments", post(create_comment))
        .route("/forum/p/{slug}/like", post(toggle_like))
        .route("/forum/p/{slug}/delete", post(delete_post))
        .route("/forum/comments/{id}/delete", post(delete_comment))
}

/// Listing filter parameters, raw. Numeric fields arrive as strings so
/// malformed input can fall back silently instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

/// AJAX partial response.
#[derive(Debug, Serialize)]
pub struct PartialResponse {
    pub html: String,
    pub has_next: bool,
    pub page: i64,
}

/// Form payload for creating a post.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub body: Option<String>,
    pub author_name: Option<String>,
}

/// Form payload for creating a comment.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub author_name: Option<String>,
    pub body: Option<String>,
}

/// Run the shared listing query and render one fragment per post.
async fn fetch_page(
    state: &AppState,
    session: &Session,
    params: &ListQuery,
) -> AppResult<(Listing<Post>, String)> {
    let page = page_from(params.page.as_deref());
    let listing =
        Post::list_filtered(state.db(), params.category.as_deref(), params.q.as_deref(), page)
            .await?;

    let categories = Category::all(state.db()).await?;
    let names: HashMap<Uuid, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let like_key = session_like_key(session).await;
    let mut html = String::new();
    for post in &listing.items {
        html.push_str(&render_post_card(
            state,
            post,
            names.get(&post.category_id).copied().unwrap_or(""),
            state.likes().contains(&like_key, post.id),
        )?);
    }

    Ok((listing, html))
}

/// Render a single post card fragment.
fn render_post_card(
    state: &AppState,
    post: &Post,
    category: &str,
    liked: bool,
) -> AppResult<String> {
    let mut context = tera::Context::new();
    context.insert("post", post);
    context.insert("category", category);
    context.insert("liked", &liked);
    Ok(state.theme().render("elements/post_card.html", &context)?)
}

/// Full forum listing page.
///
/// An out-of-range page clamps to an empty result rather than erroring.
async fn post_list(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let (listing, fragments) = fetch_page(&state, &session, &params)
        .await
        .map_err(IntoResponse::into_response)?;

    let categories = Category::all(state.db())
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    let active = params.category.as_deref().unwrap_or("all");
    let query = params.q.as_deref().unwrap_or("");

    let mut chips = String::from(r#"<div class="category-chips"><a href="/forum" class="chip">All</a>"#);
    for cat in &categories {
        chips.push_str(&format!(
            r#"<a href="/forum?category={}" class="chip{}">{}</a>"#,
            html_escape(&cat.slug),
            if cat.slug == active { " active" } else { "" },
            html_escape(&cat.name)
        ));
    }
    chips.push_str("</div>");

    let search = format!(
        r#"<form method="get" action="/forum" class="post-filter">
            <input type="hidden" name="category" value="{}">
            <input type="search" name="q" value="{}" placeholder="Search posts">
            <button type="submit">Search</button>
        </form>"#,
        html_escape(active),
        html_escape(query)
    );

    let body = if listing.items.is_empty() {
        r#"<p class="muted">Tidak ada data.</p>"#.to_string()
    } else {
        fragments
    };

    let load_more = if listing.pager.has_next() {
        format!(
            r#"<button id="load-more" data-page="{}" data-category="{}" data-q="{}">Load more</button>"#,
            listing.pager.page + 1,
            html_escape(active),
            html_escape(query)
        )
    } else {
        String::new()
    };

    let content = format!(
        r#"<h1>Forum</h1>{chips}{search}<div id="post-list">{body}</div>{load_more}"#
    );

    let page = state
        .theme()
        .render_page("Forum", &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(page))
}

/// AJAX partial: fragments plus pagination metadata.
///
/// A page past the end returns an empty fragment set with `has_next: false`
/// and HTTP 200 — pagination overrun is never an error here.
async fn post_list_partial(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListQuery>,
) -> Result<Json<PartialResponse>, Response> {
    require_login(&state, &session).await?;

    let (listing, html) = fetch_page(&state, &session, &params)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(PartialResponse {
        html,
        has_next: listing.pager.has_next(),
        page: listing.pager.page,
    }))
}

/// Create a post from the inline form; returns the rendered card.
async fn create_post(
    State(state): State<AppState>,
    session: Session,
    axum::Form(form): axum::Form<PostForm>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let title = strip_tags(form.title.as_deref().unwrap_or(""));
    let body = form.body.unwrap_or_default().trim().to_string();
    let category_slug = form.category.unwrap_or_default();

    let mut errors: HashMap<&str, Vec<&str>> = HashMap::new();
    if title.is_empty() {
        errors.insert("title", vec!["This field is required."]);
    }
    if body.is_empty() {
        errors.insert("body", vec!["This field is required."]);
    }

    let category = if category_slug.is_empty() {
        errors.insert("category", vec!["This field is required."]);
        None
    } else {
        let found = Category::find_by_slug(state.db(), &category_slug)
            .await
            .map_err(|e| AppError::from(e).into_response())?;
        if found.is_none() {
            errors.insert("category", vec!["Unknown category."]);
        }
        found
    };

    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "errors": errors})),
        )
            .into_response());
    }

    let Some(category) = category else {
        return Err(AppError::BadRequest("category missing".to_string()).into_response());
    };

    let input = CreatePost {
        title,
        author_name: strip_tags(form.author_name.as_deref().unwrap_or("Orang")),
        category_id: category.id,
        body,
        excerpt: None,
        status: None,
    };

    let created = Post::create(state.db(), input)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let html = render_post_card(&state, &created, &category.name, false)
        .map_err(IntoResponse::into_response)?;

    Ok(Json(serde_json::json!({"ok": true, "html": html})).into_response())
}

/// Published post detail with its comments, oldest first.
async fn post_detail(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Html<String>, Response> {
    require_login(&state, &session).await?;

    let post = Post::find_published_by_slug(state.db(), &slug)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let category_name = Category::all(state.db())
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .into_iter()
        .find(|c| c.id == post.category_id)
        .map(|c| c.name)
        .unwrap_or_default();

    let comments = Comment::list_for_post(state.db(), post.id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let mut comments_html = String::new();
    for comment in &comments {
        let mut context = tera::Context::new();
        context.insert("comment", comment);
        comments_html.push_str(
            &state
                .theme()
                .render("elements/comment.html", &context)
                .map_err(|e| AppError::from(e).into_response())?,
        );
    }

    let content = format!(
        r#"<article class="post-detail">
            <h1>{}</h1>
            <p class="muted">{} · by {}</p>
            <div class="post-body">{}</div>
        </article>
        <section id="comments">
            <h2>Comments ({})</h2>
            {}
            <form method="post" action="/forum/p/{}/comments">
                <input type="text" name="author_name" placeholder="Your name">
                <textarea name="body" placeholder="Write a comment" required></textarea>
                <button type="submit">Post comment</button>
            </form>
        </section>"#,
        html_escape(&post.title),
        html_escape(&category_name),
        html_escape(&post.author_name),
        html_escape(&post.body),
        comments.len(),
        comments_html,
        html_escape(&post.slug),
    );

    let page = state
        .theme()
        .render_page(&post.title, &content)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Html(page))
}

/// Create a comment on a published post; returns the rendered fragment.
async fn create_comment(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    axum::Form(form): axum::Form<CommentForm>,
) -> Result<Response, Response> {
    require_login(&state, &session).await?;

    let post = Post::find_published_by_slug(state.db(), &slug)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let body = form.body.unwrap_or_default().trim().to_string();
    if body.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "ok": false,
                "errors": {"body": ["This field is required."]}
            })),
        )
            .into_response());
    }

    let comment = Comment::create(
        state.db(),
        CreateComment {
            post_id: post.id,
            author_name: strip_tags(form.author_name.as_deref().unwrap_or("Orang")),
            body,
        },
    )
    .await
    .map_err(|e| AppError::from(e).into_response())?;

    let mut context = tera::Context::new();
    context.insert("comment", &comment);
    let html = state
        .theme()
        .render("elements/comment.html", &context)
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Json(serde_json::json!({"ok": true, "html": html})).into_response())
}

/// Toggle a like for the session; the ledger entry and the denormalized
/// counter move together.
async fn toggle_like(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    require_login(&state, &session).await?;

    let post = Post::find_published_by_slug(state.db(), &slug)
        .await
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::NotFound.into_response())?;

    let key = session_like_key(&session).await;
    let liked = state.likes().toggle(&key, post.id);
    let like_count = Post::apply_like(state.db(), post.id, liked)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "liked": liked,
        "like_count": like_count,
    })))
}

/// Delete a post (moderators only). AJAX callers get JSON; browsers get a
/// redirect back to the listing.
async fn delete_post(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    if let Err(resp) = require_moderator(&state, &session).await {
        if is_ajax(&headers) {
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({"ok": false, "error": "forbidden"})),
            )
                .into_response();
        }
        return resp;
    }

    let post = match Post::find_by_slug(state.db(), &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => return AppError::NotFound.into_response(),
        Err(e) => return AppError::from(e).into_response(),
    };

    state.likes().purge_post(post.id);

    if let Err(e) = Post::delete(state.db(), post.id).await {
        return AppError::from(e).into_response();
    }

    if is_ajax(&headers) {
        Json(serde_json::json!({"ok": true})).into_response()
    } else {
        Redirect::to("/forum").into_response()
    }
}

/// Delete a comment (moderators only).
async fn delete_comment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(resp) = require_moderator(&state, &session).await {
        if is_ajax(&headers) {
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({"ok": false, "error": "forbidden"})),
            )
                .into_response();
        }
        return resp;
    }

    match Comment::delete(state.db(), id).await {
        Ok(true) => {}
        Ok(false) => return AppError::NotFound.into_response(),
        Err(e) => return AppError::from(e).into_response(),
    }

    if is_ajax(&headers) {
        Json(serde_json::json!({"ok": true})).into_response()
    } else {
        Redirect::to("/forum").into_response()
    }
}
