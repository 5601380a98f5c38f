//! Shared route helpers: session user resolution, access gates, and the
//! escaping/sanitizing primitives used by fragment and feed rendering.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::LazyLock;
use tower_sessions::Session;
use uuid::Uuid;

use crate::models::User;
use crate::policy;
use crate::state::AppState;

/// Session key for user ID.
pub const SESSION_USER_ID: &str = "user_id";

/// Session key for the like-ledger key.
const SESSION_LIKE_KEY: &str = "like_key";

/// Resolve the session's user, if any.
pub async fn current_user(state: &AppState, session: &Session) -> Option<User> {
    let user_id: Option<Uuid> = session.get(SESSION_USER_ID).await.ok().flatten();
    let id = user_id?;
    User::find_by_id(state.db(), id).await.ok().flatten()
}

/// Require an authenticated user, or redirect to login.
///
/// Returns the [`User`] if one is logged in. Returns a redirect response if
/// the session contains no valid user id.
pub async fn require_login(state: &AppState, session: &Session) -> Result<User, Response> {
    match current_user(state, session).await {
        Some(user) => Ok(user),
        None => Err(Redirect::to("/login").into_response()),
    }
}

/// Require a user the policy allows to moderate, or redirect/reject.
///
/// Redirects to login when the session has no valid user; 403 when the user
/// exists but the policy says no. The policy check happens here, once, and
/// nowhere else.
pub async fn require_moderator(state: &AppState, session: &Session) -> Result<User, Response> {
    let user = require_login(state, session).await?;
    if policy::can_moderate(&user) {
        Ok(user)
    } else {
        Err((StatusCode::FORBIDDEN, Html("Access denied")).into_response())
    }
}

/// Stable per-session key for the like ledger. Created on first use so the
/// ledger survives until the session itself expires.
pub async fn session_like_key(session: &Session) -> String {
    if let Ok(Some(key)) = session.get::<String>(SESSION_LIKE_KEY).await {
        return key;
    }
    let key = Uuid::now_v7().to_string();
    if let Err(e) = session.insert(SESSION_LIKE_KEY, key.clone()).await {
        tracing::warn!(error = %e, "failed to persist like key in session");
    }
    key
}

/// Whether the request came from the site's AJAX layer.
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// XML-escape element text.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

static TAG_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"<[^>]*>").expect("valid regex literal"));

/// Strip HTML tags from user input before storage.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").trim().to_string()
}

/// Serialize one record as a generic XML `<object>` element, the shape the
/// XML feeds share: `<object model="…" pk="…"><field name="…">…</field>…</object>`.
pub fn xml_object(model: &str, pk: &str, fields: &[(&str, String)]) -> String {
    let mut out = format!(r#"<object model="{}" pk="{}">"#, xml_escape(model), xml_escape(pk));
    for (name, value) in fields {
        out.push_str(&format!(
            r#"<field name="{}">{}</field>"#,
            xml_escape(name),
            xml_escape(value)
        ));
    }
    out.push_str("</object>");
    out
}

/// Wrap serialized objects in the feed document element.
pub fn xml_document(objects: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="utf-8"?><objects>{objects}</objects>"#)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_special_chars() {
        assert_eq!(
            html_escape("<script>alert('xss')</script>"),
            "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_html_escape_plain_text() {
        assert_eq!(html_escape("hello world"), "hello world");
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
        assert_eq!(strip_tags("  plain  "), "plain");
        assert_eq!(strip_tags("<script>x</script>"), "x");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn xml_object_escapes_values() {
        let xml = xml_object("news", "abc", &[("title", "Tom & Jerry <3".to_string())]);
        assert_eq!(
            xml,
            r#"<object model="news" pk="abc"><field name="title">Tom &amp; Jerry &lt;3</field></object>"#
        );
    }

    #[test]
    fn xml_document_wraps_objects() {
        let doc = xml_document("<object></object>");
        assert!(doc.starts_with(r#"<?xml version="1.0""#));
        assert!(doc.contains("<objects><object></object></objects>"));
    }
}
