#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Fragment rendering tests: one card per item, safely escaped.

use garuda_kernel::models::{Comment, Merch, News, Player, Post};
use garuda_kernel::theme::ThemeEngine;
use uuid::Uuid;

fn theme() -> ThemeEngine {
    ThemeEngine::new().unwrap()
}

fn sample_post(title: &str) -> Post {
    Post {
        id: Uuid::now_v7(),
        title: title.to_string(),
        slug: "sample".to_string(),
        author_name: "Orang".to_string(),
        category_id: Uuid::now_v7(),
        excerpt: "teaser".to_string(),
        body: "body".to_string(),
        status: "published".to_string(),
        created: 1_700_000_000,
        changed: 1_700_000_000,
        like_count: 3,
    }
}

#[test]
fn post_card_shows_title_category_and_like_state() {
    let mut context = tera::Context::new();
    context.insert("post", &sample_post("Garuda wins"));
    context.insert("category", "News");
    context.insert("liked", &true);

    let html = theme().render("elements/post_card.html", &context).unwrap();
    assert!(html.contains("Garuda wins"));
    assert!(html.contains("News"));
    assert!(html.contains("like-btn liked"));
    assert!(html.contains(r#"href="/forum/p/sample""#));
    assert!(html.contains(">3</span>"));
}

#[test]
fn post_card_escapes_markup_in_titles() {
    let mut context = tera::Context::new();
    context.insert("post", &sample_post("<script>alert(1)</script>"));
    context.insert("category", "News");
    context.insert("liked", &false);

    let html = theme().render("elements/post_card.html", &context).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn comment_fragment_renders_author_and_body() {
    let comment = Comment {
        id: Uuid::now_v7(),
        post_id: Uuid::now_v7(),
        author_name: "Zed".to_string(),
        body: "Nice".to_string(),
        created: 1_700_000_000,
    };

    let mut context = tera::Context::new();
    context.insert("comment", &comment);

    let html = theme().render("elements/comment.html", &context).unwrap();
    assert!(html.contains("Zed"));
    assert!(html.contains("Nice"));
}

#[test]
fn news_card_truncates_long_content() {
    let news = News {
        id: Uuid::now_v7(),
        title: "Headline".to_string(),
        category: "Transfer".to_string(),
        publish_date: "09 Okt 2025".to_string(),
        published_month: Some(10),
        content: "x".repeat(1000),
    };

    let mut context = tera::Context::new();
    context.insert("news", &news);

    let html = theme().render("elements/news_card.html", &context).unwrap();
    assert!(html.contains("Headline"));
    assert!(html.len() < 1000);
}

#[test]
fn merch_card_renders_price_and_stock() {
    let merch = Merch {
        id: Uuid::now_v7(),
        name: "Home Jersey".to_string(),
        vendor: "Official Store".to_string(),
        price: 450_000,
        stock: 12,
        description: "2026 kit".to_string(),
        thumbnail: String::new(),
        category: "jersey".to_string(),
        link: String::new(),
        created: 1_700_000_000,
    };

    let mut context = tera::Context::new();
    context.insert("merch", &merch);

    let html = theme().render("elements/merch_card.html", &context).unwrap();
    assert!(html.contains("Home Jersey"));
    assert!(html.contains("Rp450000"));
    assert!(html.contains("stock 12"));
    // No thumbnail field, no img tag.
    assert!(!html.contains("<img"));
}

#[test]
fn player_form_lists_every_position_option() {
    use garuda_kernel::models::player::POSITIONS;

    let mut context = tera::Context::new();
    context.insert("positions", &POSITIONS);
    context.insert("selected", &["", "", ""]);
    context.insert("submit_url", "/squad/players");
    context.insert("form_title", "Tambah Pemain");

    let html = theme().render("elements/player_form.html", &context).unwrap();
    for pos in POSITIONS {
        assert!(html.contains(&format!(r#"value="{pos}""#)), "missing {pos}");
    }
    assert!(html.contains(r#"action="/squad/players""#));
}

#[test]
fn player_card_carries_role_tag_for_grouping() {
    let player = Player {
        id: Uuid::now_v7(),
        name: "Asnawi".to_string(),
        photo_url: String::new(),
        birth_date: None,
        club: "Port FC".to_string(),
        height_cm: Some(174),
        position1: "RB".to_string(),
        position2: String::new(),
        position3: String::new(),
        caps: 40,
        goals: 2,
        assists: 5,
        created: 1_700_000_000,
    };

    let mut context = tera::Context::new();
    context.insert("player", &player);
    context.insert("role_tag", player.role_tag());
    context.insert("positions", &player.positions_list().join(", "));

    let html = theme().render("elements/player_card.html", &context).unwrap();
    assert!(html.contains(r#"data-role="DEFENDER""#));
    assert!(html.contains("Asnawi"));
    assert!(html.contains("40 caps"));
}
