//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models::Category;
use crate::services::likes::LikeLedger;
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Theme engine for template rendering.
    theme: ThemeEngine,

    /// Session-keyed liked-post ledger.
    likes: LikeLedger,
}

impl AppState {
    /// Create new application state with database connections.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        let theme = ThemeEngine::new().context("failed to initialize theme engine")?;

        Category::ensure_defaults(&db)
            .await
            .context("failed to seed default categories")?;
        info!("Default forum categories present");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                theme,
                likes: LikeLedger::new(),
            }),
        })
    }

    /// Build state around an existing pool (tests).
    pub fn from_pool(db: PgPool) -> Result<Self> {
        let theme = ThemeEngine::new().context("failed to initialize theme engine")?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                theme,
                likes: LikeLedger::new(),
            }),
        })
    }

    /// Database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Theme engine.
    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    /// Liked-post ledger.
    pub fn likes(&self) -> &LikeLedger {
        &self.inner.likes
    }
}
