//! Repository for the `tabs` table.

use sqlx::PgPool;
use tabsync_core::sync::{resolve_tab_group, TAB_STATUS_ACTIVE};
use tabsync_core::types::DbId;

use crate::models::tab::{CreateTab, Tab, TabFilter, UpdateTab};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, title, url, tab_group, status, created_at, updated_at";

/// Provides CRUD operations for tabs. Every query is scoped by owner.
pub struct TabRepo;

impl TabRepo {
    /// Insert a new tab for `username`, returning the created row.
    pub async fn create(pool: &PgPool, username: &str, input: &CreateTab) -> Result<Tab, sqlx::Error> {
        let query = format!(
            "INSERT INTO tabs (username, title, url, tab_group, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tab>(&query)
            .bind(username)
            .bind(&input.title)
            .bind(&input.url)
            .bind(resolve_tab_group(input.group.as_deref()))
            .bind(input.status.as_deref().unwrap_or(TAB_STATUS_ACTIVE))
            .fetch_one(pool)
            .await
    }

    /// List the owner's tabs in creation order, optionally filtered by status.
    pub async fn list_by_owner(
        pool: &PgPool,
        username: &str,
        filter: &TabFilter,
    ) -> Result<Vec<Tab>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tabs
             WHERE username = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Tab>(&query)
            .bind(username)
            .bind(&filter.status)
            .fetch_all(pool)
            .await
    }

    /// Patch an active tab owned by `username`.
    ///
    /// Returns `None` if the tab does not exist, belongs to someone else, or
    /// is already closed.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        username: &str,
        input: &UpdateTab,
    ) -> Result<Option<Tab>, sqlx::Error> {
        let query = format!(
            "UPDATE tabs SET
                status = COALESCE($3, status),
                tab_group = COALESCE($4, tab_group),
                updated_at = NOW()
             WHERE id = $1 AND username = $2 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tab>(&query)
            .bind(id)
            .bind(username)
            .bind(&input.status)
            .bind(&input.group)
            .bind(TAB_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tab owned by `username`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tabs WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every tab owned by `username`. Returns the count of deleted rows.
    pub async fn delete_all_by_owner(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tabs WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
