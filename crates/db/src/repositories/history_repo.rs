//! Repository for the `history_entries` table.

use sqlx::PgPool;
use tabsync_core::types::DbId;

use crate::models::history::{CreateHistoryEntry, HistoryEntry};

const COLUMNS: &str = "id, username, title, url, created_at";

pub struct HistoryRepo;

impl HistoryRepo {
    pub async fn create(
        pool: &PgPool,
        username: &str,
        input: &CreateHistoryEntry,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO history_entries (username, title, url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(username)
            .bind(&input.title)
            .bind(&input.url)
            .fetch_one(pool)
            .await
    }

    /// List the owner's history, most recent visit first.
    pub async fn list_by_owner(
        pool: &PgPool,
        username: &str,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM history_entries WHERE username = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(username)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM history_entries WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_by_owner(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM history_entries WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
