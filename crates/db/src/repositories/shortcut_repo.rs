//! Repository for the `shortcuts` table.

use sqlx::PgPool;
use tabsync_core::types::DbId;

use crate::models::shortcut::{CreateShortcut, Shortcut};

const COLUMNS: &str = "id, username, title, url, created_at";

pub struct ShortcutRepo;

impl ShortcutRepo {
    pub async fn create(
        pool: &PgPool,
        username: &str,
        input: &CreateShortcut,
    ) -> Result<Shortcut, sqlx::Error> {
        let query = format!(
            "INSERT INTO shortcuts (username, title, url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shortcut>(&query)
            .bind(username)
            .bind(&input.title)
            .bind(&input.url)
            .fetch_one(pool)
            .await
    }

    /// List the owner's shortcuts in the order they were added.
    pub async fn list_by_owner(pool: &PgPool, username: &str) -> Result<Vec<Shortcut>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shortcuts WHERE username = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Shortcut>(&query)
            .bind(username)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shortcuts WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_by_owner(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shortcuts WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
