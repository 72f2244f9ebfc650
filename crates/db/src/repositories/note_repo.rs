//! Repository for the `notes` table.

use sqlx::PgPool;
use tabsync_core::types::DbId;

use crate::models::note::{CreateNote, Note, UpdateNote};

const COLUMNS: &str = "id, username, title, content, created_at, updated_at";

pub struct NoteRepo;

impl NoteRepo {
    pub async fn create(pool: &PgPool, username: &str, input: &CreateNote) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (username, title, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(username)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// List the owner's notes, newest first.
    pub async fn list_by_owner(pool: &PgPool, username: &str) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE username = $1 ORDER BY id DESC");
        sqlx::query_as::<_, Note>(&query)
            .bind(username)
            .fetch_all(pool)
            .await
    }

    /// Update a note owned by `username`. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        username: &str,
        input: &UpdateNote,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = NOW()
             WHERE id = $1 AND username = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(username)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_by_owner(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
