//! Repository for the `bookmarks` table.

use sqlx::PgPool;
use tabsync_core::types::DbId;

use crate::models::bookmark::{Bookmark, CreateBookmark, UpdateBookmark};

const COLUMNS: &str = "id, username, title, url, created_at, updated_at";

pub struct BookmarkRepo;

impl BookmarkRepo {
    pub async fn create(
        pool: &PgPool,
        username: &str,
        input: &CreateBookmark,
    ) -> Result<Bookmark, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookmarks (username, title, url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(username)
            .bind(&input.title)
            .bind(&input.url)
            .fetch_one(pool)
            .await
    }

    /// List the owner's bookmarks, newest first.
    pub async fn list_by_owner(pool: &PgPool, username: &str) -> Result<Vec<Bookmark>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks WHERE username = $1 ORDER BY id DESC");
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(username)
            .fetch_all(pool)
            .await
    }

    /// Update a bookmark owned by `username`. Only non-`None` fields are
    /// applied. Returns `None` if no such bookmark exists for the owner.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        username: &str,
        input: &UpdateBookmark,
    ) -> Result<Option<Bookmark>, sqlx::Error> {
        let query = format!(
            "UPDATE bookmarks SET
                title = COALESCE($3, title),
                url = COALESCE($4, url),
                updated_at = NOW()
             WHERE id = $1 AND username = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bookmark>(&query)
            .bind(id)
            .bind(username)
            .bind(&input.title)
            .bind(&input.url)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_by_owner(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
