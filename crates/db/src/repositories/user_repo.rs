//! Repository for the `users` table.

use sqlx::PgPool;
use tabsync_core::account::USER_STATUS_INIT;
use tabsync_core::types::Timestamp;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, totp_secret, user_status, session_token, \
                        ban_ip, ban_expires_at, created_at, updated_at";

/// Tables whose rows are owned by a user through their `username` column.
const OWNED_TABLES: [&str; 5] = ["tabs", "shortcuts", "history_entries", "bookmarks", "notes"];

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user in the `init` state, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, totp_secret, user_status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.totp_secret)
            .bind(USER_STATUS_INIT)
            .fetch_one(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user whose current session token equals `token`.
    ///
    /// A cleared (NULL) token never matches.
    pub async fn find_by_username_and_token(
        pool: &PgPool,
        username: &str,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE username = $1 AND session_token = $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Persist the mutable session state of a user (status, token, ban).
    ///
    /// Returns `true` if the row was updated.
    pub async fn save_session_state(pool: &PgPool, user: &User) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                user_status = $2,
                session_token = $3,
                ban_ip = $4,
                ban_expires_at = $5,
                updated_at = NOW()
             WHERE username = $1",
        )
        .bind(&user.username)
        .bind(&user.user_status)
        .bind(&user.session_token)
        .bind(&user.ban_ip)
        .bind(user.ban_expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a user. Returns `true` if a row was removed.
    pub async fn delete_by_username(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user and every record it owns in one transaction.
    ///
    /// The user row is locked first, so concurrent inserts into the owned
    /// tables wait for the commit and then fail their foreign key check.
    /// Returns the number of owned records removed, or `None` if the user
    /// does not exist.
    pub async fn delete_with_records(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 FOR UPDATE")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let mut removed = 0;
        for table in OWNED_TABLES {
            let query = format!("DELETE FROM {table} WHERE username = $1");
            removed += sqlx::query(&query)
                .bind(username)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(removed))
    }

    /// Delete users still in the `init` state that were created before
    /// `cutoff`. Returns the count of deleted rows.
    pub async fn delete_unverified_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_status = $1 AND created_at < $2")
            .bind(USER_STATUS_INIT)
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
