//! Postgres-backed credential store.
//!
//! Reads and writes a `users(id, username, password, role)` table.
//! `password` holds the PHC hash string.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::error;

use relaygate_auth::{Account, NewAccount, Role};
use relaygate_core::{AccountId, Username};

use super::{CredentialStore, StoreError};

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    error!(error = %err, "credential store query failed");
    StoreError::Backend(err.to_string())
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let id: i64 = row.try_get("id").map_err(backend)?;
    let username: String = row.try_get("username").map_err(backend)?;
    let password_hash: String = row.try_get("password").map_err(backend)?;
    let role: String = row.try_get("role").map_err(backend)?;

    let username = Username::parse(&username)
        .map_err(|e| StoreError::Backend(format!("stored username {username:?}: {e}")))?;

    Ok(Account {
        id: AccountId::new(id),
        username,
        password_hash,
        role: Role::new(role),
    })
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING id::BIGINT AS id, username, password, role
            "#,
        )
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => account_from_row(&row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateUsername)
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, username, password, COALESCE(role, 'user') AS role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(account_from_row).transpose()
    }
}
