//! Postgres-backed policy store over the casbin adapter table.
//!
//! Reads `casbin_rule(ptype, v0..v5)`, the layout written by the casbin
//! Postgres adapters, so existing policy tables can be reused. The `id`
//! column is never read; adapters disagree on its type.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::error;

use relaygate_auth::{PolicyError, PolicySet, PolicyStore};

use super::casbin::{PolicyRecord, records_to_policy};

const VALUE_COLUMNS: [&str; 6] = ["v0", "v1", "v2", "v3", "v4", "v5"];

pub struct PostgresPolicyStore {
    pool: PgPool,
}

impl PostgresPolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `casbin_rule` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), PolicyError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS casbin_rule (
                id BIGSERIAL PRIMARY KEY,
                ptype TEXT NOT NULL,
                v0 TEXT NOT NULL DEFAULT '',
                v1 TEXT NOT NULL DEFAULT '',
                v2 TEXT NOT NULL DEFAULT '',
                v3 TEXT NOT NULL DEFAULT '',
                v4 TEXT NOT NULL DEFAULT '',
                v5 TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(err: sqlx::Error) -> PolicyError {
    error!(error = %err, "policy store query failed");
    PolicyError::Store(err.to_string())
}

#[async_trait]
impl PolicyStore for PostgresPolicyStore {
    async fn load(&self) -> Result<PolicySet, PolicyError> {
        let rows = sqlx::query(
            r#"
            SELECT ptype, v0, v1, v2, v3, v4, v5
            FROM casbin_rule
            ORDER BY ptype, v0, v1, v2, v3, v4, v5
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for (n, row) in rows.iter().enumerate() {
            let ptype: String = row.try_get("ptype").map_err(store_error)?;
            let mut values = Vec::with_capacity(VALUE_COLUMNS.len());
            for column in VALUE_COLUMNS {
                let value: Option<String> = row.try_get(column).map_err(store_error)?;
                values.push(value.unwrap_or_default());
            }
            records.push((format!("casbin_rule row {}", n + 1), PolicyRecord::new(ptype, values)));
        }

        records_to_policy(records)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
