//! `CredentialStore` backed by the `oauth_clients` and `oauth_access_tokens` tables.

use crate::SqliteStore;
use ally_oauth::{ClientRecord, ClientRegistration, CredentialStore, TokenRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct ClientRow {
    client_id: String,
    user_id: i64,
    secret_hash: String,
    client_name: String,
    grant_types: String, // comma-separated
    redirect_uris: String, // JSON array
    revoked: i64,
    created_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_record(self) -> anyhow::Result<ClientRecord> {
        Ok(ClientRecord {
            client_id: self.client_id,
            user_id: self.user_id,
            secret_hash: self.secret_hash,
            client_name: self.client_name,
            grant_types: self
                .grant_types
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect(),
            redirect_uris: serde_json::from_str(&self.redirect_uris)?,
            revoked: self.revoked != 0,
            created_at: self.created_at,
        })
    }
}

const CLIENT_COLUMNS: &str =
    "client_id, user_id, secret_hash, client_name, grant_types, redirect_uris, revoked, created_at";

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn user_name(&self, user_id: i64) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(name,)| name))
    }

    async fn find_client(&self, client_id: &str) -> anyhow::Result<Option<ClientRecord>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM oauth_clients WHERE client_id = ?"
        ))
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ClientRow::into_record).transpose()
    }

    async fn find_client_for_user(&self, user_id: i64) -> anyhow::Result<Option<ClientRecord>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM oauth_clients WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ClientRow::into_record).transpose()
    }

    async fn upsert_client(&self, registration: ClientRegistration) -> anyhow::Result<ClientRecord> {
        sqlx::query(
            "INSERT INTO oauth_clients \
             (client_id, user_id, secret_hash, client_name, grant_types, redirect_uris, revoked, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?) \
             ON CONFLICT(client_id) DO UPDATE SET secret_hash = excluded.secret_hash, revoked = 0",
        )
        .bind(&registration.client_id)
        .bind(registration.user_id)
        .bind(&registration.secret_hash)
        .bind(&registration.client_name)
        .bind(registration.grant_types.join(","))
        .bind(serde_json::to_string(&registration.redirect_uris)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_client(&registration.client_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("client {} vanished after upsert", registration.client_id))
    }

    async fn revoke_client(&self, client_id: &str) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let affected = sqlx::query("UPDATE oauth_clients SET revoked = 1 WHERE client_id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("UPDATE oauth_access_tokens SET revoked = 1 WHERE client_id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(affected > 0)
    }

    async fn record_token(&self, token: TokenRecord) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO oauth_access_tokens \
             (token_hash, client_id, user_id, scope, expires_at, revoked, created_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&token.token_hash)
        .bind(&token.client_id)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, token_hash: &str) -> anyhow::Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT revoked FROM oauth_access_tokens WHERE token_hash = ?")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some_and(|(revoked,)| revoked != 0))
    }
}

impl SqliteStore {
    /// Drop token hashes that expired before `now`. Returns how many were removed.
    pub async fn purge_expired_tokens(&self, now: i64) -> Result<u64, crate::StoreError> {
        let removed = sqlx::query("DELETE FROM oauth_access_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired access token hashes");
        }
        Ok(removed)
    }
}
