//! Credential persistence seam.
//!
//! The issuer only talks to a [`CredentialStore`]. The SQLite implementation
//! lives in `ally-store`; [`MemoryCredentialStore`] backs tests and embedded use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A registered OAuth client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub user_id: i64,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub client_name: String,
    pub grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields written when a client is created or its secret rotated.
#[derive(Debug, Clone)]
pub struct ClientRegistration {
    pub client_id: String,
    pub user_id: i64,
    pub secret_hash: String,
    pub client_name: String,
    pub grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
}

/// A persisted access token hash.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub token_hash: String,
    pub client_id: String,
    pub user_id: i64,
    pub scope: String,
    pub expires_at: i64,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Display name of a user, or `None` when the user does not exist.
    async fn user_name(&self, user_id: i64) -> anyhow::Result<Option<String>>;

    async fn find_client(&self, client_id: &str) -> anyhow::Result<Option<ClientRecord>>;

    async fn find_client_for_user(&self, user_id: i64) -> anyhow::Result<Option<ClientRecord>>;

    /// Create the client, or replace its secret hash and clear the revoked flag.
    async fn upsert_client(&self, registration: ClientRegistration) -> anyhow::Result<ClientRecord>;

    /// Mark the client revoked along with all of its tokens. Returns false when absent.
    async fn revoke_client(&self, client_id: &str) -> anyhow::Result<bool>;

    async fn record_token(&self, token: TokenRecord) -> anyhow::Result<()>;

    /// Whether a recorded token hash is revoked. Unknown hashes are not revoked.
    async fn is_token_revoked(&self, token_hash: &str) -> anyhow::Result<bool>;
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<i64, String>,
    clients: HashMap<String, ClientRecord>,
    tokens: HashMap<String, (TokenRecord, bool)>,
}

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentialStore {
    state: RwLock<MemoryState>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: i64, name: impl Into<String>) {
        self.state.write().await.users.insert(user_id, name.into());
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn user_name(&self, user_id: i64) -> anyhow::Result<Option<String>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_client(&self, client_id: &str) -> anyhow::Result<Option<ClientRecord>> {
        Ok(self.state.read().await.clients.get(client_id).cloned())
    }

    async fn find_client_for_user(&self, user_id: i64) -> anyhow::Result<Option<ClientRecord>> {
        Ok(self
            .state
            .read()
            .await
            .clients
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn upsert_client(&self, registration: ClientRegistration) -> anyhow::Result<ClientRecord> {
        let mut state = self.state.write().await;
        let record = match state.clients.get(&registration.client_id) {
            Some(existing) => ClientRecord {
                secret_hash: registration.secret_hash,
                revoked: false,
                ..existing.clone()
            },
            None => ClientRecord {
                client_id: registration.client_id.clone(),
                user_id: registration.user_id,
                secret_hash: registration.secret_hash,
                client_name: registration.client_name,
                grant_types: registration.grant_types,
                redirect_uris: registration.redirect_uris,
                revoked: false,
                created_at: Utc::now(),
            },
        };
        state.clients.insert(record.client_id.clone(), record.clone());
        Ok(record)
    }

    async fn revoke_client(&self, client_id: &str) -> anyhow::Result<bool> {
        let mut state = self.state.write().await;
        let Some(client) = state.clients.get_mut(client_id) else {
            return Ok(false);
        };
        client.revoked = true;
        for (token, revoked) in state.tokens.values_mut() {
            if token.client_id == client_id {
                *revoked = true;
            }
        }
        Ok(true)
    }

    async fn record_token(&self, token: TokenRecord) -> anyhow::Result<()> {
        self.state
            .write()
            .await
            .tokens
            .insert(token.token_hash.clone(), (token, false));
        Ok(())
    }

    async fn is_token_revoked(&self, token_hash: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .read()
            .await
            .tokens
            .get(token_hash)
            .is_some_and(|(_, revoked)| *revoked))
    }
}
