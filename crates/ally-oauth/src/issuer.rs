//! OAuth2 client-credentials issuer.
//!
//! Client lifecycle: created, active, secret rotated (still active, previous
//! secret invalid), revoked. A revoked client becomes active again only
//! through [`OAuthIssuer::rotate_secret`].

use crate::error::AuthError;
use crate::keys::SigningKey;
use crate::secret::{client_id_for, generate_secret, hash_secret, verify_decoy, verify_secret};
use crate::store::{ClientRecord, ClientRegistration, CredentialStore, TokenRecord};
use crate::token::{self, ACCESS_TOKEN_TTL_SECS, AccessClaims};
use ally_core::OAuthConfig;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// The only grant type this issuer supports.
pub const CLIENT_CREDENTIALS: &str = "client_credentials";

/// Successful token response body.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub scope: String,
}

/// Introspection response body: `{"active": false}` or the active claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Introspection {
    pub active: bool,
    #[serde(flatten)]
    pub claims: Option<AccessClaims>,
}

impl Introspection {
    pub fn inactive() -> Self {
        Self {
            active: false,
            claims: None,
        }
    }
}

/// A freshly rotated credential pair. The secret is not recoverable afterwards.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub client_id: String,
    pub client_secret: String,
}

pub struct OAuthIssuer {
    store: Arc<dyn CredentialStore>,
    key: SigningKey,
    default_scope: String,
    redirect_uris: Vec<String>,
}

impl OAuthIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, key: SigningKey, config: &OAuthConfig) -> Self {
        Self {
            store,
            key,
            default_scope: config.default_scope.clone(),
            redirect_uris: config.redirect_uris.clone(),
        }
    }

    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    /// Check a client id and secret pair.
    ///
    /// Unknown and revoked clients give [`AuthError::InvalidClient`]; a wrong
    /// secret gives [`AuthError::InvalidSecret`]. Every outcome pays for one
    /// Argon2 verification, run on the blocking pool.
    pub async fn authenticate_client(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<ClientRecord, AuthError> {
        let client = self
            .store
            .find_client(client_id)
            .await?
            .filter(|c| !c.revoked);

        let stored_hash = client.as_ref().map(|c| c.secret_hash.clone());
        let secret = client_secret.to_string();
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verify_secret(&secret, &hash),
            None => verify_decoy(&secret),
        })
        .await
        .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;

        match client {
            None => Err(AuthError::InvalidClient),
            Some(_) if !verified => Err(AuthError::InvalidSecret),
            Some(client) => Ok(client),
        }
    }

    /// Handle a token request for `grant_type`.
    pub async fn grant(
        &self,
        grant_type: &str,
        client_id: &str,
        client_secret: &str,
        scope: Option<&str>,
    ) -> Result<TokenGrant, AuthError> {
        if grant_type != CLIENT_CREDENTIALS {
            return Err(AuthError::UnsupportedGrantType(grant_type.to_string()));
        }
        self.issue_token(client_id, client_secret, scope).await
    }

    /// Issue an access token for a client.
    pub async fn issue_token(
        &self,
        client_id: &str,
        client_secret: &str,
        scope: Option<&str>,
    ) -> Result<TokenGrant, AuthError> {
        self.issue_token_at(client_id, client_secret, scope, Utc::now().timestamp())
            .await
    }

    /// [`OAuthIssuer::issue_token`] with an explicit issuance time.
    pub async fn issue_token_at(
        &self,
        client_id: &str,
        client_secret: &str,
        scope: Option<&str>,
        now: i64,
    ) -> Result<TokenGrant, AuthError> {
        let client = self.authenticate_client(client_id, client_secret).await?;

        let scope = scope
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_scope)
            .to_string();

        let claims = AccessClaims::new(client.user_id, &client.client_id, &scope, now);
        let access_token = token::mint(&self.key, &claims)?;

        self.store
            .record_token(TokenRecord {
                token_hash: token::token_hash(&access_token),
                client_id: client.client_id.clone(),
                user_id: client.user_id,
                scope: scope.clone(),
                expires_at: claims.exp,
            })
            .await?;

        tracing::info!(
            client_id = %client.client_id,
            user_id = client.user_id,
            scope = %scope,
            "Issued access token"
        );

        Ok(TokenGrant {
            access_token,
            token_type: "Bearer",
            expires_in: ACCESS_TOKEN_TTL_SECS,
            scope,
        })
    }

    /// Describe a token. Never fails: anything wrong reports `active: false`.
    pub async fn introspect(&self, token: &str) -> Introspection {
        self.introspect_at(token, Utc::now().timestamp()).await
    }

    pub async fn introspect_at(&self, token: &str, now: i64) -> Introspection {
        match self.verify_bearer_at(token, now).await {
            Ok(claims) => Introspection {
                active: true,
                claims: Some(claims),
            },
            Err(e) => {
                tracing::debug!(error = %e, "Token introspected as inactive");
                Introspection::inactive()
            }
        }
    }

    /// Verify a bearer token for a protected endpoint.
    pub async fn verify_bearer(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.verify_bearer_at(token, Utc::now().timestamp()).await
    }

    /// Signature, expiry, revoked token hash and revoked client are all checked.
    /// Store failures are treated as an invalid token.
    pub async fn verify_bearer_at(&self, token: &str, now: i64) -> Result<AccessClaims, AuthError> {
        let claims = token::verify_at(self.key.public_key(), token, now)?;

        let revoked = match self.store.is_token_revoked(&token::token_hash(token)).await {
            Ok(revoked) => revoked,
            Err(e) => {
                tracing::error!(error = %e, "Token revocation lookup failed");
                return Err(AuthError::InvalidToken);
            }
        };
        if revoked {
            return Err(AuthError::InvalidToken);
        }

        match self.store.find_client(&claims.client_id).await {
            Ok(Some(client)) if !client.revoked && client.user_id == claims.sub => Ok(claims),
            Ok(_) => Err(AuthError::InvalidToken),
            Err(e) => {
                tracing::error!(error = %e, "Client lookup failed during token verification");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Create the user's client if needed and give it a new secret.
    ///
    /// The previous secret stops working immediately. Tokens already issued
    /// stay valid until they expire.
    pub async fn rotate_secret(&self, user_id: i64) -> Result<IssuedCredentials, AuthError> {
        let user_name = self
            .store
            .user_name(user_id)
            .await?
            .ok_or(AuthError::UnknownUser { user_id })?;

        let client_id = client_id_for(user_id);
        let client_secret = generate_secret();

        self.store
            .upsert_client(ClientRegistration {
                client_id: client_id.clone(),
                user_id,
                secret_hash: hash_secret(&client_secret)?,
                client_name: format!("{user_name} OAuth Client"),
                grant_types: vec![CLIENT_CREDENTIALS.to_string()],
                redirect_uris: self.redirect_uris.clone(),
            })
            .await?;

        tracing::info!(client_id = %client_id, user_id, "Rotated client secret");
        Ok(IssuedCredentials {
            client_id,
            client_secret,
        })
    }

    /// Revoke the user's client and every token it was issued.
    pub async fn revoke_client(&self, user_id: i64) -> Result<(), AuthError> {
        let client_id = client_id_for(user_id);
        if !self.store.revoke_client(&client_id).await? {
            return Err(AuthError::InvalidClient);
        }
        tracing::info!(client_id = %client_id, user_id, "Revoked client");
        Ok(())
    }

    /// The user's client metadata, if one has been created.
    pub async fn client_for_user(&self, user_id: i64) -> Result<Option<ClientRecord>, AuthError> {
        Ok(self.store.find_client_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;

    const NOW: i64 = 1_700_000_000;

    async fn issuer() -> OAuthIssuer {
        let store = MemoryCredentialStore::new();
        store.add_user(1, "alice").await;
        store.add_user(2, "bob").await;
        OAuthIssuer::new(
            Arc::new(store),
            SigningKey::generate().unwrap(),
            &OAuthConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid_secret() {
        let issuer = issuer().await;
        let creds = issuer.rotate_secret(1).await.unwrap();

        let err = issuer
            .issue_token(&creds.client_id, "wrong", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidSecret));
    }

    #[tokio::test]
    async fn test_unknown_client_is_invalid_client() {
        let issuer = issuer().await;
        let err = issuer
            .issue_token("ally_agent_user_99", "whatever", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient));
    }

    #[tokio::test]
    async fn test_authenticate_client_outcomes() {
        let issuer = issuer().await;
        let alice = issuer.rotate_secret(1).await.unwrap();
        let bob = issuer.rotate_secret(2).await.unwrap();
        issuer.revoke_client(2).await.unwrap();

        let client = issuer
            .authenticate_client(&alice.client_id, &alice.client_secret)
            .await
            .unwrap();
        assert_eq!(client.user_id, 1);

        assert!(matches!(
            issuer.authenticate_client(&alice.client_id, &bob.client_secret).await,
            Err(AuthError::InvalidSecret)
        ));
        assert!(matches!(
            issuer.authenticate_client(&bob.client_id, &bob.client_secret).await,
            Err(AuthError::InvalidClient)
        ));
        assert!(matches!(
            issuer.authenticate_client("ally_agent_user_99", "").await,
            Err(AuthError::InvalidClient)
        ));
    }

    #[tokio::test]
    async fn test_issued_token_expires_after_1800_seconds() {
        let issuer = issuer().await;
        let creds = issuer.rotate_secret(1).await.unwrap();

        let grant = issuer
            .issue_token_at(&creds.client_id, &creds.client_secret, None, NOW)
            .await
            .unwrap();
        assert_eq!(grant.token_type, "Bearer");
        assert_eq!(grant.expires_in, 1800);
        assert_eq!(grant.scope, "read:tools");

        let claims = issuer.verify_bearer_at(&grant.access_token, NOW).await.unwrap();
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 1800);
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.client_id, "ally_agent_user_1");
    }

    #[tokio::test]
    async fn test_requested_scope_is_kept() {
        let issuer = issuer().await;
        let creds = issuer.rotate_secret(1).await.unwrap();
        let grant = issuer
            .issue_token(&creds.client_id, &creds.client_secret, Some("read:tools profile"))
            .await
            .unwrap();
        assert_eq!(grant.scope, "read:tools profile");
    }

    #[tokio::test]
    async fn test_introspect_expired_is_inactive() {
        let issuer = issuer().await;
        let creds = issuer.rotate_secret(1).await.unwrap();
        let grant = issuer
            .issue_token_at(&creds.client_id, &creds.client_secret, None, NOW)
            .await
            .unwrap();

        let live = issuer.introspect_at(&grant.access_token, NOW + 60).await;
        assert!(live.active);
        assert_eq!(live.claims.as_ref().map(|c| c.sub), Some(1));

        let expired = issuer.introspect_at(&grant.access_token, NOW + 1800).await;
        assert_eq!(expired, Introspection::inactive());
    }

    #[tokio::test]
    async fn test_introspect_garbage_is_inactive() {
        let issuer = issuer().await;
        assert!(!issuer.introspect("definitely.not.a.token").await.active);
    }

    #[tokio::test]
    async fn test_rotation_invalidates_previous_secret() {
        let issuer = issuer().await;
        let first = issuer.rotate_secret(1).await.unwrap();
        let second = issuer.rotate_secret(1).await.unwrap();

        assert_eq!(first.client_id, second.client_id);
        assert_ne!(first.client_secret, second.client_secret);
        assert!(matches!(
            issuer.authenticate_client(&first.client_id, &first.client_secret).await,
            Err(AuthError::InvalidSecret)
        ));
        assert!(
            issuer
                .authenticate_client(&second.client_id, &second.client_secret)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_rotation_for_unknown_user() {
        let issuer = issuer().await;
        assert!(matches!(
            issuer.rotate_secret(404).await,
            Err(AuthError::UnknownUser { user_id: 404 })
        ));
    }

    #[tokio::test]
    async fn test_revoked_client_cannot_authenticate_and_tokens_die() {
        let issuer = issuer().await;
        let creds = issuer.rotate_secret(2).await.unwrap();
        let grant = issuer
            .issue_token(&creds.client_id, &creds.client_secret, None)
            .await
            .unwrap();
        assert!(issuer.introspect(&grant.access_token).await.active);

        issuer.revoke_client(2).await.unwrap();

        assert!(matches!(
            issuer.issue_token(&creds.client_id, &creds.client_secret, None).await,
            Err(AuthError::InvalidClient)
        ));
        assert!(!issuer.introspect(&grant.access_token).await.active);
        assert!(matches!(
            issuer.verify_bearer(&grant.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_rotation_reactivates_revoked_client() {
        let issuer = issuer().await;
        issuer.rotate_secret(1).await.unwrap();
        issuer.revoke_client(1).await.unwrap();

        let creds = issuer.rotate_secret(1).await.unwrap();
        assert!(
            issuer
                .issue_token(&creds.client_id, &creds.client_secret, None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unsupported_grant_type() {
        let issuer = issuer().await;
        assert!(matches!(
            issuer.grant("password", "a", "b", None).await,
            Err(AuthError::UnsupportedGrantType(g)) if g == "password"
        ));
    }

    #[tokio::test]
    async fn test_client_metadata_hides_secret() {
        let issuer = issuer().await;
        issuer.rotate_secret(1).await.unwrap();

        let client = issuer.client_for_user(1).await.unwrap().unwrap();
        assert_eq!(client.client_name, "alice OAuth Client");
        assert_eq!(client.grant_types, vec!["client_credentials"]);

        let json = serde_json::to_value(&client).unwrap();
        assert!(json.get("secret_hash").is_none());
        assert_eq!(json["client_id"], "ally_agent_user_1");
    }

    #[test]
    fn test_introspection_serialization() {
        assert_eq!(
            serde_json::to_value(Introspection::inactive()).unwrap(),
            serde_json::json!({"active": false})
        );

        let active = Introspection {
            active: true,
            claims: Some(AccessClaims::new(3, "ally_agent_user_3", "read:tools", NOW)),
        };
        assert_eq!(
            serde_json::to_value(active).unwrap(),
            serde_json::json!({
                "active": true,
                "sub": 3,
                "client_id": "ally_agent_user_3",
                "scope": "read:tools",
                "iat": NOW,
                "exp": NOW + 1800,
            })
        );
    }
}
