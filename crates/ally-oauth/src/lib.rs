//! # ally-oauth
//!
//! Minimal OAuth2 client-credentials issuer.
//!
//! Each user owns at most one client, `ally_agent_user_<id>`, whose secret is
//! stored only as an Argon2 hash. Access tokens are Biscuit tokens signed with
//! an Ed25519 key and expire 1800 seconds after issuance. The SHA-256 of each
//! token is recorded so it can be revoked.
//!
//! ```ignore
//! let issuer = OAuthIssuer::new(store, SigningKey::from_config(&config.oauth)?, &config.oauth);
//! let creds = issuer.rotate_secret(user_id).await?;
//! let grant = issuer.issue_token(&creds.client_id, &creds.client_secret, None).await?;
//! let claims = issuer.verify_bearer(&grant.access_token).await?;
//! ```

pub mod error;
pub mod issuer;
pub mod keys;
pub mod secret;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use issuer::{CLIENT_CREDENTIALS, Introspection, IssuedCredentials, OAuthIssuer, TokenGrant};
pub use keys::SigningKey;
pub use store::{ClientRecord, ClientRegistration, CredentialStore, MemoryCredentialStore, TokenRecord};
pub use token::{ACCESS_TOKEN_TTL_SECS, AccessClaims};
