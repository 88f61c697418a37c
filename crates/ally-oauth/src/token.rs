//! Access token minting and verification.
//!
//! Access tokens are Biscuit tokens whose authority block carries the claims
//! as facts:
//!
//! ```text
//! sub(42);
//! client_id("ally_agent_user_42");
//! scope("read:tools");
//! issued_at(1700000000);
//! expires_at(1700001800);
//! check if time($time), $time < 1700001800;
//! ```
//!
//! Verification supplies `time(now)`, so an expired token fails the check.

use crate::error::AuthError;
use crate::keys::SigningKey;
use biscuit_auth::builder::AuthorizerBuilder;
use biscuit_auth::macros::{check, fact};
use biscuit_auth::{Authorizer, Biscuit, PublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lifetime of every access token, in seconds.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 1800;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id the token acts for.
    pub sub: i64,
    pub client_id: String,
    /// Space-separated scopes.
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    /// Claims for a token issued at `now`.
    pub fn new(sub: i64, client_id: impl Into<String>, scope: impl Into<String>, now: i64) -> Self {
        Self {
            sub,
            client_id: client_id.into(),
            scope: scope.into(),
            iat: now,
            exp: now + ACCESS_TOKEN_TTL_SECS,
        }
    }

    pub fn has_scope(&self, required: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == required)
    }
}

/// SHA-256 of a token, hex encoded. This is what the credential store keeps.
pub fn token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Mint a signed token for `claims`.
pub fn mint(key: &SigningKey, claims: &AccessClaims) -> Result<String, AuthError> {
    let creation = |e: biscuit_auth::error::Token| AuthError::TokenCreationFailed(e.to_string());

    let biscuit = Biscuit::builder()
        .fact(fact!("sub({sub})", sub = claims.sub))
        .map_err(creation)?
        .fact(fact!("client_id({client_id})", client_id = claims.client_id.clone()))
        .map_err(creation)?
        .fact(fact!("scope({scope})", scope = claims.scope.clone()))
        .map_err(creation)?
        .fact(fact!("issued_at({iat})", iat = claims.iat))
        .map_err(creation)?
        .fact(fact!("expires_at({exp})", exp = claims.exp))
        .map_err(creation)?
        .check(check!(
            "check if time($time), $time < {expires_at}",
            expires_at = claims.exp
        ))
        .map_err(creation)?
        .build(key.key_pair())
        .map_err(creation)?;

    biscuit.to_base64().map_err(creation)
}

/// Verify a token's signature and expiry at `now` and read its claims.
///
/// Every failure collapses into [`AuthError::InvalidToken`].
pub fn verify_at(public_key: PublicKey, token: &str, now: i64) -> Result<AccessClaims, AuthError> {
    let biscuit = Biscuit::from_base64(token, public_key).map_err(|e| {
        tracing::debug!(error = %e, "Rejected unparsable access token");
        AuthError::InvalidToken
    })?;

    let mut authorizer = AuthorizerBuilder::new()
        .code(format!("time({now}); allow if true;"))
        .map_err(|_| AuthError::InvalidToken)?
        .build(&biscuit)
        .map_err(|_| AuthError::InvalidToken)?;

    authorizer.authorize().map_err(|e| {
        tracing::debug!(error = ?e, "Access token failed authorization");
        AuthError::InvalidToken
    })?;

    Ok(AccessClaims {
        sub: query_int(&mut authorizer, "sub")?,
        client_id: query_string(&mut authorizer, "client_id")?,
        scope: query_string(&mut authorizer, "scope")?,
        iat: query_int(&mut authorizer, "issued_at")?,
        exp: query_int(&mut authorizer, "expires_at")?,
    })
}

fn query_int(authorizer: &mut Authorizer, name: &str) -> Result<i64, AuthError> {
    let rule: biscuit_auth::builder::Rule = format!("data($x) <- {name}($x)")
        .parse()
        .map_err(|_: biscuit_auth::error::Token| AuthError::InvalidToken)?;
    let rows: Vec<(i64,)> = authorizer.query(rule).map_err(|_| AuthError::InvalidToken)?;
    rows.into_iter()
        .next()
        .map(|(v,)| v)
        .ok_or(AuthError::InvalidToken)
}

fn query_string(authorizer: &mut Authorizer, name: &str) -> Result<String, AuthError> {
    let rule: biscuit_auth::builder::Rule = format!("data($x) <- {name}($x)")
        .parse()
        .map_err(|_: biscuit_auth::error::Token| AuthError::InvalidToken)?;
    let rows: Vec<(String,)> = authorizer.query(rule).map_err(|_| AuthError::InvalidToken)?;
    rows.into_iter()
        .next()
        .map(|(v,)| v)
        .ok_or(AuthError::InvalidToken)
}
