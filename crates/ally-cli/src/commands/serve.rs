//! `ally serve` - run the dashboard and API.

use ally_dashboard::AppState;
use ally_oauth::{OAuthIssuer, SigningKey};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, store) = super::open(config_path).await?;

    let purged = store.purge_expired_tokens(Utc::now().timestamp()).await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired access tokens");
    }

    let key = SigningKey::from_config(&config.oauth)?;
    let issuer = Arc::new(OAuthIssuer::new(Arc::new(store.clone()), key, &config.oauth));

    let addr = config.server.socket_addr()?;
    let state = AppState::new(config, store, issuer);
    ally_server::serve(state, addr).await
}
