//! `ally rotate-secret --user <id>` - issue a new client secret.

use ally_oauth::{OAuthIssuer, SigningKey};
use std::path::Path;
use std::sync::Arc;

pub async fn rotate(config_path: Option<&Path>, user_id: i64) -> anyhow::Result<()> {
    let (config, store) = super::open(config_path).await?;
    let user = store.get_user(user_id).await?;

    // Rotation never signs anything, so an ephemeral key is fine here.
    let key = SigningKey::from_config(&config.oauth)?;
    let issuer = OAuthIssuer::new(Arc::new(store), key, &config.oauth);
    let issued = issuer.rotate_secret(user_id).await?;

    println!("✔ New credentials for '{}':", user.name);
    println!("  client_id:     {}", issued.client_id);
    println!("  client_secret: {}", issued.client_secret);
    println!();
    println!("⚠️  The secret is shown only once and the previous one no longer works.");
    println!("Token endpoint: http://{}/oauth/token", config.server.bind);
    Ok(())
}
