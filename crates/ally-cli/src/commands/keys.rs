//! `ally keygen` - generate a token signing keypair.

use ally_core::OAuthConfig;
use ally_oauth::SigningKey;
use std::fs;
use std::path::Path;

/// Generate a new Ed25519 keypair for access tokens.
pub fn generate(output: Option<&Path>) -> anyhow::Result<()> {
    let key = SigningKey::generate()?;

    if let Some(output_dir) = output {
        fs::create_dir_all(output_dir)?;

        let private_path = output_dir.join("private.key");
        let public_path = output_dir.join("public.key");

        fs::write(&private_path, key.private_key_hex())?;
        fs::write(&public_path, key.public_key_hex())?;

        println!("✔ Generated signing keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("Set oauth.signing_key_file = \"{}\" in ally.toml", private_path.display());
    } else {
        println!("Private key (keep secure!):");
        println!("{}", key.private_key_hex());
        println!();
        println!("Public key:");
        println!("{}", key.public_key_hex());
        println!();
        println!("export {}=<private key>", OAuthConfig::default().signing_key_env);
    }

    Ok(())
}
