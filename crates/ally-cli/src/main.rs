use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ally", version, about = "Ally Agent tool manager")]
struct Cli {
    /// Path to the configuration file. Defaults to ally.toml.
    #[arg(long, global = true, env = "ALLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard, the OAuth endpoints and the tools API.
    Serve,

    /// Write the external tools document for a user's current selection.
    Generate {
        /// User id.
        #[arg(long)]
        user: i64,

        /// Output file. Defaults to generator.output_path from the config.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create or rotate a user's OAuth client secret and print it once.
    RotateSecret {
        /// User id.
        #[arg(long)]
        user: i64,
    },

    /// Generate a new token signing keypair.
    Keygen {
        /// Write private.key and public.key into this directory instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.cmd {
        Command::Serve => commands::serve::run(config).await?,
        Command::Generate { user, output } => {
            commands::generate::run(config, user, output.as_deref()).await?
        }
        Command::RotateSecret { user } => commands::credentials::rotate(config, user).await?,
        Command::Keygen { output } => commands::keys::generate(output.as_deref())?,
    }

    Ok(())
}
