mod takeout;
mod transfer;

use clap::{Parser, ValueEnum};
use yt_api::YouTubeClient;
use yt_auth::Authenticator;

/// Scope needed to manage playlists and subscriptions.
const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Copies YouTube playlists and subscriptions from a Google Takeout export
/// into the authorized account. Can be used to move data between accounts
/// or to restore a backup.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Client secrets configuration file
    #[arg(long, default_value = "cs.json")]
    secrets: String,

    /// Token cache file
    #[arg(long, default_value = "request.token")]
    cache: String,

    /// What the export file contains
    #[arg(long = "type", value_enum, default_value = "playlist")]
    transfer_type: TransferType,

    /// Name of the playlist to be created and videos added to
    #[arg(long, default_value = "default")]
    listname: String,

    /// Takeout export file to transfer
    #[arg(long, required = true)]
    file: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransferType {
    Playlist,
    Subscription,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let authenticator = Authenticator::new(&args.secrets, &args.cache, YOUTUBE_SCOPE)?;
    let token = authenticator.obtain_token().await?;

    // The API address is overridable for testing against a local stub.
    let base_url = std::env::var("YOUTUBE_API_ADDRESS")
        .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
    let client = YouTubeClient::with_base_url(base_url, token.access_token.as_str());

    let raw = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read export file '{}': {}", args.file, e))?;

    println!("Starting transfer");
    match args.transfer_type {
        TransferType::Playlist => {
            let records = takeout::parse_playlist_items(&raw)
                .map_err(|e| format!("Unable to parse export JSON: {e}"))?;
            transfer::transfer_playlist(&client, &args.listname, &records).await?;
        }
        TransferType::Subscription => {
            let records = takeout::parse_subscriptions(&raw)
                .map_err(|e| format!("Unable to parse export JSON: {e}"))?;
            transfer::transfer_subscriptions(&client, &records).await?;
        }
    }

    Ok(())
}
