use clap::Parser;
use yt_auth::Authenticator;

/// OAuth 2.0 helper tool for YouTube API authentication
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Client secrets configuration file
    #[arg(long, default_value = "cs.json")]
    secrets: String,

    /// Path to the OAuth token cache file
    #[arg(long, default_value = "request.token")]
    cache: String,

    /// OAuth scope to request
    #[arg(
        long,
        default_value = "https://www.googleapis.com/auth/youtube.force-ssl"
    )]
    scope: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let authenticator = Authenticator::new(&args.secrets, &args.cache, &args.scope)?;
    let token = authenticator.obtain_token().await?;

    eprintln!("\nToken cached at: {}", args.cache);
    eprintln!("Access token valid until Unix time {}", token.expires_at);

    Ok(())
}
