use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::extract::Query;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Fixed loopback port the authorization redirect listener binds.
pub const OAUTH_CALLBACK_PORT: u16 = 8080;

/// How long the flow waits for the user to complete authorization.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

/// Endpoints used when the secrets file does not name its own.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read client secrets file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse client secrets file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("client secrets file must list at least one redirect URI")]
    MissingRedirectUri,
}

#[derive(Debug, Error)]
pub enum TokenCacheError {
    #[error("cannot read token cache '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse token cache '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot encode token cache: {0}")]
    Encode(serde_json::Error),
    #[error("cannot write token cache '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot bind OAuth callback listener on port {port}: {source}")]
    ListenerBind {
        port: u16,
        source: std::io::Error,
    },
    #[error("authorization was denied: {0}")]
    Denied(String),
    #[error("authorization sources closed without delivering a code")]
    NoCode,
    #[error("timed out waiting for authorization")]
    Timeout,
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token exchange failed (status {status}): {body}")]
    Exchange {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("token response missing '{0}'")]
    MalformedToken(&'static str),
}

/// One OAuth client entry in the client secrets file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub auth_uri: String,
    pub token_uri: String,
}

/// The client secrets file as issued by the API console, with `installed`
/// and `web` sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientSecrets {
    pub installed: ClientConfig,
    pub web: ClientConfig,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The `installed` credentials drive the flow; the `web` section only
    /// supplies a redirect URI when `installed` has none.
    pub fn into_oauth_config(self, scope: &str) -> Result<OAuthConfig, ConfigError> {
        let redirect_uri = self
            .installed
            .redirect_uris
            .first()
            .or_else(|| self.web.redirect_uris.first())
            .cloned()
            .ok_or(ConfigError::MissingRedirectUri)?;

        let auth_uri = if self.installed.auth_uri.is_empty() {
            GOOGLE_AUTH_URI.to_string()
        } else {
            self.installed.auth_uri
        };
        let token_uri = if self.installed.token_uri.is_empty() {
            GOOGLE_TOKEN_URI.to_string()
        } else {
            self.installed.token_uri
        };

        Ok(OAuthConfig {
            client_id: self.installed.client_id,
            client_secret: self.installed.client_secret,
            redirect_uri,
            auth_uri,
            token_uri,
            scope: scope.to_string(),
        })
    }
}

/// Resolved OAuth client configuration for one authorization flow.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub scope: String,
}

impl OAuthConfig {
    /// Build the user-facing authorization URL. Returns the URL and the
    /// PKCE verifier needed for the matching code exchange.
    pub fn authorization_url(&self) -> (String, String) {
        let (verifier, challenge) = generate_pkce();

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             code_challenge={}&code_challenge_method=S256&access_type=offline&prompt=consent",
            self.auth_uri,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(&challenge),
        );

        (auth_url, verifier)
    }
}

/// Generate PKCE verifier and challenge
fn generate_pkce() -> (String, String) {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use rand::Rng;
    use rand::distributions::Alphanumeric;
    use sha2::{Digest, Sha256};

    // Verifier must be 43-128 characters; sampled from a CSPRNG.
    let verifier: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();

    // Challenge: base64url(SHA256(verifier))
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let hash = hasher.finalize();
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    (verifier, challenge)
}

/// OAuth 2.0 token as cached on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token, when the provider issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiry time as Unix timestamp (seconds since epoch)
    pub expires_at: u64,
}

impl OAuthToken {
    /// True when the token is expired or expires within the next minute.
    pub fn is_expired(&self) -> bool {
        unix_now() + EXPIRY_SKEW_SECS >= self.expires_at
    }

    pub fn load_from_file(path: &Path) -> Result<Self, TokenCacheError> {
        let content = std::fs::read_to_string(path).map_err(|source| TokenCacheError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| TokenCacheError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist to disk, owner read/write only on Unix-like systems.
    pub fn save_to_file(&self, path: &Path) -> Result<(), TokenCacheError> {
        let content = serde_json::to_string_pretty(self).map_err(TokenCacheError::Encode)?;

        std::fs::write(path, content).map_err(|source| TokenCacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, permissions).map_err(|source| {
                TokenCacheError::Write {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        }

        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

type CallbackResult = Result<String, String>;

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Receives the single authorization redirect from the provider.
pub struct CallbackListener {
    rx: mpsc::Receiver<CallbackResult>,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
    addr: std::net::SocketAddr,
}

impl CallbackListener {
    /// Bind the loopback listener. The route is path-agnostic, so whatever
    /// redirect path is registered with the provider is accepted.
    pub async fn bind(port: u16) -> Result<Self, AuthError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|source| AuthError::ListenerBind { port, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| AuthError::ListenerBind { port, source })?;

        // Capacity 1: exactly one redirect is honored, later ones are dropped.
        let (tx, rx) = mpsc::channel::<CallbackResult>(1);

        let callback_handler = move |Query(params): Query<CallbackParams>| {
            let tx = tx.clone();
            async move {
                if let Some(error) = params.error {
                    let _ = tx.try_send(Err(error.clone()));
                    return Html(format!(
                        "<html><body><h1>Authorization Failed</h1><p>Error: {error}</p>\
                         <p>You can close this window.</p></body></html>"
                    ));
                }

                match params.code {
                    Some(code) => {
                        let _ = tx.try_send(Ok(code));
                        Html(
                            "<html><body><h1>Authorization Successful!</h1>\
                             <p>You can close this window and return to the application.</p>\
                             </body></html>"
                                .to_string(),
                        )
                    }
                    None => Html(
                        "<html><body><h1>Authorization Failed</h1>\
                         <p>No code received</p></body></html>"
                            .to_string(),
                    ),
                }
            }
        };

        let app = Router::new().fallback(callback_handler);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        let task = tokio::spawn(async move {
            server.await.ok();
        });

        Ok(Self {
            rx,
            shutdown: Some(shutdown_tx),
            task,
            addr,
        })
    }

    /// Local address the listener is bound to.
    pub fn addr(&self) -> std::net::SocketAddr {
        self.addr
    }

    /// Wait for an authorization code from whichever source responds first:
    /// the redirect listener or a code pasted on stdin. The timeout bounds
    /// the whole wait.
    pub async fn wait_for_code(&mut self, timeout: Duration) -> Result<String, AuthError> {
        match tokio::time::timeout(timeout, self.race_sources()).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout),
        }
    }

    async fn race_sources(&mut self) -> Result<String, AuthError> {
        let mut stdin_rx = spawn_stdin_reader();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                received = self.rx.recv() => {
                    return match received {
                        Some(Ok(code)) => Ok(code),
                        Some(Err(error)) => Err(AuthError::Denied(error)),
                        None => Err(AuthError::NoCode),
                    };
                }
                line = stdin_rx.recv(), if stdin_open => {
                    match line {
                        Some(line) if !line.trim().is_empty() => {
                            return Ok(line.trim().to_string());
                        }
                        Some(_) => {}
                        None => stdin_open = false,
                    }
                }
            }
        }
    }

    /// Shut the server down gracefully so the confirmation page flushes
    /// before the socket closes.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = tokio::time::timeout(Duration::from_secs(1), self.task).await;
    }
}

/// Reads pasted codes on a plain thread; a console read blocked inside the
/// tokio blocking pool would stall runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        use std::io::BufRead;
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Exchange an authorization code for tokens at the configured endpoint.
pub async fn exchange_code(
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<OAuthToken, AuthError> {
    eprintln!("Exchanging authorization code for tokens...");

    let client = reqwest::Client::new();
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let response = client.post(&config.token_uri).form(&params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Exchange { status, body });
    }

    let payload: serde_json::Value = response.json().await?;

    let access_token = payload
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or(AuthError::MalformedToken("access_token"))?
        .to_string();
    let refresh_token = payload
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let expires_in = payload
        .get("expires_in")
        .and_then(|v| v.as_u64())
        .ok_or(AuthError::MalformedToken("expires_in"))?;
    let token_type = payload
        .get("token_type")
        .and_then(|v| v.as_str())
        .unwrap_or("Bearer")
        .to_string();

    eprintln!("Successfully obtained OAuth tokens");

    Ok(OAuthToken {
        access_token,
        refresh_token,
        token_type,
        expires_at: unix_now() + expires_in,
    })
}

/// Runs the credential side of a transfer: the cached token when still
/// valid, the interactive three-legged flow otherwise.
pub struct Authenticator {
    config: OAuthConfig,
    cache_path: PathBuf,
}

impl Authenticator {
    pub fn new(
        secrets_path: impl AsRef<Path>,
        cache_path: impl AsRef<Path>,
        scope: &str,
    ) -> Result<Self, ConfigError> {
        let secrets = ClientSecrets::load(secrets_path.as_ref())?;
        Ok(Self {
            config: secrets.into_oauth_config(scope)?,
            cache_path: cache_path.as_ref().to_path_buf(),
        })
    }

    /// The cached token, only when it exists and has not expired.
    pub fn cached_token(&self) -> Option<OAuthToken> {
        match OAuthToken::load_from_file(&self.cache_path) {
            Ok(token) if !token.is_expired() => Some(token),
            Ok(_) => {
                eprintln!("Cached token has expired; authorization required.");
                None
            }
            Err(_) => None,
        }
    }

    /// Resolve a usable token: the cache when valid, otherwise the full
    /// authorization flow. A fresh token is written back to the cache; a
    /// failed write is reported but never fatal.
    pub async fn obtain_token(&self) -> Result<OAuthToken, AuthError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let token = self.run_auth_flow().await?;

        if let Err(err) = token.save_to_file(&self.cache_path) {
            eprintln!("Warning: {err}; continuing with the in-memory token.");
        }

        Ok(token)
    }

    async fn run_auth_flow(&self) -> Result<OAuthToken, AuthError> {
        let mut listener = CallbackListener::bind(OAUTH_CALLBACK_PORT).await?;
        let (auth_url, verifier) = self.config.authorization_url();

        match open::that(&auth_url) {
            Ok(()) => eprintln!(
                "Your browser has been opened to an authorization URL. \
                 This program will resume once authorization has been provided."
            ),
            Err(_) => eprintln!(
                "Could not launch a browser. Visit the URL below to authorize; \
                 this program will pause until the site is visited."
            ),
        }
        eprintln!("\n{auth_url}\n");
        eprintln!("Waiting for the redirect (or paste the code here):");

        let waited = listener.wait_for_code(AUTH_TIMEOUT).await;
        listener.close().await;
        let code = waited?;

        exchange_code(&self.config, &code, &verifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_secrets(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("cs.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn test_config(base: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-1".into(),
            client_secret: "secret-1".into(),
            redirect_uri: "http://localhost:8080/".into(),
            auth_uri: format!("{base}/auth"),
            token_uri: format!("{base}/token"),
            scope: "https://www.googleapis.com/auth/youtube.force-ssl".into(),
        }
    }

    #[test]
    fn secrets_prefer_installed_redirect_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(
            &dir,
            r#"{
                "installed": {
                    "client_id": "id",
                    "client_secret": "secret",
                    "redirect_uris": ["http://localhost:8080/"],
                    "auth_uri": "https://auth.example/o",
                    "token_uri": "https://token.example/t"
                },
                "web": {"redirect_uris": ["http://web.example/cb"]}
            }"#,
        );

        let config = ClientSecrets::load(&path)
            .unwrap()
            .into_oauth_config("scope")
            .unwrap();
        assert_eq!(config.redirect_uri, "http://localhost:8080/");
        assert_eq!(config.client_id, "id");
        assert_eq!(config.auth_uri, "https://auth.example/o");
        assert_eq!(config.token_uri, "https://token.example/t");
    }

    #[test]
    fn secrets_fall_back_to_web_redirect_uri_and_default_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(
            &dir,
            r#"{
                "installed": {"client_id": "id", "client_secret": "secret"},
                "web": {"redirect_uris": ["http://web.example/cb"]}
            }"#,
        );

        let config = ClientSecrets::load(&path)
            .unwrap()
            .into_oauth_config("scope")
            .unwrap();
        assert_eq!(config.redirect_uri, "http://web.example/cb");
        assert_eq!(config.auth_uri, GOOGLE_AUTH_URI);
        assert_eq!(config.token_uri, GOOGLE_TOKEN_URI);
    }

    #[test]
    fn secrets_without_any_redirect_uri_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(&dir, r#"{"installed": {"client_id": "id"}}"#);

        let err = ClientSecrets::load(&path)
            .unwrap()
            .into_oauth_config("scope")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRedirectUri));
    }

    #[test]
    fn expired_token_is_detected() {
        let expired = OAuthToken {
            access_token: "a".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: unix_now().saturating_sub(10),
        };
        assert!(expired.is_expired());

        let fresh = OAuthToken {
            expires_at: unix_now() + 3600,
            ..expired.clone()
        };
        assert!(!fresh.is_expired());
    }

    #[test]
    fn token_expiring_within_skew_counts_as_expired() {
        let token = OAuthToken {
            access_token: "a".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: unix_now() + 30,
        };
        assert!(token.is_expired());
    }

    #[test]
    fn token_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.token");

        let token = OAuthToken {
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            token_type: "Bearer".into(),
            expires_at: unix_now() + 3600,
        };
        token.save_to_file(&path).unwrap();

        let loaded = OAuthToken::load_from_file(&path).unwrap();
        assert_eq!(loaded.access_token, "at");
        assert_eq!(loaded.refresh_token.as_deref(), Some("rt"));
        assert_eq!(loaded.expires_at, token.expires_at);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn cached_token_is_ignored_when_expired() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = write_secrets(
            &dir,
            r#"{"installed": {"client_id": "id", "client_secret": "s",
                "redirect_uris": ["http://localhost:8080/"]}}"#,
        );
        let cache = dir.path().join("request.token");
        let authenticator = Authenticator::new(&secrets, &cache, "scope").unwrap();

        // No cache file yet.
        assert!(authenticator.cached_token().is_none());

        let expired = OAuthToken {
            access_token: "stale".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: unix_now().saturating_sub(1),
        };
        expired.save_to_file(&cache).unwrap();
        assert!(authenticator.cached_token().is_none());

        let valid = OAuthToken {
            access_token: "live".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: unix_now() + 3600,
        };
        valid.save_to_file(&cache).unwrap();
        assert_eq!(
            authenticator.cached_token().map(|t| t.access_token),
            Some("live".to_string())
        );
    }

    #[test]
    fn authorization_url_carries_client_and_challenge() {
        let config = test_config("https://example.test");
        let (url, verifier) = config.authorization_url();

        assert!(url.starts_with("https://example.test/auth?"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains(&format!(
            "redirect_uri={}",
            urlencoding::encode(&config.redirect_uri)
        )));
        assert_eq!(verifier.len(), 64);
    }

    #[tokio::test]
    async fn exchange_code_parses_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("code_verifier=ver"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let token = exchange_code(&config, "abc", "ver").await.unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        assert!(token.expires_at > unix_now());
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn exchange_code_tolerates_missing_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "expires_in": 600
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let token = exchange_code(&config, "abc", "ver").await.unwrap();
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.token_type, "Bearer");
    }

    #[tokio::test]
    async fn exchange_code_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let err = exchange_code(&config, "bad", "ver").await.unwrap_err();
        match err {
            AuthError::Exchange { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "invalid_grant");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn callback_listener_receives_code() {
        let mut listener = CallbackListener::bind(0).await.unwrap();
        let addr = listener.addr();

        tokio::spawn(async move {
            // Redirect paths vary by provider registration; any path works.
            reqwest::get(format!("http://{addr}/oauth2callback?code=abc123"))
                .await
                .ok();
        });

        let code = listener
            .wait_for_code(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(code, "abc123");
        listener.close().await;
    }

    #[tokio::test]
    async fn callback_listener_reports_denial() {
        let mut listener = CallbackListener::bind(0).await.unwrap();
        let addr = listener.addr();

        tokio::spawn(async move {
            reqwest::get(format!("http://{addr}/?error=access_denied"))
                .await
                .ok();
        });

        let err = listener
            .wait_for_code(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Denied(reason) if reason == "access_denied"));
        listener.close().await;
    }

    #[tokio::test]
    async fn wait_for_code_times_out() {
        let mut listener = CallbackListener::bind(0).await.unwrap();
        let err = listener
            .wait_for_code(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Timeout));
        listener.close().await;
    }
}
