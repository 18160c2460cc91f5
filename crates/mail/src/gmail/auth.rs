//! Gmail OAuth2 authentication
//!
//! [`Session`] is what the fetcher trusts: an opaque bearer token plus the
//! scopes Google granted with it. [`GmailAuth`] produces sessions through
//! the OAuth2 authorization code flow, using a loopback HTTP listener to
//! receive the callback. HTTP is synchronous (ureq).

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;

use crate::error::FetchError;

/// Scope required to read mail
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Scopes that include read access
const READ_SUPERSET_SCOPES: &[&str] = &[
    "https://mail.google.com/",
    "https://www.googleapis.com/auth/gmail.modify",
];

/// An authenticated session handed to the fetcher
#[derive(Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    granted_scopes: Vec<String>,
}

impl Session {
    /// Session from a bearer token and Google's space-separated scope string
    pub fn new(access_token: impl Into<String>, scope: &str) -> Self {
        Self {
            access_token: Some(access_token.into()),
            granted_scopes: scope.split_whitespace().map(String::from).collect(),
        }
    }

    /// A session with no token; every fetch fails closed
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn granted_scopes(&self) -> &[String] {
        &self.granted_scopes
    }

    /// Check the session before any network call
    ///
    /// Returns the bearer token when it is present and every `required`
    /// scope is granted.
    pub fn authorize(&self, required: &[&str]) -> Result<&str, FetchError> {
        let token = match self.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            Some(_) => {
                return Err(FetchError::Authentication {
                    reason: "access token is empty".to_string(),
                });
            }
            None => {
                return Err(FetchError::Authentication {
                    reason: "no access token in session".to_string(),
                });
            }
        };

        let missing_scopes: Vec<String> = required
            .iter()
            .filter(|scope| !self.has_scope(scope))
            .map(|scope| scope.to_string())
            .collect();

        if !missing_scopes.is_empty() {
            return Err(FetchError::Authorization { missing_scopes });
        }

        Ok(token)
    }

    fn has_scope(&self, required: &str) -> bool {
        self.granted_scopes.iter().any(|granted| {
            granted == required
                || (required == GMAIL_READONLY_SCOPE
                    && READ_SUPERSET_SCOPES.contains(&granted.as_str()))
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("granted_scopes", &self.granted_scopes)
            .finish()
    }
}

/// OAuth2 configuration and token management for Gmail
pub struct GmailAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

/// Token persisted between runs
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    #[serde(default)]
    scope: String,
}

impl StoredToken {
    /// Still valid for at least five more minutes
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at > now + 300)
    }

    fn session(&self) -> Session {
        Session::new(&self.access_token, &self.scope)
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

impl GmailAuth {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Token cache filename in the Hermes config directory
    const TOKEN_FILE: &'static str = "gmail-tokens.json";

    /// Port range to try for the loopback callback listener
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Create a GmailAuth that caches tokens in the Hermes config directory
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        let token_path =
            config::config_path(Self::TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self::with_token_path(client_id, client_secret, token_path))
    }

    /// Create a GmailAuth that caches tokens at `token_path`
    pub fn with_token_path(client_id: String, client_secret: String, token_path: PathBuf) -> Self {
        Self {
            client_id,
            client_secret,
            token_path,
        }
    }

    /// Get a session, refreshing or running the browser flow as needed
    pub fn session(&self) -> Result<Session> {
        if let Some(session) = self.cached_session() {
            return Ok(session);
        }

        let token = self.authorization_code_auth()?;
        let stored = self.save_token_response(&token, None)?;
        Ok(stored.session())
    }

    /// Session from the token cache, refreshing if needed, without user interaction
    pub fn cached_session(&self) -> Option<Session> {
        let token = self.load_token().ok()?;
        if token.is_fresh(chrono::Utc::now().timestamp()) {
            return Some(token.session());
        }

        let refresh_token = token.refresh_token.as_deref()?;
        match self.refresh_access_token(refresh_token) {
            Ok(new_token) => match self.save_token_response(&new_token, Some(&token.scope)) {
                Ok(stored) => Some(stored.session()),
                Err(e) => {
                    warn!("Failed to store refreshed token: {:#}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Token refresh failed: {:#}", e);
                None
            }
        }
    }

    /// Whether a usable session exists without user interaction
    pub fn is_authenticated(&self) -> bool {
        self.cached_session().is_some()
    }

    /// Forget stored tokens
    pub fn logout(&self) -> Result<()> {
        config::remove_file(&self.token_path)
    }

    /// Authorization URL the user is sent to
    fn authorization_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(GMAIL_READONLY_SCOPE),
        )
    }

    /// Run the authorization code flow in the user's browser
    fn authorization_code_auth(&self) -> Result<TokenResponse> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);
        let auth_url = self.authorization_url(&redirect_uri);

        println!("\n=== Gmail Sign-in Required ===");
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("Failed to open browser: {}", e);
        }

        let code = self.wait_for_callback(listener)?;

        info!("Exchanging authorization code for tokens");
        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        info!("Gmail sign-in complete");
        Ok(token)
    }

    /// Bind the first free port in the callback range
    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                debug!("OAuth callback listener on port {}", port);
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )
    }

    /// Accept one callback request and extract the authorization code
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let callback = parse_callback(&request_line);

        let (status, body) = if matches!(callback, Ok(CallbackResult::Code(_))) {
            ("200 OK", "Signed in to Hermes Mail. You can close this window.")
        } else {
            ("400 Bad Request", "Sign-in failed. Please try again.")
        };

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        match callback? {
            CallbackResult::Code(code) => Ok(code),
            CallbackResult::Denied(error) => anyhow::bail!("OAuth error: {}", error),
        }
    }

    /// Exchange a refresh token for a new access token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh; keep the old one
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        config::load_json_file(&self.token_path)
    }

    /// Persist a token response; `previous_scope` is kept when Google omits `scope`
    fn save_token_response(
        &self,
        token: &TokenResponse,
        previous_scope: Option<&str>,
    ) -> Result<StoredToken> {
        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
            scope: token
                .scope
                .clone()
                .or_else(|| previous_scope.map(String::from))
                .unwrap_or_default(),
        };

        config::save_json_file(&self.token_path, &stored)?;
        Ok(stored)
    }
}

/// Outcome of the OAuth redirect
#[derive(Debug, PartialEq)]
enum CallbackResult {
    Code(String),
    Denied(String),
}

/// Parse the request line of the OAuth redirect, e.g.
/// `GET /?code=AUTH_CODE&scope=... HTTP/1.1`
fn parse_callback(request_line: &str) -> Result<CallbackResult> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed callback request")?;

    let url = url::Url::parse("http://localhost")
        .and_then(|base| base.join(target))
        .context("Malformed callback URL")?;

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (_, Some(error)) => Ok(CallbackResult::Denied(error)),
        (Some(code), None) => Ok(CallbackResult::Code(code)),
        (None, None) => anyhow::bail!("No authorization code received"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_without_token() {
        let err = Session::anonymous().authorize(&[GMAIL_READONLY_SCOPE]).unwrap_err();
        assert!(matches!(err, FetchError::Authentication { .. }));
    }

    #[test]
    fn test_authorize_blank_token() {
        let err = Session::new("  ", GMAIL_READONLY_SCOPE)
            .authorize(&[GMAIL_READONLY_SCOPE])
            .unwrap_err();
        assert!(matches!(err, FetchError::Authentication { .. }));
    }

    #[test]
    fn test_authorize_missing_scope() {
        let session = Session::new("token", "openid email");
        let err = session.authorize(&[GMAIL_READONLY_SCOPE]).unwrap_err();
        assert_eq!(
            err,
            FetchError::Authorization {
                missing_scopes: vec![GMAIL_READONLY_SCOPE.to_string()]
            }
        );
    }

    #[test]
    fn test_authorize_granted() {
        let session = Session::new("token", &format!("openid {}", GMAIL_READONLY_SCOPE));
        assert_eq!(session.authorize(&[GMAIL_READONLY_SCOPE]).unwrap(), "token");
        assert_eq!(session.granted_scopes().len(), 2);
    }

    #[test]
    fn test_authorize_superset_scope() {
        let session = Session::new("token", "https://mail.google.com/");
        assert!(session.authorize(&[GMAIL_READONLY_SCOPE]).is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("secret-token", GMAIL_READONLY_SCOPE);
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_parse_callback_code() {
        let result = parse_callback("GET /?code=4%2F0Abc&scope=x HTTP/1.1\r\n").unwrap();
        assert_eq!(result, CallbackResult::Code("4/0Abc".to_string()));
    }

    #[test]
    fn test_parse_callback_error() {
        let result = parse_callback("GET /?error=access_denied HTTP/1.1").unwrap();
        assert_eq!(result, CallbackResult::Denied("access_denied".to_string()));
    }

    #[test]
    fn test_parse_callback_without_code() {
        assert!(parse_callback("GET /favicon.ico HTTP/1.1").is_err());
        assert!(parse_callback("").is_err());
    }

    #[test]
    fn test_cached_session_uses_fresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let stored = StoredToken {
            access_token: "cached".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            scope: GMAIL_READONLY_SCOPE.to_string(),
        };
        config::save_json_file(&path, &stored).unwrap();

        let auth = GmailAuth::with_token_path("id".into(), "secret".into(), path);
        let session = auth.cached_session().unwrap();
        assert_eq!(session.authorize(&[GMAIL_READONLY_SCOPE]).unwrap(), "cached");
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_cached_session_expired_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let stored = StoredToken {
            access_token: "stale".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() - 10),
            scope: String::new(),
        };
        config::save_json_file(&path, &stored).unwrap();

        let auth = GmailAuth::with_token_path("id".into(), "secret".into(), path.clone());
        assert!(auth.cached_session().is_none());

        auth.logout().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_authorization_url_requests_readonly_scope() {
        let auth = GmailAuth::with_token_path("my id".into(), "secret".into(), PathBuf::new());
        let url = auth.authorization_url("http://localhost:8080");
        assert!(url.contains("client_id=my%20id"));
        assert!(url.contains(&*urlencoding::encode(GMAIL_READONLY_SCOPE)));
        assert!(url.contains("access_type=offline"));
    }
}
