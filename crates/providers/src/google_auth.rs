//! Interactive Google sign-in for the header button.
//!
//! Opens the system browser to Google's consent page and waits for the
//! redirect on a loopback HTTP server. The credential is handed back to the
//! caller as-is; nothing else in the app consumes it.

use anyhow::{anyhow, Result};
use chrono::Utc;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use shared::settings::OAuthCredentials;
use std::time::{Duration, Instant};
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Ports tried for the loopback redirect, in order.
const CALLBACK_PORTS: [u16; 5] = [8765, 8766, 8767, 18765, 28765];

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const CALLBACK_PAGE: &str = "<html><body>\
    <h1>Sign-in complete!</h1>\
    <p>You can close this window and return to StudyAI.</p>\
    </body></html>";

pub struct GoogleSignIn {
    client: BasicClient,
    // Held for the lifetime of the flow so the redirect port stays ours.
    server: tiny_http::Server,
}

impl GoogleSignIn {
    pub fn new(client_id: String, client_secret: Option<String>) -> Result<Self> {
        let server = bind_callback_server()?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .ok_or_else(|| anyhow!("callback server has no IP address"))?;

        let client = BasicClient::new(
            ClientId::new(client_id),
            client_secret.map(ClientSecret::new),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(format!(
            "http://localhost:{}/callback",
            port
        ))?);

        Ok(Self { client, server })
    }

    /// Run the full popup flow: consent page in the browser, code on the
    /// loopback redirect, code-for-token exchange. Blocks (asynchronously) up
    /// to five minutes waiting for the user.
    pub async fn sign_in(&self) -> Result<OAuthCredentials> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in SCOPES {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf_token) = auth_request.url();

        tracing::info!("opening browser for Google sign-in");
        if let Err(e) = open::that(auth_url.as_str()) {
            tracing::warn!("could not open browser automatically: {}", e);
            tracing::warn!("visit manually: {}", auth_url);
        }

        let (code, state) = self.wait_for_callback()?;
        if state != *csrf_token.secret() {
            return Err(anyhow!("CSRF token mismatch in sign-in callback"));
        }

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await?;

        Ok(OAuthCredentials {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_at: token
                .expires_in()
                .map(|d| Utc::now().timestamp() + d.as_secs() as i64),
        })
    }

    /// Poll the loopback server until the redirect arrives or the flow times
    /// out. Replies with a small "you can close this" page either way.
    fn wait_for_callback(&self) -> Result<(String, String)> {
        let deadline = Instant::now() + CALLBACK_TIMEOUT;

        loop {
            let request = self
                .server
                .recv_timeout(Duration::from_millis(200))
                .map_err(|e| anyhow!("sign-in callback server failed: {}", e))?;

            let Some(request) = request else {
                if Instant::now() > deadline {
                    return Err(anyhow!("sign-in timed out after 5 minutes. Please try again."));
                }
                continue;
            };

            let url = Url::parse(&format!("http://localhost{}", request.url()))?;
            let query = |key: &str| {
                url.query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.to_string())
            };
            let code = query("code");
            let state = query("state");

            let mut response = tiny_http::Response::from_string(CALLBACK_PAGE);
            if let Ok(header) =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..])
            {
                response = response.with_header(header);
            }
            let _ = request.respond(response);

            match (code, state) {
                (Some(code), Some(state)) => return Ok((code, state)),
                // Favicon probes and the like; keep waiting for the real one.
                _ => continue,
            }
        }
    }
}

fn bind_callback_server() -> Result<tiny_http::Server> {
    for port in CALLBACK_PORTS {
        if let Ok(server) = tiny_http::Server::http(("127.0.0.1", port)) {
            return Ok(server);
        }
    }
    Err(anyhow!("could not bind sign-in callback server on any port"))
}
