//! Background workers for the two external calls.
//!
//! Each worker runs on its own thread with its own tokio runtime and reports
//! back over an mpsc channel polled from the egui update loop. The UI never
//! blocks; the controller refuses new submissions while a call is in flight,
//! so at most one generation worker exists at a time.

use providers::gemini::GeminiClient;
use providers::google_auth::GoogleSignIn;
use shared::settings::{OAuthCredentials, ProviderAuth};
use std::sync::mpsc::Sender;

/// Result of one gateway exchange.
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub response: String,
    pub error: Option<String>,
}

/// Result of the interactive sign-in flow.
#[derive(Debug)]
pub struct SignInOutcome {
    pub credentials: Option<OAuthCredentials>,
    pub error: Option<String>,
}

pub fn run_generation(
    prompt: String,
    image: Option<String>,
    model: String,
    auth: ProviderAuth,
    tx: Sender<ExchangeOutcome>,
) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(ExchangeOutcome {
                response: String::new(),
                error: Some(format!("Failed to start async runtime: {}", e)),
            });
            return;
        }
    };

    let result = rt.block_on(async {
        let client = GeminiClient::from_auth(&model, &auth)?;
        client.generate(&prompt, image.as_deref()).await
    });

    let outcome = match result {
        Ok(response) => ExchangeOutcome {
            response,
            error: None,
        },
        Err(e) => ExchangeOutcome {
            response: String::new(),
            error: Some(e.to_string()),
        },
    };
    let _ = tx.send(outcome);
}

pub fn run_sign_in(client_id: String, client_secret: Option<String>, tx: Sender<SignInOutcome>) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(SignInOutcome {
                credentials: None,
                error: Some(format!("Failed to start async runtime: {}", e)),
            });
            return;
        }
    };

    let result = rt.block_on(async {
        let flow = GoogleSignIn::new(client_id, client_secret)?;
        flow.sign_in().await
    });

    let outcome = match result {
        Ok(credentials) => SignInOutcome {
            credentials: Some(credentials),
            error: None,
        },
        Err(e) => SignInOutcome {
            credentials: None,
            error: Some(e.to_string()),
        },
    };
    let _ = tx.send(outcome);
}
