//! Application state and the non-blocking glue between the UI and the
//! background workers.

use crate::attachment::AttachmentPicker;
use crate::session::{LimitKind, SessionContext, SubmitResult};
use crate::workers::{self, ExchangeOutcome, SignInOutcome};
use eframe::egui;
use shared::settings::{AppSettings, OAuthCredentials};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver};
use uuid::Uuid;

pub struct AppState {
    pub settings: AppSettings,
    pub session: SessionContext,

    /// Current input text
    pub input_text: String,
    /// Encoded attachment waiting to be sent
    pub selected_image: Option<String>,
    /// Which quota notice is showing, if any
    pub limit_notice: Option<LimitKind>,

    /// Google credential once sign-in completed
    pub credentials: Option<OAuthCredentials>,
    pub sign_in_error: Option<String>,
    pub signing_in: bool,

    // Channels from the background workers
    pub exchange_rx: Option<Receiver<ExchangeOutcome>>,
    pub sign_in_rx: Option<Receiver<SignInOutcome>>,
    pub attachment: AttachmentPicker,

    /// Decoded bubble thumbnails keyed by message id
    pub image_textures: HashMap<Uuid, egui::TextureHandle>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            settings: crate::config::load_or_default(),
            session: SessionContext::default(),
            input_text: String::new(),
            selected_image: None,
            limit_notice: None,
            credentials: None,
            sign_in_error: None,
            signing_in: false,
            exchange_rx: None,
            sign_in_rx: None,
            attachment: AttachmentPicker::new(),
            image_textures: HashMap::new(),
        }
    }

    /// Anything in flight that needs the UI to keep polling?
    pub fn has_pending_work(&self) -> bool {
        self.exchange_rx.is_some() || self.sign_in_rx.is_some() || self.attachment.is_picking()
    }

    /// Submit the current input. On acceptance the gateway call starts on a
    /// worker thread and the input row is cleared.
    pub fn send_message(&mut self) {
        let text = self.input_text.clone();
        let image = self.selected_image.clone();

        match self.session.submit(&text, image.clone()) {
            SubmitResult::Ignored => {}
            SubmitResult::LimitReached(kind) => {
                self.limit_notice = Some(kind);
            }
            SubmitResult::Accepted => {
                self.input_text.clear();
                self.selected_image = None;

                let (tx, rx) = channel();
                self.exchange_rx = Some(rx);
                let model = self.settings.gemini_model.clone();
                let auth = self.settings.gemini_auth.clone();
                std::thread::spawn(move || workers::run_generation(text, image, model, auth, tx));
            }
        }
    }

    pub fn poll_exchange_result(&mut self) {
        let Some(rx) = &self.exchange_rx else {
            return;
        };
        if let Ok(outcome) = rx.try_recv() {
            self.exchange_rx = None;
            match outcome.error {
                Some(err) => {
                    // Diagnostics only; the user sees the fixed apology.
                    tracing::error!("response gateway failed: {}", err);
                    self.session.complete(Err(err));
                }
                None => self.session.complete(Ok(outcome.response)),
            }
        }
    }

    /// Open the image picker, unless the image quota is already spent.
    pub fn attach_image(&mut self) {
        if !self
            .session
            .usage()
            .can_send_image(&self.session.limits())
        {
            self.limit_notice = Some(LimitKind::Image);
            return;
        }
        self.attachment.open();
    }

    pub fn poll_attachment(&mut self) {
        if let Some(result) = self.attachment.try_take() {
            if let Some(encoded) = result {
                self.selected_image = Some(encoded);
            }
        }
    }

    /// Kick off the interactive Google sign-in flow.
    pub fn sign_in(&mut self) {
        if self.signing_in {
            return;
        }
        let Some(client_id) = self.settings.google_client_id.clone() else {
            self.sign_in_error =
                Some("Google sign-in is not configured (missing client id).".to_string());
            return;
        };
        self.signing_in = true;
        self.sign_in_error = None;

        let (tx, rx) = channel();
        self.sign_in_rx = Some(rx);
        let secret = self.settings.google_client_secret.clone();
        std::thread::spawn(move || workers::run_sign_in(client_id, secret, tx));
    }

    pub fn poll_sign_in_result(&mut self) {
        let Some(rx) = &self.sign_in_rx else {
            return;
        };
        if let Ok(outcome) = rx.try_recv() {
            self.sign_in_rx = None;
            self.signing_in = false;
            match outcome.credentials {
                Some(creds) => self.credentials = Some(creds),
                None => {
                    let err = outcome.error.unwrap_or_else(|| "sign-in failed".to_string());
                    tracing::warn!("sign-in failed: {}", err);
                    self.sign_in_error = Some(err);
                }
            }
        }
    }

    pub fn reset_limits(&mut self) {
        self.session.reset_usage();
        self.limit_notice = None;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.settings.user_profile.dark_mode = !self.settings.user_profile.dark_mode;
        if let Err(e) = crate::config::save(&self.settings) {
            tracing::warn!("could not save settings: {}", e);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
