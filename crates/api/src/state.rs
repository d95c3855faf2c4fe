//! Shared application state handed to every request handler.

use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::gemini::GeminiClient;
use crate::services::{ChatService, EmailService, FirebaseVerifier};
use crate::square::SquareClient;

/// Application state. Cheap to clone, everything behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    db: Database,
    verifier: FirebaseVerifier,
    chat: ChatService,
    square: Option<SquareClient>,
    email: Option<EmailService>,
}

impl AppState {
    /// Assemble state from configuration and a connected database handle.
    ///
    /// Square, Gemini, and SMTP are each optional; routes that need a
    /// missing one answer 503 instead of failing at startup.
    #[must_use]
    pub fn new(config: AppConfig, db: Database, email: Option<EmailService>) -> Self {
        let verifier = FirebaseVerifier::new(&config.firebase_project_id);
        let gemini = config.gemini.as_ref().map(GeminiClient::new);
        let square = config.square.as_ref().map(SquareClient::new);
        let chat = ChatService::new(db.clone(), gemini);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                verifier,
                chat,
                square,
                email,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    #[must_use]
    pub fn verifier(&self) -> &FirebaseVerifier {
        &self.inner.verifier
    }

    #[must_use]
    pub fn chat(&self) -> &ChatService {
        &self.inner.chat
    }

    #[must_use]
    pub fn square(&self) -> Option<&SquareClient> {
        self.inner.square.as_ref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Emails allowed to use admin endpoints, already lowercased.
    #[must_use]
    pub fn admin_emails(&self) -> &[String] {
        &self.inner.config.admin_emails
    }
}
