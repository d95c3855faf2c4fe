//! Contact form route. Stores the submission as an unread message for the
//! admin inbox.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use foxglove_core::Email;

use crate::db::MessageRepository;
use crate::error::{AppError, Result};
use crate::models::MessageDoc;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// POST /api/contact
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let email = Email::parse(&form.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "name and message are required".to_string(),
        ));
    }

    let doc = MessageDoc {
        id: None,
        name: name.to_string(),
        email: email.normalized(),
        message: message.to_string(),
        read: false,
        created_at: chrono::Utc::now(),
    };
    MessageRepository::new(state.db()).create(&doc).await?;

    info!("contact message stored");
    Ok((StatusCode::CREATED, Json(ContactResponse { success: true })))
}
