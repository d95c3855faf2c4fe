//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (Mongo ping)
//!
//! # Catalog (public)
//! GET  /api/products                - Listing with filters
//! GET  /api/products/{id}           - Product detail
//! GET  /api/reviews?product_id=...  - Reviews for a product
//! GET  /api/settings/theme          - Theme colors
//! GET  /api/settings/presets        - Palette presets
//! GET  /api/settings/background     - Background image
//! GET  /api/chatbot/status          - Chatbot availability
//!
//! # Public writes (strict rate limit)
//! POST /api/contact                 - Contact form
//! POST /api/payments/square         - Checkout
//! POST /api/chatbot/message         - Chat (admin token => management mode)
//!
//! # User writes
//! POST /api/reviews                 - Review (signed-in user)
//!
//! # Admin (Firebase bearer + allowlist)
//! POST   /api/products              - Create product
//! PUT    /api/products/{id}         - Update product
//! DELETE /api/products/{id}         - Delete product
//! POST   /api/products/batch        - Batch import with dedupe
//! PUT    /api/products/group        - Merge/unmerge a display group
//! POST   /api/products/{id}/images  - Multipart image upload
//! GET    /api/orders                - Order listing
//! PUT    /api/orders/{id}/status    - Fulfillment status
//! GET    /api/messages              - Contact inbox
//! PUT    /api/messages/{id}/read    - Mark message read
//! DELETE /api/messages/{id}         - Delete message
//! DELETE /api/reviews/{id}          - Moderate a review
//! PUT    /api/settings/*            - Update settings
//! GET    /api/admin/check           - Admin identity check
//! ```

pub mod admin;
pub mod chatbot;
pub mod contact;
pub mod health;
pub mod messages;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod settings;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::warn;

use crate::middleware::{api_rate_limiter, strict_rate_limiter};
use crate::state::AppState;

/// Routes with the strict per-IP limiter: public writes and anything that
/// calls a paid upstream.
fn limited_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::submit_contact))
        .route("/api/payments/square", post(payments::charge))
        .route("/api/chatbot/message", post(chatbot::send_message))
        .layer(strict_rate_limiter())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route("/batch", post(products::batch_import))
        .route("/group", put(products::set_product_group))
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/images", post(products::upload_images))
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/theme",
            get(settings::get_theme).put(settings::put_theme),
        )
        .route(
            "/presets",
            get(settings::get_presets).put(settings::put_presets),
        )
        .route(
            "/background",
            get(settings::get_background).put(settings::put_background),
        )
}

/// Everything under the relaxed API limiter.
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .route(
            "/api/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/api/reviews/{id}", delete(reviews::delete_review))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/{id}/status", put(orders::update_order_status))
        .route("/api/messages", get(messages::list_messages))
        .route("/api/messages/{id}/read", put(messages::mark_read))
        .route("/api/messages/{id}", delete(messages::delete_message))
        .nest("/api/settings", settings_routes())
        .route("/api/admin/check", get(admin::check))
        .route("/api/chatbot/status", get(chatbot::status))
        .layer(api_rate_limiter())
}

/// Create the full application router.
pub fn routes(state: &AppState) -> Router<AppState> {
    let uploads_dir = state.config().uploads_dir.clone();

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .merge(api_routes())
        .merge(limited_routes())
        .nest_service("/admin/uploads", ServeDir::new(uploads_dir))
        .layer(cors_layer(&state.config().cors_origins))
}

/// CORS for the static frontend. Unparseable origins are skipped with a
/// warning rather than failing startup.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
