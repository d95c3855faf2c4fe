//! Application services that sit between the HTTP routes and the
//! repositories and external APIs.

pub mod chat;
pub mod dedupe;
pub mod email;
pub mod firebase;

pub use chat::{ChatReply, ChatService, ChatTurn};
pub use email::{EmailError, EmailService};
pub use firebase::{AuthError, FirebaseUser, FirebaseVerifier, is_admin_email};
