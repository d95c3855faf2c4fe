//! Chatbot admin-action pipeline.
//!
//! The model's free-text reply may carry at most one fenced ```json block.
//! That block is deserialized into the typed [`AdminAction`] contract
//! before anything touches the database; unknown actions, wrong field
//! types, and out-of-range values all fail closed. Parsing and execution
//! failures degrade to text appended to the chat reply, never HTTP errors.

pub mod actions;
pub mod executor;

pub use actions::{parse_admin_action, strip_action_block, AdminAction, BulkFilter, ProductPatch};
pub use executor::ActionExecutor;
