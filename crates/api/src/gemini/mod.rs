//! Gemini API client for the shop chatbot.

pub mod client;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::{Content, GenerateRequest, GenerateResponse, Part};
