//! Chat orchestration for the storefront assistant and the admin chatbot.
//!
//! Both modes ground the model in a catalog snapshot. Admin mode
//! additionally instructs the model to emit a fenced JSON action block,
//! which is parsed into a typed [`AdminAction`] and executed before the
//! reply goes back to the client.

use mongodb::Database;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::chat::{ActionExecutor, parse_admin_action, strip_action_block};
use crate::db::{ProductRepository, products::ProductFilter};
use crate::error::{AppError, Result};
use crate::gemini::{Content, GeminiClient};

/// History turns beyond this are dropped from the prompt.
const MAX_HISTORY_TURNS: usize = 20;

/// One prior turn of the conversation, supplied by the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatTurn {
    /// `user` or `model`.
    pub role: String,
    pub text: String,
}

/// Reply returned to the client.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// True when an admin action was parsed and applied.
    pub action_taken: bool,
}

/// Drives a chat exchange end to end.
#[derive(Clone)]
pub struct ChatService {
    db: Database,
    gemini: Option<GeminiClient>,
}

impl ChatService {
    #[must_use]
    pub fn new(db: Database, gemini: Option<GeminiClient>) -> Self {
        Self { db, gemini }
    }

    /// Whether the chatbot is configured at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.gemini.is_some()
    }

    /// Answer one message.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ServiceUnavailable`] when no Gemini key is
    /// configured, and propagates model or storage failures.
    #[instrument(skip_all, fields(admin = is_admin, history_len = history.len()))]
    pub async fn respond(
        &self,
        message: &str,
        history: &[ChatTurn],
        is_admin: bool,
    ) -> Result<ChatReply> {
        let Some(gemini) = &self.gemini else {
            return Err(AppError::ServiceUnavailable(
                "chatbot is not configured".to_string(),
            ));
        };

        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest("message cannot be empty".to_string()));
        }

        let catalog = self.catalog_snapshot().await?;
        let system = if is_admin {
            admin_system_prompt(&catalog)
        } else {
            public_system_prompt(&catalog)
        };

        let contents = build_contents(history, message);
        let raw = gemini.generate(contents, Some(system)).await?;

        if !is_admin {
            return Ok(ChatReply {
                reply: raw,
                action_taken: false,
            });
        }

        match parse_admin_action(&raw) {
            None => Ok(ChatReply {
                reply: raw,
                action_taken: false,
            }),
            Some(action) => {
                let executor = ActionExecutor::new(&self.db);
                let spoken = strip_action_block(&raw);
                match executor.execute(action).await {
                    Ok(summary) => {
                        info!("admin chat action applied");
                        Ok(ChatReply {
                            reply: join_reply(&spoken, &summary),
                            action_taken: true,
                        })
                    }
                    Err(reason) => {
                        warn!(reason = %reason, "admin chat action failed");
                        Ok(ChatReply {
                            reply: join_reply(&spoken, &format!("[Action failed: {reason}]")),
                            action_taken: false,
                        })
                    }
                }
            }
        }
    }

    /// Compact catalog listing embedded in the system prompt.
    async fn catalog_snapshot(&self) -> Result<String> {
        let products = ProductRepository::new(&self.db)
            .list(&ProductFilter::default())
            .await?;
        let entries: Vec<serde_json::Value> = products
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "price": p.price,
                    "stock": p.stock,
                    "kind": p.kind,
                    "subcategory": p.subcategory,
                })
            })
            .collect();
        Ok(serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string()))
    }
}

/// Last `MAX_HISTORY_TURNS` turns plus the new message, in Gemini shape.
fn build_contents(history: &[ChatTurn], message: &str) -> Vec<Content> {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut contents: Vec<Content> = history[start..]
        .iter()
        .map(|turn| {
            if turn.role == "model" {
                Content::model(&turn.text)
            } else {
                Content::user(&turn.text)
            }
        })
        .collect();
    contents.push(Content::user(message));
    contents
}

fn join_reply(spoken: &str, summary: &str) -> String {
    if spoken.is_empty() {
        summary.to_string()
    } else {
        format!("{spoken}\n\n{summary}")
    }
}

fn public_system_prompt(catalog: &str) -> String {
    format!(
        "You are the shop assistant for Foxglove Farm & Floral, a small farm \
         selling handmade decor and small-batch food. Answer questions about \
         products, prices, and availability using only the catalog below. If \
         something is not in the catalog, say so. Keep replies short and warm.\n\n\
         Catalog:\n{catalog}"
    )
}

fn admin_system_prompt(catalog: &str) -> String {
    format!(
        "You are the store management assistant for Foxglove Farm & Floral. \
         You help the owner manage the catalog.\n\n\
         When the owner asks you to change the store, reply with a short \
         confirmation sentence followed by exactly one fenced block:\n\
         ```json\n{{\"action\": \"...\", ...}}\n```\n\
         Supported actions and their fields:\n\
         - create: name, description, price, kind (decor|food), stock, subcategory?, occasion?\n\
         - update: name, plus any of new_name, description, price, stock, kind, subcategory, occasion, collection_name, featured\n\
         - delete: name\n\
         - stats (no fields)\n\
         - low_stock: threshold? (default 5)\n\
         - out_of_stock (no fields)\n\
         - list_products: kind?\n\
         - add_photos / remove_photos: name, urls\n\
         - merge_products: names (two or more), group\n\
         - add_to_group: name, group\n\
         - bulk_update: filter (kind?, subcategory?, occasion?, collection_name?), set\n\
         - bulk_delete: filter (must not be empty)\n\
         - search: query\n\
         Emit the block only when the owner clearly asked for a change or a \
         report. For ordinary questions, answer in plain text using the \
         catalog below.\n\n\
         Catalog:\n{catalog}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, text: &str) -> ChatTurn {
        ChatTurn {
            role: role.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_contents_appends_new_message() {
        let history = vec![turn("user", "hi"), turn("model", "hello")];
        let contents = build_contents(&history, "do you have wreaths?");
        assert_eq!(contents.len(), 3);
        assert_eq!(contents.last().map(|c| c.parts[0].text.as_str()), Some("do you have wreaths?"));
    }

    #[test]
    fn test_build_contents_caps_history() {
        let history: Vec<ChatTurn> = (0..50).map(|i| turn("user", &format!("m{i}"))).collect();
        let contents = build_contents(&history, "latest");
        assert_eq!(contents.len(), MAX_HISTORY_TURNS + 1);
        assert_eq!(contents[0].parts[0].text, "m30");
    }

    #[test]
    fn test_join_reply_with_empty_spoken() {
        assert_eq!(join_reply("", "Done."), "Done.");
        assert_eq!(join_reply("Sure.", "Done."), "Sure.\n\nDone.");
    }

    #[test]
    fn test_prompts_embed_catalog() {
        let catalog = r#"[{"name":"Wreath"}]"#;
        assert!(public_system_prompt(catalog).contains(catalog));
        assert!(admin_system_prompt(catalog).contains(catalog));
        assert!(admin_system_prompt(catalog).contains("```json"));
    }
}
