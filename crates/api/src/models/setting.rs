//! Key/value settings documents.
//!
//! A schema-less configuration store: theme colors, palette presets, and
//! the background image URL all live here as arbitrary JSON values.

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// A setting document in the `settings` collection, keyed by `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingDoc {
    pub key: String,
    pub value: Bson,
}

/// JSON view of a setting.
#[derive(Debug, Clone, Serialize)]
pub struct SettingView {
    pub key: String,
    pub value: serde_json::Value,
}

impl From<SettingDoc> for SettingView {
    fn from(doc: SettingDoc) -> Self {
        Self {
            key: doc.key,
            value: doc.value.into_relaxed_extjson(),
        }
    }
}

/// Well-known setting keys.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const PRESETS: &str = "palette_presets";
    pub const BACKGROUND: &str = "background_image";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mongodb::bson::bson;

    #[test]
    fn test_view_converts_to_plain_json() {
        let doc = SettingDoc {
            key: keys::THEME.to_string(),
            value: bson!({ "primary": "#7a4a6f", "accent": "#d9b98c" }),
        };
        let view = SettingView::from(doc);
        assert_eq!(view.value["primary"], "#7a4a6f");
    }
}
