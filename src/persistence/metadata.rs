use super::kv::KeyValueStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Key under which view preferences are stored
pub const META_KEY: &str = "meta";

/// View preferences stored in meta.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// "all" or a status label
    #[serde(default = "default_status_filter")]
    pub status_filter: String,
    #[serde(default)]
    pub tag_filter: String,
    #[serde(default = "default_show_details")]
    pub show_details: bool,
}

fn default_status_filter() -> String {
    "all".to_string()
}

fn default_show_details() -> bool {
    true
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            status_filter: default_status_filter(),
            tag_filter: String::new(),
            show_details: default_show_details(),
        }
    }
}

/// Load app metadata; absent or unreadable metadata yields defaults
pub fn load_metadata(kv: &dyn KeyValueStore) -> AppMetadata {
    let content = match kv.get(META_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => return AppMetadata::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read metadata, using defaults");
            return AppMetadata::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "malformed metadata, using defaults");
        AppMetadata::default()
    })
}

/// Save app metadata
pub fn save_metadata(kv: &mut dyn KeyValueStore, metadata: &AppMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    kv.set(META_KEY, &json)
}
