use std::env;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Image-assisted requests always target the multimodal variant, regardless
/// of the configured text model.
pub const VISION_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
}

impl Settings {
    /// Reads `OPENAI_API_KEY` and `OPENAI_MODEL`. A missing or empty key is
    /// not an error: it selects the deterministic formula-only mode.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        }
    }
}
