use serde::{Deserialize, Serialize};

fn default_on_device_enabled() -> bool {
    true
}

fn default_remote_enabled() -> bool {
    false
}

fn default_api_url() -> String {
    "https://api-free.deepl.com/v2/translate".to_string()
}

fn default_provider_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_on_device_enabled")]
    pub on_device_enabled: bool,
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
    #[serde(default = "default_api_url")]
    pub remote_api_url: String,
    #[serde(default)]
    pub remote_api_key: String,
    /// Per-call timeout applied to on-device and remote providers
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            on_device_enabled: default_on_device_enabled(),
            remote_enabled: default_remote_enabled(),
            remote_api_url: default_api_url(),
            remote_api_key: String::new(),
            provider_timeout_ms: default_provider_timeout_ms(),
        }
    }
}
