//! Shared constants used across the application

use std::time::Duration;

/// Providers that can carry an API key, in template order.
pub const API_KEY_PROVIDERS: [&str; 15] = [
    "Anthropic",
    "OpenAI",
    "Google",
    "Groq",
    "HuggingFace",
    "OpenRouter",
    "Deepseek",
    "Mistral",
    "OpenAILike",
    "Together",
    "xAI",
    "Perplexity",
    "Cohere",
    "AzureOpenAI",
    "AmazonBedrock",
];

/// Endpoint overrides for self-hosted or proxy providers.
pub const BASE_URL_FIELDS: [&str; 4] = [
    "OPENAI_LIKE_API_BASE_URL",
    "LMSTUDIO_API_BASE_URL",
    "OLLAMA_API_BASE_URL",
    "TOGETHER_API_BASE_URL",
];

/// Key holding every imported provider key as one JSON object.
pub const CONSOLIDATED_API_KEYS_KEY: &str = "apiKeys";

/// The settings key kept in the local namespace instead of the key/value store.
pub const THEME_KEY: &str = "theme";

/// Settings captured from the key/value store by a snapshot export, in
/// document order. [`THEME_KEY`] is appended from the local namespace.
pub const SNAPSHOT_KEYS: [&str; 12] = [
    "providers",
    "isDebugEnabled",
    "isEventLogsEnabled",
    "isLocalModelsEnabled",
    "promptId",
    "isLatestBranch",
    "commitHash",
    "eventLogs",
    "selectedModel",
    "selectedProvider",
    "githubUsername",
    "githubToken",
];

/// Delay before subsystems re-initialize after new API keys land.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(1500);

/// Storage key name for a provider's individual API key entry.
pub fn api_key_name(provider: &str) -> String {
    format!("{provider}_API_KEY")
}
