//! API key template export and API key import.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{parse_object, storable_value, SettingsError};
use crate::core::constants::{
    api_key_name, API_KEY_PROVIDERS, BASE_URL_FIELDS, CONSOLIDATED_API_KEYS_KEY,
};
use crate::store::KeyValueStore;

/// A blank key file: one empty entry per provider key, then the base URL
/// overrides.
pub fn api_key_template() -> Map<String, Value> {
    let mut template = Map::with_capacity(API_KEY_PROVIDERS.len() + BASE_URL_FIELDS.len());
    for provider in API_KEY_PROVIDERS {
        template.insert(api_key_name(provider), Value::String(String::new()));
    }
    for field in BASE_URL_FIELDS {
        template.insert(field.to_string(), Value::String(String::new()));
    }
    template
}

/// What an API key import wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApiKeyImport {
    /// Providers whose key was imported, in provider order.
    pub providers: Vec<String>,
    /// Base URL fields written.
    pub base_urls: Vec<String>,
}

impl ApiKeyImport {
    pub fn imported_count(&self) -> usize {
        self.providers.len()
    }
}

/// Import provider keys and base URL overrides from an uploaded key file.
///
/// Matched keys are stored twice: together as a JSON object under
/// [`CONSOLIDATED_API_KEYS_KEY`], and one by one under `<Provider>_API_KEY`
/// for readers that predate the consolidated entry. Base URLs are written
/// whether or not any provider key matched.
pub fn import_api_keys(
    text: &str,
    kv: &mut dyn KeyValueStore,
) -> Result<ApiKeyImport, SettingsError> {
    let document = parse_object(text)?;
    let mut outcome = ApiKeyImport::default();

    let mut consolidated = Map::new();
    for provider in API_KEY_PROVIDERS {
        if let Some(secret) = document.get(&api_key_name(provider)).and_then(storable_value) {
            consolidated.insert(provider.to_string(), Value::String(secret));
            outcome.providers.push(provider.to_string());
        }
    }

    if !consolidated.is_empty() {
        let blob = Value::Object(consolidated.clone()).to_string();
        store(kv, CONSOLIDATED_API_KEYS_KEY, &blob)?;
        for (provider, secret) in &consolidated {
            if let Value::String(secret) = secret {
                store(kv, &api_key_name(provider), secret)?;
            }
        }
        info!(count = consolidated.len(), "Imported provider API keys");
    }

    for field in BASE_URL_FIELDS {
        if let Some(url) = document.get(field).and_then(storable_value) {
            store(kv, field, &url)?;
            outcome.base_urls.push(field.to_string());
        }
    }
    debug!(base_urls = outcome.base_urls.len(), "Processed base URL overrides");

    Ok(outcome)
}

fn store(kv: &mut dyn KeyValueStore, key: &str, value: &str) -> Result<(), SettingsError> {
    kv.set(key, value).map_err(|source| SettingsError::Store {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;
    use serde_json::json;

    #[test]
    fn template_lists_every_provider_then_base_urls() {
        let template = api_key_template();
        assert_eq!(template.len(), 19);
        assert!(template.values().all(|v| v == ""));

        let keys: Vec<_> = template.keys().map(String::as_str).collect();
        assert_eq!(keys[0], "Anthropic_API_KEY");
        assert_eq!(keys[14], "AmazonBedrock_API_KEY");
        assert_eq!(&keys[15..], BASE_URL_FIELDS);
    }

    #[test]
    fn single_key_is_written_twice() {
        let mut template = api_key_template();
        template.insert("OpenAI_API_KEY".to_string(), json!("sk-x"));
        let mut kv = MemoryKeyValueStore::new();

        let outcome =
            import_api_keys(&Value::Object(template).to_string(), &mut kv).unwrap();

        assert_eq!(outcome.imported_count(), 1);
        assert!(outcome.base_urls.is_empty());
        assert_eq!(kv.get("OpenAI_API_KEY").unwrap().as_deref(), Some("sk-x"));
        let blob: Value =
            serde_json::from_str(&kv.get(CONSOLIDATED_API_KEYS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(blob, json!({"OpenAI": "sk-x"}));
        assert_eq!(kv.len(), 2);
    }

    #[test]
    fn consolidated_blob_follows_provider_order() {
        let text = json!({
            "Mistral_API_KEY": "m-1",
            "Anthropic_API_KEY": "a-1",
            "Groq_API_KEY": "g-1"
        })
        .to_string();
        let mut kv = MemoryKeyValueStore::new();

        let outcome = import_api_keys(&text, &mut kv).unwrap();
        assert_eq!(outcome.providers, ["Anthropic", "Groq", "Mistral"]);
        assert_eq!(
            kv.get(CONSOLIDATED_API_KEYS_KEY).unwrap().as_deref(),
            Some(r#"{"Anthropic":"a-1","Groq":"g-1","Mistral":"m-1"}"#)
        );
    }

    #[test]
    fn base_urls_written_even_without_keys() {
        let text = json!({
            "OpenAI_API_KEY": "",
            "OLLAMA_API_BASE_URL": "http://127.0.0.1:11434",
            "LMSTUDIO_API_BASE_URL": ""
        })
        .to_string();
        let mut kv = MemoryKeyValueStore::new();

        let outcome = import_api_keys(&text, &mut kv).unwrap();
        assert_eq!(outcome.imported_count(), 0);
        assert_eq!(outcome.base_urls, ["OLLAMA_API_BASE_URL"]);
        assert_eq!(
            kv.get("OLLAMA_API_BASE_URL").unwrap().as_deref(),
            Some("http://127.0.0.1:11434")
        );
        assert_eq!(kv.get(CONSOLIDATED_API_KEYS_KEY).unwrap(), None);
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn unknown_and_miscased_providers_are_ignored() {
        let text = json!({"OPENAI_API_KEY": "sk-upper", "Foo_API_KEY": "x"}).to_string();
        let mut kv = MemoryKeyValueStore::new();

        let outcome = import_api_keys(&text, &mut kv).unwrap();
        assert_eq!(outcome.imported_count(), 0);
        assert!(kv.is_empty());
    }

    #[test]
    fn invalid_json_is_rejected() {
        let mut kv = MemoryKeyValueStore::new();
        assert!(matches!(
            import_api_keys("not json", &mut kv),
            Err(SettingsError::Parse(_))
        ));
    }
}
