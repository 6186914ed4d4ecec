use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Fastembed,
    Openai,
    Hashed,
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_api_key")]
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
}

fn default_api_key() -> String {
    // Local OpenAI-compatible runtimes accept any non-empty key
    "ollama".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_chat_model() -> String {
    "llama3.2".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_embedding_dimensions() -> u32 {
    1536
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: default_api_key(),
            openai_base_url: default_base_url(),
            chat_model: default_chat_model(),
            data_dir: default_data_dir(),
            upload_dir: default_upload_dir(),
            http_port: default_http_port(),
            embedding_backend: EmbeddingBackend::default(),
            embedding_model: None,
            embedding_dimensions: default_embedding_dimensions(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_runtime() {
        let config = AppConfig::default();
        assert_eq!(config.openai_base_url, "http://localhost:11434/v1");
        assert_eq!(config.chat_model, "llama3.2");
        assert_eq!(config.embedding_backend, EmbeddingBackend::Fastembed);
        assert_eq!(config.http_port, 3000);
    }

    #[test]
    fn backend_deserializes_lowercase() {
        let backend: EmbeddingBackend = serde_json::from_str("\"hashed\"").unwrap();
        assert_eq!(backend, EmbeddingBackend::Hashed);
    }
}
