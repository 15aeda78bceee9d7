//! Configuration file support

use iris_ai::Provider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "groq";
pub const DEFAULT_MODEL: &str = "llama3-groq-70b-8192-tool-use-preview";

/// Configuration for iris
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// Default provider (groq, openai, openrouter, ollama)
    pub provider: Option<String>,
    /// Override the provider's API base URL
    pub base_url: Option<String>,
    /// Replace the assistant's system preamble
    pub system_prompt: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    pub api_keys: ApiKeys,
    pub speech: SpeechSettings,
    pub listen: ListenSettings,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub groq: Option<String>,
    pub openai: Option<String>,
    pub openrouter: Option<String>,
}

/// Spoken output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    /// TTS program (`espeak`, `espeak-ng` or `say`)
    pub command: String,
    /// Words per minute
    pub rate: u32,
    /// 0.0 to 1.0
    pub volume: f32,
    /// `male` or `female`
    pub voice: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "espeak".to_string(),
            rate: iris_agent::speech::DEFAULT_RATE,
            volume: iris_agent::speech::DEFAULT_VOLUME,
            voice: "female".to_string(),
        }
    }
}

/// Voice capture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub timeout_secs: u64,
    pub phrase_limit_secs: u64,
    /// Voice activity detector aggressiveness, 0 (lenient) to 3 (strict)
    pub vad_mode: u8,
    pub transcription_model: String,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            timeout_secs: iris_agent::speech::LISTEN_TIMEOUT.as_secs(),
            phrase_limit_secs: iris_agent::speech::PHRASE_LIMIT.as_secs(),
            vad_mode: 2,
            transcription_model: "whisper-large-v3".to_string(),
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("iris")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("IRIS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// API key for a provider: config first, then the environment.
    ///
    /// Local providers with no key variable get an empty key.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_config = match provider {
            Provider::Groq => self.api_keys.groq.clone(),
            Provider::OpenAI => self.api_keys.openai.clone(),
            Provider::OpenRouter => self.api_keys.openrouter.clone(),
            Provider::Ollama | Provider::Custom => None,
        };
        if from_config.is_some() {
            return from_config;
        }

        match provider.api_key_env_var() {
            Some(var) => std::env::var(var).ok().filter(|key| !key.is_empty()),
            None => Some(String::new()),
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# iris configuration file
# Place at ~/.config/iris/config.toml (Linux) or set IRIS_CONFIG_PATH

# Default provider (groq, openai, openrouter, ollama)
provider = "groq"

# Default model
model = "llama3-groq-70b-8192-tool-use-preview"

# Override the provider's API base URL (optional)
# base_url = "http://localhost:11434/v1"

# Replace the assistant's system preamble (optional)
# system_prompt = "You are Iris, an advanced AI assistant. Respond concisely and helpfully."

# Use the terminal UI (set to false for a plain line console)
tui = true

# API keys (optional - GROQ_API_KEY, OPENAI_API_KEY and OPENROUTER_API_KEY also work)
[api_keys]
# groq = "gsk_..."
# openai = "sk-..."
# openrouter = "sk-or-..."

[speech]
enabled = true
# espeak, espeak-ng or say
command = "espeak"
rate = 150
volume = 0.8
voice = "female"

[listen]
timeout_secs = 5
phrase_limit_secs = 5
# 0 (lenient) to 3 (strict)
vad_mode = 2
transcription_model = "whisper-large-v3"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(config.provider.as_deref(), Some(DEFAULT_PROVIDER));
        assert_eq!(config.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(config.tui, Some(true));
        assert!(config.speech.enabled);
        assert_eq!(config.speech.rate, 150);
        assert_eq!(config.speech.volume, 0.8);
        assert_eq!(config.listen.timeout_secs, 5);
        assert_eq!(config.listen.vad_mode, 2);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::parse(
            r#"
            [speech]
            voice = "male"

            [api_keys]
            groq = "gsk_test"
            "#,
        )
        .unwrap();
        assert_eq!(config.speech.voice, "male");
        assert_eq!(config.speech.command, "espeak");
        assert_eq!(config.listen.transcription_model, "whisper-large-v3");
        assert_eq!(config.api_key(Provider::Groq).as_deref(), Some("gsk_test"));
    }

    #[test]
    fn test_local_providers_need_no_key() {
        let config = Config::default();
        assert_eq!(config.api_key(Provider::Ollama).as_deref(), Some(""));
    }

    #[test]
    fn test_mistyped_value_is_an_error() {
        assert!(Config::parse("tui = \"yes\"").is_err());
    }
}
