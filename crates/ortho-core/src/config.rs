//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. `ortho-gateway.toml` configuration file
//! 3. Defaults
//!
//! Inside the configuration file, `${VAR_NAME}` is expanded from the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// WhatsApp Cloud API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhatsAppConfig {
    /// Cloud API bearer token
    pub token: String,

    /// Sender phone number id
    pub phone_id: String,

    /// Webhook verification secret
    pub verify_token: String,
}

/// AI assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_ai_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_ai_model(),
        }
    }
}

fn default_ai_model() -> String {
    "gpt-4".to_string()
}

/// Patient directory API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the patient directory REST API
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Bearer token for the directory API
    pub api_key: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            api_key: String::new(),
        }
    }
}

fn default_directory_url() -> String {
    "https://appsintranet.esculapiosis.com/ApiCampbell/api".to_string()
}

/// Zoom server-to-server OAuth credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ZoomConfig {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Google Calendar / Meet OAuth credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,

    /// Calendar to create Meet events on
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            calendar_id: default_calendar_id(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port for the webhook server
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_port() -> u16 {
    5000
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Path to a SQLite database. When unset, sessions are held in memory
    /// and lost on restart.
    pub db_path: Option<String>,
}

/// Main configuration for ortho-gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// WhatsApp Cloud API settings
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// AI assistant settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Patient directory settings
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Zoom credentials
    #[serde(default)]
    pub zoom: ZoomConfig,

    /// Google Meet credentials
    #[serde(default)]
    pub google: GoogleConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Session store settings
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` occurrences from the environment.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(c);
                    chars.next();
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` inside the file is expanded from the environment, and
    /// already-set environment variables take precedence over file values.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./ortho-gateway.toml` first, then falls back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("ortho-gateway.toml").exists() {
            return Self::from_toml_file("ortho-gateway.toml");
        }
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();

        if config.whatsapp.token.is_empty() {
            return Err(Error::Config("WHATSAPP_TOKEN not set".to_string()));
        }
        if config.whatsapp.phone_id.is_empty() {
            return Err(Error::Config("WHATSAPP_PHONE_ID not set".to_string()));
        }
        if config.whatsapp.verify_token.is_empty() {
            return Err(Error::Config("WHATSAPP_VERIFY_TOKEN not set".to_string()));
        }

        Ok(config)
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("WHATSAPP_TOKEN") {
            self.whatsapp.token = token;
        }
        if let Ok(phone_id) = std::env::var("WHATSAPP_PHONE_ID") {
            self.whatsapp.phone_id = phone_id;
        }
        if let Ok(verify_token) = std::env::var("WHATSAPP_VERIFY_TOKEN") {
            self.whatsapp.verify_token = verify_token;
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.ai.api_key = key;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.is_empty() {
                self.ai.model = model;
            }
        }

        if let Ok(url) = std::env::var("DIRECTORY_BASE_URL") {
            if !url.is_empty() {
                self.directory.base_url = url;
            }
        }
        if let Ok(key) = std::env::var("DIRECTORY_API_KEY") {
            self.directory.api_key = key;
        }

        if let Ok(id) = std::env::var("ZOOM_ACCOUNT_ID") {
            self.zoom.account_id = id;
        }
        if let Ok(id) = std::env::var("ZOOM_CLIENT_ID") {
            self.zoom.client_id = id;
        }
        if let Ok(secret) = std::env::var("ZOOM_CLIENT_SECRET") {
            self.zoom.client_secret = secret;
        }

        if let Ok(id) = std::env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = id;
        }
        if let Ok(secret) = std::env::var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = secret;
        }
        if let Ok(token) = std::env::var("GOOGLE_REFRESH_TOKEN") {
            self.google.refresh_token = token;
        }
        if let Ok(id) = std::env::var("GOOGLE_CALENDAR_ID") {
            if !id.is_empty() {
                self.google.calendar_id = id;
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(path) = std::env::var("SESSION_DB_PATH") {
            self.session.db_path = Some(path);
        }
    }
}
