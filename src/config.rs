use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub discord: DiscordConfig,

    pub gemini: GeminiConfig,

    pub serpapi: SerpApiConfig,

    pub server: ServerConfig,

    pub scheduler: SchedulerConfig,

    pub session: SessionConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub bot_token: String,

    pub app_id: String,

    /// Channel the daily scout report is posted to.
    pub channel_id: String,

    /// Hex-encoded Ed25519 key used to verify interaction requests.
    pub public_key: String,

    /// Overrides the Discord REST endpoint.
    pub api_base_url: Option<String>,

    pub request_timeout_seconds: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            app_id: String::new(),
            channel_id: String::new(),
            public_key: String::new(),
            api_base_url: None,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,

    pub model: String,

    pub base_url: Option<String>,

    pub request_timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiConfig {
    pub api_key: String,

    pub base_url: Option<String>,

    pub request_timeout_seconds: u64,

    /// Minimum spacing between the daily topic lookups (default: 1200)
    pub query_interval_ms: u64,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            request_timeout_seconds: 30,
            query_interval_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run the daily scout in-process. Disabled when an external cron hits `/api/scout`.
    pub enabled: bool,

    pub cron_expression: Option<String>,

    pub session_sweep_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron_expression: Some("0 0 14 * * *".to_string()),
            session_sweep_cron: "0 */5 * * * *".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_seconds: 5 * 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "soundswap".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Bearer token required on `/api/scout` when set.
    pub cron_secret: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = Self::default();
        let mut loaded = false;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Self::load_from_path(path)?;
                loaded = true;
                break;
            }
        }

        if !loaded {
            info!("No config file found, using defaults");
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overlays secrets from the process environment; non-empty values win over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = v;
        }
        if let Some(v) = get("DISCORD_APP_ID") {
            self.discord.app_id = v;
        }
        if let Some(v) = get("DISCORD_CHANNEL_ID") {
            self.discord.channel_id = v;
        }
        if let Some(v) = get("DISCORD_PUBLIC_KEY") {
            self.discord.public_key = v;
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini.api_key = v;
        }
        if let Some(v) = get("SERPAPI_KEY") {
            self.serpapi.api_key = v;
        }
        if let Some(v) = get("CRON_SECRET") {
            self.security.cron_secret = Some(v);
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("soundswap").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".soundswap").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Checks only what trend lookups need.
    pub fn validate_search(&self) -> Result<()> {
        if self.serpapi.api_key.trim().is_empty() {
            anyhow::bail!("SERPAPI_KEY is not set");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_search()?;

        let required = [
            ("DISCORD_BOT_TOKEN", &self.discord.bot_token),
            ("DISCORD_APP_ID", &self.discord.app_id),
            ("DISCORD_CHANNEL_ID", &self.discord.channel_id),
            ("DISCORD_PUBLIC_KEY", &self.discord.public_key),
            ("GEMINI_API_KEY", &self.gemini.api_key),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Missing required configuration: {}", missing.join(", "));
        }

        let key = hex::decode(self.discord.public_key.trim())
            .context("DISCORD_PUBLIC_KEY must be hex encoded")?;
        if key.len() != 32 {
            anyhow::bail!("DISCORD_PUBLIC_KEY must be 32 bytes, got {}", key.len());
        }

        if self.scheduler.enabled
            && self
                .scheduler
                .cron_expression
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
        {
            anyhow::bail!("Scheduler is enabled but no cron expression is set");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete_config() -> Config {
        let mut config = Config::default();
        config.discord.bot_token = "token".to_string();
        config.discord.app_id = "123".to_string();
        config.discord.channel_id = "456".to_string();
        config.discord.public_key = "ab".repeat(32);
        config.gemini.api_key = "gemini".to_string();
        config.serpapi.api_key = "serp".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.ttl_seconds, 300);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.serpapi.query_interval_ms, 1200);
        assert!(!config.scheduler.enabled);
        assert!(config.security.cron_secret.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[discord]"));
        assert!(toml_str.contains("[scheduler]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [scheduler]
            enabled = true
            cron_expression = "0 30 9 * * *"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.scheduler.enabled);
        assert_eq!(
            config.scheduler.cron_expression.as_deref(),
            Some("0 30 9 * * *")
        );

        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DISCORD_BOT_TOKEN", "env-token"),
            ("SERPAPI_KEY", "env-serp"),
            ("CRON_SECRET", "shh"),
            ("GEMINI_API_KEY", "   "),
        ]);

        let mut config = Config::default();
        config.gemini.api_key = "from-file".to_string();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.discord.bot_token, "env-token");
        assert_eq!(config.serpapi.api_key, "env-serp");
        assert_eq!(config.security.cron_secret.as_deref(), Some("shh"));
        assert_eq!(config.gemini.api_key, "from-file");
    }

    #[test]
    fn test_validate_reports_missing_values() {
        let mut config = complete_config();
        config.discord.bot_token.clear();
        config.gemini.api_key.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("DISCORD_BOT_TOKEN"));
        assert!(err.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_validate_public_key_length() {
        let mut config = complete_config();
        assert!(config.validate().is_ok());

        config.discord.public_key = "abcd".to_string();
        assert!(config.validate().is_err());

        config.discord.public_key = "zz".repeat(32);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_scheduler_needs_cron() {
        let mut config = complete_config();
        config.scheduler.enabled = true;
        config.scheduler.cron_expression = None;
        assert!(config.validate().is_err());
    }
}
