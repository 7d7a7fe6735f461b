use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub llm: LlmConfig,

    pub firebase: FirebaseConfig,

    pub smtp: SmtpConfig,

    pub scheduler: SchedulerConfig,

    pub content: ContentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,

    /// Overridable via the OPENROUTER_API_KEY environment variable.
    pub api_key: String,

    pub model: String,

    /// Request timeout in seconds (default: 60)
    pub request_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Root URL of the realtime database, e.g.
    /// `https://my-project-default-rtdb.firebaseio.com`
    pub database_url: String,

    /// Database secret or ID token appended as `?auth=`. Empty means the
    /// database accepts unauthenticated writes (emulator, open rules).
    pub auth_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,

    pub port: u16,

    /// Sender address, also the authentication username.
    pub email: String,

    pub password: String,

    pub recipient: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            email: String::new(),
            password: String::new(),
            recipient: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// Six-field cron expression with seconds. Default fires daily at 11:50.
    pub cron_expression: String,

    /// Run one pipeline invocation immediately when the daemon starts.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron_expression: "0 50 11 * * *".to_string(),
            run_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Topic used by scheduled runs and HTTP requests that omit one.
    pub default_topic: String,

    /// Call-to-action target used when the request omits one.
    pub default_main_page_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            default_topic: "API testing techniques and best practices".to_string(),
            default_main_page_url: "https://apitester-pro.vercel.app".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
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
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("blogarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".blogarr").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Secrets come from the environment (a `.env` file is loaded first)
    /// so config.toml can be committed without credentials in it.
    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 6] = [
            ("OPENROUTER_API_KEY", &mut self.llm.api_key),
            ("FIREBASE_DATABASE_URL", &mut self.firebase.database_url),
            ("FIREBASE_AUTH_TOKEN", &mut self.firebase.auth_token),
            ("SMTP_EMAIL", &mut self.smtp.email),
            ("SMTP_PASSWORD", &mut self.smtp.password),
            ("RECIPIENT_EMAIL", &mut self.smtp.recipient),
        ];

        for (key, target) in overrides {
            if let Ok(value) = std::env::var(key)
                && !value.is_empty()
            {
                *target = value;
            }
        }

        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.model.is_empty() {
            anyhow::bail!("LLM model cannot be empty");
        }

        if self.scheduler.enabled && self.scheduler.cron_expression.is_empty() {
            anyhow::bail!("Scheduler cron expression cannot be empty when enabled");
        }

        if !self.server.enabled && !self.scheduler.enabled {
            anyhow::bail!("Both the server and the scheduler are disabled; nothing to run");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.request_timeout_seconds, 60);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.scheduler.cron_expression, "0 50 11 * * *");
        assert!(config.scheduler.run_on_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[smtp]"));
        assert!(toml_str.contains("[scheduler]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [scheduler]
            cron_expression = "0 0 6 * * *"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.scheduler.cron_expression, "0 0 6 * * *");

        assert_eq!(config.llm.api_base, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_validate_rejects_all_disabled() {
        let mut config = Config::default();
        config.server.enabled = false;
        config.scheduler.enabled = false;
        assert!(config.validate().is_err());
    }
}
