use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::retry::RetryConfig;
use crate::types::LogLevel;

pub const DEFAULT_API_BASE_URL: &str = "https://photoslibrary.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Application configuration, read once from `config.yml`.
#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "albumId")]
    pub album_id: String,
    #[serde(alias = "outputPath")]
    pub output_path: PathBuf,
    pub credentials: Credentials,
    pub api_base_url: String,
    pub token_url: String,

    pub timeout_secs: u64,
    pub retry: RetryConfig,
    pub page_size: u32,

    pub log_level: LogLevel,
}

/// OAuth material for the Photos Library API.
///
/// Either a ready `access_token`, or a refresh token (inline or inside
/// `token_file`) together with the client id and secret.
#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            album_id: String::new(),
            output_path: PathBuf::new(),
            credentials: Credentials::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout_secs: 300,
            retry: RetryConfig::default(),
            page_size: 100,
            log_level: LogLevel::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("album_id", &self.album_id)
            .field("output_path", &self.output_path)
            .field("credentials", &self.credentials)
            .field("api_base_url", &self.api_base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("token_file", &self.token_file)
            .finish()
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

impl Config {
    /// Load and normalise the YAML configuration at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.output_path = expand_tilde(&config.output_path);
        if let Some(token_file) = config.credentials.token_file.take() {
            config.credentials.token_file = Some(expand_tilde(&token_file));
        }
        if config.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }
        Ok(config)
    }

    /// Check the fields that only a sync run needs.
    pub fn validate_for_sync(&self) -> anyhow::Result<()> {
        if self.album_id.trim().is_empty() {
            anyhow::bail!("album_id is required for SyncImage");
        }
        if self.output_path.as_os_str().is_empty() {
            anyhow::bail!("output_path is required for SyncImage");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde(Path::new("~/Pictures"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join("Pictures"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(
            expand_tilde(Path::new("/absolute/path")),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            expand_tilde(Path::new("relative/path")),
            PathBuf::from("relative/path")
        );
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = Config::from_yaml("album_id: abc\noutput_path: /photos\n").unwrap();
        assert_eq!(cfg.album_id, "abc");
        assert_eq!(cfg.output_path, PathBuf::from("/photos"));
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.timeout(), Duration::from_secs(300));
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.retry.max_retries, 2);
    }

    #[test]
    fn test_camel_case_aliases() {
        let cfg = Config::from_yaml("albumId: xyz\noutputPath: /mirror\n").unwrap();
        assert_eq!(cfg.album_id, "xyz");
        assert_eq!(cfg.output_path, PathBuf::from("/mirror"));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
album_id: album-1
output_path: /data
page_size: 25
log_level: debug
timeout_secs: 10
retry:
  max_retries: 4
credentials:
  client_id: id.apps.googleusercontent.com
  client_secret: shh
  refresh_token: rt
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.retry.max_retries, 4);
        assert_eq!(cfg.retry.max_delay_secs, 60);
        assert_eq!(cfg.credentials.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Config::from_yaml("page_size: 0").is_err());
    }

    #[test]
    fn test_validate_for_sync() {
        let cfg = Config::from_yaml("output_path: /data").unwrap();
        assert!(cfg.validate_for_sync().is_err());
        let cfg = Config::from_yaml("album_id: a").unwrap();
        assert!(cfg.validate_for_sync().is_err());
        let cfg = Config::from_yaml("album_id: a\noutput_path: /data").unwrap();
        assert!(cfg.validate_for_sync().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cfg = Config::from_yaml(
            "credentials:\n  access_token: secret-token\n  client_secret: hush\n",
        )
        .unwrap();
        let out = format!("{:?}", cfg);
        assert!(!out.contains("secret-token"));
        assert!(!out.contains("hush"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.yml")).is_err());
    }
}
