use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstreams: UpstreamsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub join: JoinConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8084,
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

/// Base URLs of the services the dashboard reads from, plus per-call limits.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamsConfig {
    #[serde(default)]
    pub order_url: String,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub customer_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            order_url: String::new(),
            product_url: String::new(),
            customer_url: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

/// What the best-seller join does with a stat that has no product info.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingMatch {
    #[default]
    Emit,
    Drop,
}

/// What the best-seller join does when the product lookup repeats an id.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeys {
    #[default]
    FirstWins,
    Strict,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct JoinConfig {
    #[serde(default)]
    pub missing_match: MissingMatch,
    #[serde(default)]
    pub duplicate_keys: DuplicateKeys,
}

fn default_log_format() -> String { "compact".to_string() }
fn default_connect_timeout() -> u64 { 3 }
fn default_request_timeout() -> u64 { 10 }
fn default_max_attempts() -> u32 { 3 }
fn default_backoff_base() -> u64 { 100 }
fn default_backoff_max() -> u64 { 2000 }

pub const DEFAULT_ORDER_URL: &str = "http://localhost:8083";
pub const DEFAULT_PRODUCT_URL: &str = "http://localhost:8082";
pub const DEFAULT_CUSTOMER_URL: &str = "http://localhost:8081";

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like [`AppConfig::load_and_validate`] but a missing config file yields
    /// defaults.
    ///
    /// Environment handling is the same with or without a file:
    /// `SERVER_HOST`, `SERVER_PORT` and `TOKIO_WORKER_THREADS` override the
    /// `[server]` values, while `ORDER_SERVICE_URL`, `PRODUCT_SERVICE_URL` and
    /// `CUSTOMER_SERVICE_URL` only fill upstream URLs left empty.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_with(&config_path(), |key| std::env::var(key).ok())
    }

    fn load_or_env_with<F>(path: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = if std::path::Path::new(path).exists() {
            load_from_file(path)?
        } else {
            AppConfig::default()
        };
        cfg.server.apply_env(&env);
        cfg.normalize_with(&env)?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(|key| std::env::var(key).ok())
    }

    fn normalize_with<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize()?;
        // 上游地址：TOML 未配置时从环境变量填充，再退回本地默认端口
        self.upstreams.fill_from(&env);
        self.upstreams.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(host) = env("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = env("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl UpstreamsConfig {
    pub fn normalize_from_env(&mut self) {
        self.fill_from(|key| std::env::var(key).ok());
    }

    fn fill_from(&mut self, env: impl Fn(&str) -> Option<String>) {
        fill(&mut self.order_url, env("ORDER_SERVICE_URL"), DEFAULT_ORDER_URL);
        fill(&mut self.product_url, env("PRODUCT_SERVICE_URL"), DEFAULT_PRODUCT_URL);
        fill(&mut self.customer_url, env("CUSTOMER_SERVICE_URL"), DEFAULT_CUSTOMER_URL);
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("upstreams.order_url", &self.order_url),
            ("upstreams.product_url", &self.product_url),
            ("upstreams.customer_url", &self.customer_url),
        ] {
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("{name} must start with http:// or https://, got {url:?}"));
            }
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("upstream timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be >= 1 when retry is enabled"));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(anyhow!("retry.backoff_max_ms must be >= backoff_base_ms"));
        }
        Ok(())
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

fn fill(slot: &mut String, from_env: Option<String>, fallback: &str) {
    if slot.trim().is_empty() {
        *slot = from_env
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
    }
    while slot.ends_with('/') {
        slot.pop();
    }
}
