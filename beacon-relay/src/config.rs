//! Relay configuration
//!
//! Defines all configurable parameters for the relay: where to listen, how to
//! reach GitLab and Discord, how the log watcher behaves, and which chat
//! channel each project reports to.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// What a watcher does on a tick where no job is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePolicy {
    /// Stop watching; later pipeline events still update the message
    Stop,
    /// Skip the fetch and keep polling until the pipeline finishes
    Continue,
}

impl FromStr for IdlePolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stop" => Ok(IdlePolicy::Stop),
            "continue" => Ok(IdlePolicy::Continue),
            other => anyhow::bail!("unknown watch idle policy '{}'", other),
        }
    }
}

/// Log watcher settings
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Delay between two watcher ticks
    pub interval: Duration,
    /// Number of trailing log lines shown in the message
    pub log_lines: usize,
    pub idle_policy: IdlePolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            log_lines: 10,
            idle_policy: IdlePolicy::Stop,
        }
    }
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the webhook server binds to
    pub bind_addr: String,

    /// GitLab base URL (e.g., "https://gitlab.example.com")
    pub gitlab_url: String,

    /// GitLab access token used to read job traces
    pub gitlab_token: String,

    /// Discord API base URL
    pub discord_api_base: String,

    /// Discord bot token
    pub discord_token: String,

    /// Shared secret GitLab sends in `X-Gitlab-Token`; unchecked when unset
    pub webhook_secret: Option<String>,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,

    pub watch: WatchConfig,

    /// GitLab project id to Discord channel id
    pub project_bindings: HashMap<u64, String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(gitlab_url: String, discord_token: String) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            gitlab_url,
            gitlab_token: String::new(),
            discord_api_base: "https://discord.com/api/v10".to_string(),
            discord_token,
            webhook_secret: None,
            http_timeout: Duration::from_secs(10),
            watch: WatchConfig::default(),
            project_bindings: HashMap::new(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - GITLAB_URL (required)
    /// - DISCORD_BOT_TOKEN (required)
    /// - GITLAB_TOKEN (optional)
    /// - RELAY_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - DISCORD_API_BASE (optional, default: https://discord.com/api/v10)
    /// - GITLAB_WEBHOOK_SECRET (optional)
    /// - HTTP_TIMEOUT (optional, seconds, default: 10)
    /// - WATCH_INTERVAL_MS (optional, default: 1000)
    /// - WATCH_LOG_LINES (optional, default: 10)
    /// - WATCH_IDLE_POLICY (optional, stop|continue, default: stop)
    /// - PROJECT_BINDINGS (optional, e.g. "12=1200,34=3400")
    pub fn from_env() -> anyhow::Result<Self> {
        let gitlab_url = std::env::var("GITLAB_URL")
            .map_err(|_| anyhow::anyhow!("GITLAB_URL environment variable not set"))?;

        let discord_token = std::env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_BOT_TOKEN environment variable not set"))?;

        let mut config = Self::new(gitlab_url, discord_token);

        if let Ok(token) = std::env::var("GITLAB_TOKEN") {
            config.gitlab_token = token;
        }

        if let Ok(addr) = std::env::var("RELAY_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(base) = std::env::var("DISCORD_API_BASE") {
            config.discord_api_base = base;
        }

        config.webhook_secret = std::env::var("GITLAB_WEBHOOK_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        config.http_timeout = std::env::var("HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.http_timeout);

        config.watch.interval = std::env::var("WATCH_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(config.watch.interval);

        config.watch.log_lines = std::env::var("WATCH_LOG_LINES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(config.watch.log_lines);

        if let Ok(policy) = std::env::var("WATCH_IDLE_POLICY") {
            config.watch.idle_policy = policy.parse()?;
        }

        if let Ok(bindings) = std::env::var("PROJECT_BINDINGS") {
            for (project_id, channel_id) in parse_bindings(&bindings)? {
                config = config.with_binding(project_id, channel_id);
            }
        }

        Ok(config)
    }

    /// Binds a project to a chat channel
    pub fn with_binding(mut self, project_id: u64, channel_id: impl Into<String>) -> Self {
        self.project_bindings.insert(project_id, channel_id.into());
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        for (name, url) in [
            ("gitlab_url", &self.gitlab_url),
            ("discord_api_base", &self.discord_api_base),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.discord_token.is_empty() {
            anyhow::bail!("discord_token cannot be empty");
        }

        if self.http_timeout.is_zero() {
            anyhow::bail!("http_timeout must be greater than 0");
        }

        if self.watch.interval.is_zero() {
            anyhow::bail!("watch interval must be greater than 0");
        }

        if self.watch.log_lines == 0 {
            anyhow::bail!("watch log_lines must be greater than 0");
        }

        if self.project_bindings.values().any(|channel| channel.is_empty()) {
            anyhow::bail!("project bindings cannot map to an empty channel id");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost".to_string(), "dev-token".to_string())
    }
}

/// Parses `"<projectId>=<channelId>,..."`
fn parse_bindings(raw: &str) -> anyhow::Result<HashMap<u64, String>> {
    let mut bindings = HashMap::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (project, channel) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid project binding '{}'", entry))?;

        let project_id = project
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("invalid project id in binding '{}'", entry))?;

        let channel = channel.trim();
        if channel.is_empty() {
            anyhow::bail!("missing channel id in binding '{}'", entry);
        }

        bindings.insert(project_id, channel.to_string());
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.watch.interval, Duration::from_secs(1));
        assert_eq!(config.watch.log_lines, 10);
        assert_eq!(config.watch.idle_policy, IdlePolicy::Stop);
        assert_eq!(config.discord_api_base, "https://discord.com/api/v10");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.gitlab_url = "gitlab.example.com".to_string();
        assert!(config.validate().is_err());
        config.gitlab_url = "https://gitlab.example.com".to_string();

        config.watch.interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.watch.interval = Duration::from_millis(250);

        config.watch.log_lines = 0;
        assert!(config.validate().is_err());
        config.watch.log_lines = 5;

        config.discord_token = String::new();
        assert!(config.validate().is_err());
        config.discord_token = "token".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_binding() {
        let config = Config::default()
            .with_binding(12, "1200")
            .with_binding(34, "3400");

        assert_eq!(config.project_bindings.get(&12), Some(&"1200".to_string()));
        assert_eq!(config.project_bindings.get(&34), Some(&"3400".to_string()));
    }

    #[test]
    fn test_parse_bindings() {
        let bindings = parse_bindings(" 12=1200, 34 = 3400 ,").unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[&34], "3400");

        assert!(parse_bindings("12").is_err());
        assert!(parse_bindings("abc=1200").is_err());
        assert!(parse_bindings("12=").is_err());
        assert!(parse_bindings("").unwrap().is_empty());
    }

    #[test]
    fn test_idle_policy_parse() {
        assert_eq!("stop".parse::<IdlePolicy>().unwrap(), IdlePolicy::Stop);
        assert_eq!("Continue".parse::<IdlePolicy>().unwrap(), IdlePolicy::Continue);
        assert!("later".parse::<IdlePolicy>().is_err());
    }
}
