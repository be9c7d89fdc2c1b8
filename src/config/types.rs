use serde::Deserialize;

/// Main configuration structure for Site-Auditor
///
/// Every section is optional; an empty file yields a working configuration
/// with all enrichment providers disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub performance: ProviderConfig,
    #[serde(default, rename = "off-page")]
    pub off_page: ProviderConfig,
    #[serde(default)]
    pub ai: ProviderConfig,
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of analyses running at the same time
    #[serde(rename = "max-concurrent-scans", default = "default_max_concurrent_scans")]
    pub max_concurrent_scans: u32,

    /// Timeout for the primary page fetch in fast mode (seconds)
    #[serde(rename = "fast-timeout-secs", default = "default_fast_timeout")]
    pub fast_timeout_secs: u64,

    /// Timeout for the primary page fetch in deep mode (seconds)
    #[serde(rename = "deep-timeout-secs", default = "default_deep_timeout")]
    pub deep_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scans: default_max_concurrent_scans(),
            fast_timeout_secs: default_fast_timeout(),
            deep_timeout_secs: default_deep_timeout(),
        }
    }
}

fn default_max_concurrent_scans() -> u32 {
    4
}

fn default_fast_timeout() -> u64 {
    15
}

fn default_deep_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the auditor as sent to audited sites
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version sent alongside the name
    #[serde(default = "default_agent_version")]
    pub version: String,

    /// URL with information about the auditor
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

fn default_agent_name() -> String {
    "SiteAuditor".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Scan history persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Path to the JSON history file
    #[serde(default = "default_history_path")]
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> String {
    "scan-history.json".to_string()
}

/// Background scan queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Upper bound on jobs waiting to be processed; unbounded when absent
    #[serde(rename = "max-pending", default)]
    pub max_pending: Option<usize>,

    /// How long a finished job's status stays queryable (seconds)
    #[serde(rename = "retention-secs", default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: None,
            retention_secs: default_retention_secs(),
        }
    }
}

fn default_retention_secs() -> u64 {
    3600
}

/// Credentials and endpoint for one external enrichment provider
///
/// A provider is enabled only when both `api_key` and `base_url` are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    /// Performance provider: `mobile` or `desktop`
    #[serde(default)]
    pub strategy: Option<String>,

    /// AI provider: model name
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Returns the key and base URL when the provider is fully configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())?;
        Some((key, base))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}
