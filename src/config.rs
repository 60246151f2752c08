//! Configuration system for Discaptcha
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (DISCAPTCHA_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::verify::VerifierKind;

/// Discord caps role names at this many characters
pub const MAX_ROLE_NAME_LEN: usize = 100;

/// Name Discord gives every guild's default role
const EVERYONE_ROLE_NAME: &str = "@everyone";

/// Largest page the member list endpoint accepts
pub const MAX_MEMBER_PAGE_SIZE: u32 = 1000;

/// Main bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Discord API connection settings
    pub discord: DiscordSettings,

    /// Verified role settings
    pub roles: RoleSettings,

    /// Humanize behavior
    pub humanize: HumanizeSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Discord API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    /// REST API base URL, including the version segment
    pub api_base_url: String,

    /// Bot token (without the "Bot " prefix)
    pub token: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Verified role settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSettings {
    /// Name reserved for the verified role
    pub verified_role_name: String,
}

/// Humanize settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanizeSettings {
    /// Verifier: non-bot, account-age, everyone
    pub verifier: String,

    /// Minimum account age for the account-age verifier
    pub min_account_age_days: u32,

    /// Role assignments in flight at once
    pub concurrency: usize,

    /// Members fetched per page
    pub member_page_size: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://discord.com/api/v10".to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            verified_role_name: "verified".to_string(),
        }
    }
}

impl Default for HumanizeSettings {
    fn default() -> Self {
        Self {
            verifier: VerifierKind::NonBot.name().to_string(),
            min_account_age_days: 7,
            concurrency: 1,
            member_page_size: MAX_MEMBER_PAGE_SIZE,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl HumanizeSettings {
    /// Parsed verifier kind
    pub fn verifier_kind(&self) -> Result<VerifierKind> {
        VerifierKind::from_str(&self.verifier)
    }
}

impl BotConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|source| Error::IoRead {
                path: path.clone(),
                source,
            })?;
            config = Self::parse(&content)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse TOML content without applying overrides
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    pub fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        for path in search_paths() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Discord settings
        if let Ok(val) = std::env::var("DISCAPTCHA_TOKEN") {
            self.discord.token = val;
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_API_BASE_URL") {
            self.discord.api_base_url = val;
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.discord.timeout_secs = n;
            }
        }

        // Role settings
        if let Ok(val) = std::env::var("DISCAPTCHA_ROLE_NAME") {
            self.roles.verified_role_name = val;
        }

        // Humanize settings
        if let Ok(val) = std::env::var("DISCAPTCHA_VERIFIER") {
            self.humanize.verifier = val;
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_MIN_ACCOUNT_AGE_DAYS") {
            if let Ok(n) = val.parse() {
                self.humanize.min_account_age_days = n;
            }
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                self.humanize.concurrency = n;
            }
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_MEMBER_PAGE_SIZE") {
            if let Ok(n) = val.parse() {
                self.humanize.member_page_size = n;
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("DISCAPTCHA_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("DISCAPTCHA_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate API base URL
        let url = url::Url::parse(&self.discord.api_base_url).map_err(|e| {
            Error::config_field_invalid("discord.api_base_url", format!("invalid URL: {}", e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config_field_invalid(
                "discord.api_base_url",
                "API base URL must start with http:// or https://",
            ));
        }

        if self.discord.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "discord.timeout_secs",
                "timeout_secs must be at least 1",
            ));
        }

        // Validate role name
        let name_len = self.roles.verified_role_name.chars().count();
        if name_len == 0 || name_len > MAX_ROLE_NAME_LEN {
            return Err(Error::config_field_invalid(
                "roles.verified_role_name",
                format!("role name must be 1 to {} characters long", MAX_ROLE_NAME_LEN),
            ));
        }
        if self.roles.verified_role_name.trim() == EVERYONE_ROLE_NAME {
            return Err(Error::config_field_invalid(
                "roles.verified_role_name",
                format!("role name cannot be {}", EVERYONE_ROLE_NAME),
            ));
        }

        // Validate humanize settings
        self.humanize.verifier_kind()?;
        if self.humanize.concurrency == 0 {
            return Err(Error::config_field_invalid(
                "humanize.concurrency",
                "concurrency must be at least 1",
            ));
        }
        if self.humanize.member_page_size == 0
            || self.humanize.member_page_size > MAX_MEMBER_PAGE_SIZE
        {
            return Err(Error::config_field_invalid(
                "humanize.member_page_size",
                format!("member_page_size must be between 1 and {}", MAX_MEMBER_PAGE_SIZE),
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Token required by the pipeline commands
    pub fn require_token(&self) -> Result<&str> {
        let token = self.discord.token.trim();
        if token.is_empty() {
            return Err(Error::MissingToken);
        }
        Ok(token)
    }

    /// Copy of this configuration with the token masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.discord.token.is_empty() {
            config.discord.token = "********".to_string();
        }
        config
    }
}

/// Standard configuration file locations, in search order
pub fn search_paths() -> Vec<PathBuf> {
    vec![
        // Current directory
        PathBuf::from("discaptcha.toml"),
        // User config directory
        dirs::home_dir()
            .map(|p| p.join(".config").join("discaptcha").join("config.toml"))
            .unwrap_or_default(),
        // Home directory
        dirs::home_dir()
            .map(|p| p.join(".discaptcha").join("config.toml"))
            .unwrap_or_default(),
        // System config (Linux)
        PathBuf::from("/etc/discaptcha/config.toml"),
    ]
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("discaptcha")
                .join("config.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::IoWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|source| Error::IoWrite {
        path: config_path.clone(),
        source,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# Discaptcha Configuration

[discord]
# REST API base URL
api_base_url = "https://discord.com/api/v10"

# Bot token (prefer the DISCAPTCHA_TOKEN environment variable)
token = ""

# Request timeout in seconds
timeout_secs = 30

[roles]
# Name of the role given to verified members
verified_role_name = "verified"

[humanize]
# Verifier: non-bot, account-age, everyone
verifier = "non-bot"

# Minimum account age in days (account-age verifier only)
min_account_age_days = 7

# Role assignments in flight at once (1 = sequential)
concurrency = 1

# Members fetched per page (1-1000)
member_page_size = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.discaptcha/logs/discaptcha.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
