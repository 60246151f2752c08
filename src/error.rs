//! Error types for Discaptcha
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-facing lifecycle failure reasons, tagged by failure kind
//! - Raw platform errors kept as sources for operator logs
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for calls into the community platform
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,
    MissingToken = 103,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Platform errors (3xx)
    PlatformRequest = 300,
    PlatformApi = 301,
    PlatformMalformed = 302,

    // Lifecycle errors (4xx)
    LifecycleFetch = 400,
    LifecycleRoleMutation = 401,
    LifecyclePermissionMutation = 402,
    LifecycleHumanization = 403,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Platform errors
            400..=499 => 40, // Lifecycle errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Platform Errors
// ─────────────────────────────────────────────────────────────────

/// Raw failure reported by the community platform.
///
/// These never reach the person who issued a command; they are logged at the
/// step boundary and carried as the source of a [`LifecycleError`].
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The platform answered with a body we could not interpret
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

impl PlatformError {
    /// Whether the platform denied the call for lack of permissions
    pub fn is_forbidden(&self) -> bool {
        matches!(self, PlatformError::Api { status: 403, .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Lifecycle Errors
// ─────────────────────────────────────────────────────────────────

/// Coarse failure taxonomy for the role lifecycle pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Roles could not be enumerated
    Fetch,
    /// Creating or deleting a role failed
    RoleMutation,
    /// Committing the default permission set failed
    PermissionMutation,
    /// Member enumeration, role resolution or assignment failed during humanize
    Humanization,
}

impl FailureKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            FailureKind::Fetch => ErrorCode::LifecycleFetch,
            FailureKind::RoleMutation => ErrorCode::LifecycleRoleMutation,
            FailureKind::PermissionMutation => ErrorCode::LifecyclePermissionMutation,
            FailureKind::Humanization => ErrorCode::LifecycleHumanization,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Fetch => "fetch",
            FailureKind::RoleMutation => "role-mutation",
            FailureKind::PermissionMutation => "permission-mutation",
            FailureKind::Humanization => "humanization",
        };
        f.write_str(name)
    }
}

/// Pipeline step at which a lifecycle operation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchRoles,
    DeleteOldRole,
    CreateRole,
    Humanize,
    RemoveRole,
    SetPermissions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchRoles => "fetch_roles",
            Stage::DeleteOldRole => "delete_old_role",
            Stage::CreateRole => "create_role",
            Stage::Humanize => "humanize",
            Stage::RemoveRole => "remove_role",
            Stage::SetPermissions => "set_permissions",
        };
        f.write_str(name)
    }
}

/// Failure of the humanize pipeline.
///
/// The `Display` text is the reason reported back to the command issuer, and
/// install forwards it unchanged.
#[derive(Error, Debug)]
pub enum HumanizeError {
    #[error("failed to fetch the guild members.")]
    MembersFetch {
        #[source]
        source: PlatformError,
    },

    #[error("failed to fetch the existing roles.")]
    RolesFetch {
        #[source]
        source: PlatformError,
    },

    #[error("failed to find the verified role ({role_name}).")]
    RoleNotFound { role_name: String },

    #[error("failed to give the verified role to {username}.")]
    Assign {
        username: String,
        #[source]
        source: PlatformError,
    },
}

/// Failure of an install, humanize or uninstall pipeline
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("failed to fetch the existing roles.")]
    RolesFetch {
        #[source]
        source: PlatformError,
    },

    #[error("failed to remove the old verified role.")]
    OldRoleDelete {
        #[source]
        source: PlatformError,
    },

    #[error(
        "failed to create the verified role ({role_name}). \
         Perhaps I don't have all the required permissions?"
    )]
    RoleCreate {
        role_name: String,
        #[source]
        source: PlatformError,
    },

    #[error("failed to remove the verified role.")]
    RoleDelete {
        #[source]
        source: PlatformError,
    },

    #[error(transparent)]
    Humanize(#[from] HumanizeError),

    #[error("was unable to set proper @everyone permissions.")]
    Permissions {
        #[source]
        source: PlatformError,
    },
}

impl LifecycleError {
    /// Failure tag for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            LifecycleError::RolesFetch { .. } => FailureKind::Fetch,
            LifecycleError::OldRoleDelete { .. }
            | LifecycleError::RoleCreate { .. }
            | LifecycleError::RoleDelete { .. } => FailureKind::RoleMutation,
            LifecycleError::Humanize(_) => FailureKind::Humanization,
            LifecycleError::Permissions { .. } => FailureKind::PermissionMutation,
        }
    }

    /// Stage the pipeline was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            LifecycleError::RolesFetch { .. } => Stage::FetchRoles,
            LifecycleError::OldRoleDelete { .. } => Stage::DeleteOldRole,
            LifecycleError::RoleCreate { .. } => Stage::CreateRole,
            LifecycleError::RoleDelete { .. } => Stage::RemoveRole,
            LifecycleError::Humanize(_) => Stage::Humanize,
            LifecycleError::Permissions { .. } => Stage::SetPermissions,
        }
    }

    /// The underlying platform error, if any
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            LifecycleError::RolesFetch { source }
            | LifecycleError::OldRoleDelete { source }
            | LifecycleError::RoleCreate { source, .. }
            | LifecycleError::RoleDelete { source }
            | LifecycleError::Permissions { source } => Some(source),
            LifecycleError::Humanize(HumanizeError::MembersFetch { source })
            | LifecycleError::Humanize(HumanizeError::RolesFetch { source })
            | LifecycleError::Humanize(HumanizeError::Assign { source, .. }) => Some(source),
            LifecycleError::Humanize(HumanizeError::RoleNotFound { .. }) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Crate Error
// ─────────────────────────────────────────────────────────────────

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// No bot token configured
    #[error("No Discord bot token configured")]
    MissingToken,

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Platform & Lifecycle Errors
    // ─────────────────────────────────────────────────────────────

    /// Platform failure outside of a lifecycle pipeline
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// A lifecycle pipeline failed; the message is the user-facing reason
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::MissingToken => ErrorCode::MissingToken,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::Platform(PlatformError::Http(_)) => ErrorCode::PlatformRequest,
            Error::Platform(PlatformError::Api { .. }) => ErrorCode::PlatformApi,
            Error::Platform(_) => ErrorCode::PlatformMalformed,
            Error::Lifecycle(e) => e.kind().code(),

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'discaptcha config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'discaptcha config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::MissingToken => Some(
                "Set 'token' under [discord] or export DISCAPTCHA_TOKEN."
            ),
            Error::Lifecycle(e) => match e.kind() {
                FailureKind::RoleMutation | FailureKind::PermissionMutation => Some(
                    "Make sure the bot has the Manage Roles permission and its role sits above the verified role."
                ),
                FailureKind::Fetch | FailureKind::Humanization => Some(
                    "Make sure the bot is a member of the guild and has the Server Members intent enabled."
                ),
            },
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
