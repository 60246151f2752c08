//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

/// Environment variables that would leak the caller's setup into a test
const DISCAPTCHA_ENV: [&str; 12] = [
    "DISCAPTCHA_CONFIG",
    "DISCAPTCHA_TOKEN",
    "DISCAPTCHA_API_BASE_URL",
    "DISCAPTCHA_TIMEOUT_SECS",
    "DISCAPTCHA_ROLE_NAME",
    "DISCAPTCHA_VERIFIER",
    "DISCAPTCHA_MIN_ACCOUNT_AGE_DAYS",
    "DISCAPTCHA_CONCURRENCY",
    "DISCAPTCHA_MEMBER_PAGE_SIZE",
    "DISCAPTCHA_LOG_LEVEL",
    "DISCAPTCHA_LOG_FILE",
    "DISCAPTCHA_LOG_JSON",
];

/// A discaptcha command with a clean DISCAPTCHA_* environment
pub fn discaptcha_cmd() -> Command {
    let mut cmd = Command::cargo_bin("discaptcha").unwrap();
    for var in DISCAPTCHA_ENV {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_exist() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
    }
}
