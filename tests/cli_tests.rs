//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{discaptcha_cmd, valid_config_fixture};

/// An address nothing listens on, so every API call fails fast
const DEAD_API: &str = "http://127.0.0.1:9/api/v10";

const GUILD: &str = "81384788765712384";

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    discaptcha_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Discaptcha"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("humanize"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_quiet_flag_help_describes_logging() {
    discaptcha_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Only log errors"));
}

#[test]
fn test_version_command() {
    discaptcha_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("discaptcha"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Git Hash"));
}

#[test]
fn test_short_version_flag() {
    discaptcha_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("discaptcha"));
}

#[test]
fn test_install_help_lists_overrides() {
    discaptcha_cmd()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--guild"))
        .stdout(predicate::str::contains("--role-name"))
        .stdout(predicate::str::contains("--config"));
}

// ─────────────────────────────────────────────────────────────────
// Lifecycle Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_install_requires_guild() {
    discaptcha_cmd()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--guild"));
}

#[test]
fn test_install_without_token() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[roles]\nverified_role_name = \"verified\"\n").unwrap();

    discaptcha_cmd()
        .args(["install", "--guild", GUILD, "--config"])
        .arg(&config)
        .assert()
        .code(10)
        .stdout(predicate::str::contains("Installing").not())
        .stderr(predicate::str::contains("No Discord bot token"))
        .stderr(predicate::str::contains("DISCAPTCHA_TOKEN"));
}

#[test]
fn test_install_reports_fetch_failure() {
    discaptcha_cmd()
        .args(["-q", "install", "--guild", GUILD, "--config"])
        .arg(valid_config_fixture())
        .env("DISCAPTCHA_API_BASE_URL", DEAD_API)
        .assert()
        .code(40)
        .stdout(predicate::str::contains("Installing Discaptcha... 👷"))
        .stdout(predicate::str::contains(
            "This may take a while. I will inform you when finished.",
        ))
        .stderr(predicate::str::contains("failed to fetch the existing roles."));
}

#[test]
fn test_humanize_reports_member_fetch_failure() {
    discaptcha_cmd()
        .args(["-q", "humanize", "--guild", GUILD, "--config"])
        .arg(valid_config_fixture())
        .env("DISCAPTCHA_API_BASE_URL", DEAD_API)
        .assert()
        .code(40)
        .stdout(predicate::str::contains("Humanizing this server... 🧍"))
        .stderr(predicate::str::contains("failed to fetch the guild members."));
}

#[test]
fn test_uninstall_reports_fetch_failure() {
    discaptcha_cmd()
        .args(["-q", "uninstall", "--guild", GUILD, "--config"])
        .arg(valid_config_fixture())
        .env("DISCAPTCHA_API_BASE_URL", DEAD_API)
        .assert()
        .code(40)
        .stdout(predicate::str::contains("Uninstalling Discaptcha... 💣"))
        .stderr(predicate::str::contains("failed to fetch the existing roles."));
}

#[test]
fn test_run_unknown_word_prints_help_reply() {
    discaptcha_cmd()
        .args(["run", "verifyme", "--guild", GUILD])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "available commands for you are: humanize, install, uninstall.",
        ));
}

#[test]
fn test_run_dispatches_known_word() {
    discaptcha_cmd()
        .args(["-q", "run", "UNINSTALL", "--guild", GUILD, "--config"])
        .arg(valid_config_fixture())
        .env("DISCAPTCHA_API_BASE_URL", DEAD_API)
        .assert()
        .code(40)
        .stdout(predicate::str::contains("Uninstalling Discaptcha... 💣"))
        .stderr(predicate::str::contains("failed to fetch the existing roles."));
}

#[test]
fn test_everyone_role_name_rejected() {
    discaptcha_cmd()
        .args(["uninstall", "--guild", GUILD, "--role-name", "@everyone", "--config"])
        .arg(valid_config_fixture())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("@everyone"));
}

#[test]
fn test_invalid_role_name_override() {
    let long_name = "x".repeat(101);
    discaptcha_cmd()
        .args(["install", "--guild", GUILD, "--role-name", &long_name, "--config"])
        .arg(valid_config_fixture())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("role name"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    discaptcha_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[discord]"))
        .stdout(predicate::str::contains("[roles]"))
        .stdout(predicate::str::contains("[humanize]"))
        .stdout(predicate::str::contains("[logging]"));
}

#[test]
fn test_config_validate_default() {
    discaptcha_cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    discaptcha_cmd()
        .args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_init_help() {
    discaptcha_cmd()
        .args(["config", "init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialize"))
        .stdout(predicate::str::contains("--path"))
        .stdout(predicate::str::contains("--force"));
}
