//! Build script for Discaptcha
//!
//! Embeds build-time information into the binary:
//! - Git commit hash
//! - Build timestamp
//! - Target triple and profile

use std::env;
use std::process::Command;

fn main() {
    // Rerun if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let git_dirty = match git(&["status", "--porcelain"]) {
        Some(status) if !status.is_empty() => "true",
        Some(_) => "false",
        None => "unknown",
    };

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=DISCAPTCHA_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=DISCAPTCHA_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=DISCAPTCHA_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=DISCAPTCHA_TARGET={}", target);
    println!("cargo:rustc-env=DISCAPTCHA_PROFILE={}", profile);
}

/// Run a git command, returning trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
