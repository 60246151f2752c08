//! Member verification predicates
//!
//! Humanize asks a [`MemberVerifier`] once per member that lacks the verified
//! role. The predicate is chosen by `humanize.verifier` in the configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::platform::Member;

/// Outcome of verifying one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

/// Pass/fail check applied per member during humanization
#[async_trait]
pub trait MemberVerifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn verify(&self, member: &Member) -> Verdict;
}

pub type SharedVerifier = Arc<dyn MemberVerifier>;

// ─────────────────────────────────────────────────────────────────
// Verifiers
// ─────────────────────────────────────────────────────────────────

/// Passes every human account; bot accounts fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanVerifier;

#[async_trait]
impl MemberVerifier for HumanVerifier {
    fn name(&self) -> &'static str {
        "non-bot"
    }

    async fn verify(&self, member: &Member) -> Verdict {
        Verdict::from(!member.bot)
    }
}

/// Passes human accounts created at least `min_age` before `now`
#[derive(Debug, Clone, Copy)]
pub struct AccountAgeVerifier {
    min_age: Duration,
    now: DateTime<Utc>,
}

impl AccountAgeVerifier {
    pub fn new(min_age: Duration) -> Self {
        Self::at(min_age, Utc::now())
    }

    /// Verifier evaluated against a fixed clock
    pub fn at(min_age: Duration, now: DateTime<Utc>) -> Self {
        Self { min_age, now }
    }
}

#[async_trait]
impl MemberVerifier for AccountAgeVerifier {
    fn name(&self) -> &'static str {
        "account-age"
    }

    async fn verify(&self, member: &Member) -> Verdict {
        let age = self.now - member.account_created_at();
        Verdict::from(!member.bot && age >= self.min_age)
    }
}

/// Passes every member, bots included
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl MemberVerifier for AllowAll {
    fn name(&self) -> &'static str {
        "everyone"
    }

    async fn verify(&self, _member: &Member) -> Verdict {
        Verdict::Pass
    }
}

// ─────────────────────────────────────────────────────────────────
// Verifier selection
// ─────────────────────────────────────────────────────────────────

/// Verifier names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierKind {
    NonBot,
    AccountAge,
    Everyone,
}

impl VerifierKind {
    pub fn all() -> &'static [VerifierKind] {
        &[VerifierKind::NonBot, VerifierKind::AccountAge, VerifierKind::Everyone]
    }

    pub fn name(&self) -> &'static str {
        match self {
            VerifierKind::NonBot => "non-bot",
            VerifierKind::AccountAge => "account-age",
            VerifierKind::Everyone => "everyone",
        }
    }

    /// Build the verifier; `min_account_age_days` only matters for `AccountAge`
    pub fn build(&self, min_account_age_days: u32) -> SharedVerifier {
        match self {
            VerifierKind::NonBot => Arc::new(HumanVerifier),
            VerifierKind::AccountAge => Arc::new(AccountAgeVerifier::new(Duration::days(
                i64::from(min_account_age_days),
            ))),
            VerifierKind::Everyone => Arc::new(AllowAll),
        }
    }
}

impl FromStr for VerifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VerifierKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == s.to_lowercase())
            .ok_or_else(|| {
                let names: Vec<&str> = VerifierKind::all().iter().map(|k| k.name()).collect();
                Error::config_field_invalid(
                    "humanize.verifier",
                    format!("Unknown verifier '{}'. Must be one of: {}", s, names.join(", ")),
                )
            })
    }
}

impl fmt::Display for VerifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemberId;

    fn member(id: u64, bot: bool) -> Member {
        Member {
            id: MemberId(id),
            username: format!("user{}", id),
            bot,
            roles: vec![],
            joined_at: None,
        }
    }

    #[tokio::test]
    async fn test_human_verifier_rejects_bots() {
        assert_eq!(HumanVerifier.verify(&member(1, false)).await, Verdict::Pass);
        assert_eq!(HumanVerifier.verify(&member(2, true)).await, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_account_age_verifier() {
        // Snowflake created 2016-04-30
        let old = member(175928847299117063, false);
        let created = old.account_created_at();

        let strict = AccountAgeVerifier::at(Duration::days(7), created + Duration::days(3));
        assert_eq!(strict.verify(&old).await, Verdict::Fail);

        let lenient = AccountAgeVerifier::at(Duration::days(7), created + Duration::days(30));
        assert_eq!(lenient.verify(&old).await, Verdict::Pass);

        let bot = member(175928847299117063, true);
        assert_eq!(lenient.verify(&bot).await, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_allow_all() {
        assert!(AllowAll.verify(&member(3, true)).await.passed());
    }

    #[test]
    fn test_verifier_kind_parse() {
        assert_eq!("non-bot".parse::<VerifierKind>().unwrap(), VerifierKind::NonBot);
        assert_eq!("Account-Age".parse::<VerifierKind>().unwrap(), VerifierKind::AccountAge);
        assert!("captcha".parse::<VerifierKind>().is_err());
    }

    #[test]
    fn test_verifier_kind_build() {
        for kind in VerifierKind::all() {
            assert_eq!(kind.build(7).name(), kind.name());
        }
    }
}
