//! Discord REST platform
//!
//! Implements CommunityPlatform with HTTP calls against the Discord REST API
//! (v10). Only the guild role and member endpoints are used; no gateway
//! connection is opened.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DiscordSettings;
use crate::error::{Error, PlatformError, PlatformResult, Result};

use super::{CapabilitySet, CommunityId, CommunityPlatform, Member, MemberId, Role, RoleId};

const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

// ─────────────────────────────────────────────────────────────────
// Discord API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateRoleRequest<'a> {
    name: &'a str,
    permissions: CapabilitySet,
}

#[derive(Debug, Serialize)]
struct ModifyRoleRequest {
    permissions: CapabilitySet,
}

#[derive(Debug, Deserialize)]
struct GuildMemberPayload {
    user: UserPayload,
    #[serde(default)]
    roles: Vec<RoleId>,
    joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: MemberId,
    username: String,
    #[serde(default)]
    bot: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    message: String,
    #[serde(default)]
    code: u64,
}

impl From<GuildMemberPayload> for Member {
    fn from(payload: GuildMemberPayload) -> Self {
        Member {
            id: payload.user.id,
            username: payload.user.username,
            bot: payload.user.bot,
            roles: payload.roles,
            joined_at: payload.joined_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Discord Client
// ─────────────────────────────────────────────────────────────────

/// Discord REST implementation of CommunityPlatform
pub struct DiscordClient {
    client: Client,
    base_url: String,
    member_page_size: u32,
}

impl DiscordClient {
    /// Create a client authenticated with the configured bot token
    pub fn new(settings: &DiscordSettings, member_page_size: u32) -> Result<Self> {
        if settings.token.trim().is_empty() {
            return Err(Error::MissingToken);
        }

        let mut auth = HeaderValue::from_str(&format!("Bot {}", settings.token.trim()))
            .map_err(|_| Error::config_field_invalid("discord.token", "token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "DiscordBot (https://github.com/discaptcha/discaptcha, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            )),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = settings.api_base_url.trim_end_matches('/').to_string();

        info!(base_url = %base_url, "Discord client created");

        Ok(Self {
            client,
            base_url,
            member_page_size,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, reason: Option<&str>) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(reason) = reason {
            // Header values must be visible ASCII; the audit log reason is optional.
            if let Ok(value) = HeaderValue::from_str(reason) {
                req = req.header(AUDIT_LOG_REASON, value);
            }
        }
        req
    }

    /// Send a request and map non-success statuses to PlatformError::Api
    async fn send(&self, req: RequestBuilder) -> PlatformResult<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorPayload>(&body) {
            Ok(payload) if payload.code != 0 => format!("{} (code {})", payload.message, payload.code),
            Ok(payload) => payload.message,
            Err(_) => body,
        };

        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> PlatformResult<T> {
        let response = self.send(req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl CommunityPlatform for DiscordClient {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<Role>> {
        let path = format!("/guilds/{}/roles", community);
        self.send_json(self.request(Method::GET, &path, None)).await
    }

    async fn create_role(
        &self,
        community: CommunityId,
        name: &str,
        permissions: CapabilitySet,
        reason: &str,
    ) -> PlatformResult<Role> {
        let path = format!("/guilds/{}/roles", community);
        let req = self
            .request(Method::POST, &path, Some(reason))
            .json(&CreateRoleRequest { name, permissions });
        self.send_json(req).await
    }

    async fn delete_role(
        &self,
        community: CommunityId,
        role: &Role,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = format!("/guilds/{}/roles/{}", community, role.id);
        self.send(self.request(Method::DELETE, &path, Some(reason))).await?;
        Ok(())
    }

    async fn list_members(&self, community: CommunityId) -> PlatformResult<Vec<Member>> {
        let mut members = Vec::new();
        let mut after = MemberId(0);

        loop {
            let path = format!(
                "/guilds/{}/members?limit={}&after={}",
                community, self.member_page_size, after
            );
            let page: Vec<GuildMemberPayload> =
                self.send_json(self.request(Method::GET, &path, None)).await?;
            let page_len = page.len();

            debug!(guild = %community, page_len, "Fetched member page");

            if let Some(last) = page.iter().map(|m| m.user.id).max() {
                after = last;
            }
            members.extend(page.into_iter().map(Member::from));

            if page_len < self.member_page_size as usize {
                break;
            }
        }

        Ok(members)
    }

    async fn assign_role(
        &self,
        community: CommunityId,
        member: &Member,
        role: &Role,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = format!("/guilds/{}/members/{}/roles/{}", community, member.id, role.id);
        self.send(self.request(Method::PUT, &path, Some(reason))).await?;
        Ok(())
    }

    async fn default_permissions(&self, community: CommunityId) -> PlatformResult<CapabilitySet> {
        let everyone = community.everyone_role();
        self.list_roles(community)
            .await?
            .into_iter()
            .find(|r| r.id == everyone)
            .map(|r| r.permissions)
            .ok_or_else(|| PlatformError::Malformed("guild has no @everyone role".to_string()))
    }

    async fn set_default_permissions(
        &self,
        community: CommunityId,
        permissions: CapabilitySet,
        reason: &str,
    ) -> PlatformResult<()> {
        let path = format!("/guilds/{}/roles/{}", community, community.everyone_role());
        let req = self
            .request(Method::PATCH, &path, Some(reason))
            .json(&ModifyRoleRequest { permissions });
        self.send(req).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
