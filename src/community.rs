// src/community.rs
//
// Seam to the community platform. The broadcast engine only ever needs three
// reads from it: the guild object, the full member list, and the role list.
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    #[serde(alias = "approximate_member_count")]
    pub member_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// Ids of the roles this member holds.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Presence status as reported upstream ("online", "idle", "dnd",
    /// "offline"). Absent means the platform reported nothing.
    #[serde(default)]
    pub presence: Option<String>,
}

impl Member {
    pub fn is_online(&self) -> bool {
        matches!(self.presence.as_deref(), Some(status) if status != "offline")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// The three upstream reads the aggregator depends on. Kept as a trait so
/// tests can drive the aggregation with canned guild states.
pub trait CommunityClient {
    async fn fetch_guild(&self, guild_id: &str) -> Result<Guild, String>;
    async fn list_members(&self, guild_id: &str) -> Result<Vec<Member>, String>;
    async fn list_roles(&self, guild_id: &str) -> Result<Vec<Role>, String>;
}

/// REST-backed client. Built once at startup and shared read-only across all
/// connections' ticks.
#[derive(Clone)]
pub struct HttpCommunityClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpCommunityClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("{} returned {}", url, response.status()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| format!("failed to decode response from {}: {}", url, e))
    }
}

impl CommunityClient for HttpCommunityClient {
    async fn fetch_guild(&self, guild_id: &str) -> Result<Guild, String> {
        self.get_json(&format!("/guilds/{}?with_counts=true", guild_id))
            .await
    }

    async fn list_members(&self, guild_id: &str) -> Result<Vec<Member>, String> {
        self.get_json(&format!("/guilds/{}/members?limit=1000", guild_id))
            .await
    }

    async fn list_roles(&self, guild_id: &str) -> Result<Vec<Role>, String> {
        self.get_json(&format!("/guilds/{}/roles", guild_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_without_presence_is_offline() {
        let member: Member = serde_json::from_str(r#"{"roles": ["1"]}"#).unwrap();
        assert!(!member.is_online());
    }

    #[test]
    fn member_with_idle_presence_is_online() {
        let member: Member =
            serde_json::from_str(r#"{"roles": [], "presence": "idle"}"#).unwrap();
        assert!(member.is_online());
    }

    #[test]
    fn guild_decodes_approximate_member_count() {
        let guild: Guild =
            serde_json::from_str(r#"{"approximate_member_count": 42}"#).unwrap();
        assert_eq!(guild.member_count, 42);
    }
}
