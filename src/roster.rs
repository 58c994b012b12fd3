// src/roster.rs
use lazy_static::lazy_static;
use serde_json::{Map, Value};

use crate::community::CommunityClient;
use crate::models::snapshot::RosterSnapshot;

lazy_static! {
    /// Process-wide allow-list of reportable roles. Counts for any other
    /// role are silently excluded, and the report order follows this list.
    static ref ALLOWED_ROLES: Vec<&'static str> = vec![
        "CIVILIANS",
        "WAITING LIST",
        "MYTHIC",
        "MASTER",
        "CHAMPION",
        "HERO",
        "ADVENTURER",
    ];
}

/// Build one roster snapshot for the guild. Fails as a whole if any of the
/// three upstream reads fails; the caller turns that into the snapshot-level
/// error shape.
pub async fn aggregate_roster<C: CommunityClient>(
    client: &C,
    guild_id: &str,
) -> Result<RosterSnapshot, String> {
    aggregate_with_allow_list(client, guild_id, &ALLOWED_ROLES).await
}

async fn aggregate_with_allow_list<C: CommunityClient>(
    client: &C,
    guild_id: &str,
    allow_list: &[&str],
) -> Result<RosterSnapshot, String> {
    let guild = client.fetch_guild(guild_id).await?;

    // One member fetch per tick feeds both presence and role counting. This
    // is the dominant latency source for large guilds, so never refetch it
    // per role.
    let members = client.list_members(guild_id).await?;
    let roles = client.list_roles(guild_id).await?;

    // Presence and membership come from independent reads upstream; the raw
    // values pass through without clamping online <= total.
    let online_count = members.iter().filter(|m| m.is_online()).count() as u64;

    let mut roles_based_count = Map::new();
    for allowed in allow_list {
        let role = match roles.iter().find(|r| r.name == *allowed) {
            Some(role) => role,
            None => continue,
        };
        let count = members
            .iter()
            .filter(|m| m.roles.iter().any(|id| id == &role.id))
            .count();
        roles_based_count.insert(role.name.clone(), Value::from(count as u64));
    }

    Ok(RosterSnapshot {
        count: guild.member_count,
        online_count,
        roles_based_count,
    })
}
