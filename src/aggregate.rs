// src/aggregate.rs
use log::error;
use tokio::join;

use crate::community::CommunityClient;
use crate::models::snapshot::CombinedSnapshot;
use crate::roster;
use crate::status::StatusSource;

/// Compute one tick's snapshot. The two upstream reads have no ordering
/// dependency and run concurrently; each failure stays in its own field.
pub async fn combined_snapshot<C, S>(
    community: &C,
    status: &S,
    guild_id: &str,
    server_id: &str,
) -> CombinedSnapshot
where
    C: CommunityClient,
    S: StatusSource,
{
    let (roster_result, status_result) = join!(
        roster::aggregate_roster(community, guild_id),
        status.fetch(server_id),
    );

    if let Err(e) = &roster_result {
        error!("roster aggregation for guild {} failed: {}", guild_id, e);
    }

    CombinedSnapshot {
        roster: roster_result,
        status: status_result,
    }
}
