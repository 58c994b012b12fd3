// src/models/snapshot.rs
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Emitted in place of the normal snapshot shape when roster aggregation
/// failed for a tick. Clients treat it as that tick's final payload.
pub const ROSTER_ERROR_MESSAGE: &str = "Error fetching member count";

/// Membership statistics for one community, rebuilt from scratch every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterSnapshot {
    pub count: u64,
    pub online_count: u64,
    /// Role name -> member count, keyed in allow-list order. Only
    /// allow-listed roles ever appear here.
    pub roles_based_count: Map<String, Value>,
}

/// Outcome of one status-registry lookup. The payload is passed through
/// verbatim; it is not validated beyond having decoded as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusResult {
    Payload(Value),
    Error,
}

impl Serialize for StatusResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Payload(value) => value.serialize(serializer),
            Self::Error => serializer.serialize_str("Error"),
        }
    }
}

/// One combined snapshot as pushed to a client. Each side carries its own
/// error marker so a failure in one source never blanks the other.
#[derive(Debug, Clone)]
pub struct CombinedSnapshot {
    pub roster: Result<RosterSnapshot, String>,
    pub status: StatusResult,
}

impl Serialize for CombinedSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.roster {
            Ok(roster) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("count", &roster.count)?;
                map.serialize_entry("onlineCount", &roster.online_count)?;
                map.serialize_entry("rolesBasedCount", &roster.roles_based_count)?;
                map.serialize_entry("getFivemCount", &self.status)?;
                map.end()
            }
            Err(_) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", ROSTER_ERROR_MESSAGE)?;
                map.end()
            }
        }
    }
}
