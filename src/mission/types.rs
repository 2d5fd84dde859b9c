use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MissionStatus;

/// A cooperative mission as the server reports it. The local copy is a
/// cache of server state; the server remains the source of truth for
/// `crew_count` and `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: MissionStatus,
    pub chief_id: i32,
    pub chief_name: String,
    pub crew_count: i64,
    pub image_url: Option<String>,
    /// Short human-shareable identifier.
    pub code: String,
    /// 0 means unlimited.
    pub max_participants: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn is_full(&self) -> bool {
        self.max_participants > 0 && self.crew_count >= i64::from(self.max_participants)
    }

    /// Transiently possible during a kick/leave race; the server resolves it.
    pub fn is_over_limit(&self) -> bool {
        self.max_participants > 0 && self.crew_count > i64::from(self.max_participants)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddMission {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub max_participants: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<i32>,
}

/// Server-side mission query; all fields optional and ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionFilter {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<MissionStatus>,
    pub chief_id: Option<i32>,
    pub exclude_chief_id: Option<i32>,
    pub member_id: Option<i32>,
    pub exclude_member_id: Option<i32>,
}

impl MissionFilter {
    /// Renders the filter as query pairs, skipping unset and empty fields.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                if !value.is_empty() {
                    pairs.push((key.to_string(), value));
                }
            }
        };

        push("name", self.name.clone());
        push("code", self.code.clone());
        push("status", self.status.map(|s| s.as_str().to_string()));
        push("chief_id", self.chief_id.map(|v| v.to_string()));
        push(
            "exclude_chief_id",
            self.exclude_chief_id.map(|v| v.to_string()),
        );
        push("member_id", self.member_id.map(|v| v.to_string()));
        push(
            "exclude_member_id",
            self.exclude_member_id.map(|v| v.to_string()),
        );
        pairs
    }
}

/// A brawler currently joined to a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub brawler_id: i32,
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
}
