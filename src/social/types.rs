use serde::{Deserialize, Serialize};

/// One side of a friendship as the server reports it to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub friendship_id: i32,
    pub friend_id: i32,
    pub display_name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub status: FriendshipState,
}

/// Friendship record state. `None` is the absence of a record, not a stored
/// state; while pending, `initiator_id` tells the requester from the
/// recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipState {
    None,
    Pending,
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipStatus {
    pub friendship_id: Option<i32>,
    pub initiator_id: Option<i32>,
    pub status: FriendshipState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Rejected,
}

/// A directed, mission-scoped invitation, distinct from a friend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionInvitation {
    pub invitation_id: i32,
    pub mission_id: i32,
    pub mission_name: String,
    pub inviter_id: i32,
    pub inviter_name: String,
    pub invitee_id: i32,
    pub invitee_name: String,
    pub status: InvitationState,
    pub created_at: String,
}

/// Paged query for the brawler directory search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageQuery {
    pub current_page: u32,
    pub page_size: u32,
    pub query: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: 10,
            query: None,
        }
    }
}

impl PageQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("current_page".to_string(), self.current_page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(query) = &self.query {
            if !query.is_empty() {
                pairs.push(("query".to_string(), query.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brawler {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendship_state_wire_strings() {
        assert_eq!(
            serde_json::to_string(&FriendshipState::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: FriendshipState = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(parsed, FriendshipState::Accepted);
    }

    #[test]
    fn test_page_query_skips_empty_search() {
        let query = PageQuery {
            query: Some(String::new()),
            ..Default::default()
        };
        let pairs = query.to_query();
        assert_eq!(pairs.len(), 2);
    }
}
