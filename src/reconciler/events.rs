use serde::{Deserialize, Serialize};

/// Server-push event, decoded defensively from `{type, payload}` frames.
///
/// Unknown types map to `Unknown` and are ignored, which keeps the channel
/// forward-compatible with event kinds this client does not know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    FriendRequest {
        from_id: i32,
        to_id: i32,
    },
    FriendAccepted {
        from_id: i32,
        to_id: i32,
    },
    MissionInvitation {
        mission_id: i32,
        inviter_id: i32,
        invitee_id: i32,
    },
    MissionInvitationAccepted {
        mission_id: i32,
        user_id: i32,
        inviter_id: i32,
    },
    MissionStatusChanged {
        mission_id: i32,
        status: String,
        brawler_id: i32,
    },
    MissionCreated {
        mission_id: i32,
        chief_id: i32,
    },
    MissionUpdated {
        mission_id: i32,
        chief_id: i32,
    },
    MissionDeleted {
        mission_id: i32,
    },
    MissionJoined {
        mission_id: i32,
        brawler_id: i32,
    },
    MissionLeft {
        mission_id: i32,
        brawler_id: i32,
    },
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_event() {
        let frame = r#"{"type":"MissionJoined","payload":{"mission_id":3,"brawler_id":8}}"#;
        let event: ServerEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            ServerEvent::MissionJoined {
                mission_id: 3,
                brawler_id: 8
            }
        );
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let frame = r#"{"type":"SomethingNew","payload":{"x":1}}"#;
        let event: ServerEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(event, ServerEvent::Unknown);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let frame = r#"{"type":"MissionJoined","payload":{"mission_id":"not-a-number"}}"#;
        assert!(serde_json::from_str::<ServerEvent>(frame).is_err());
    }
}
