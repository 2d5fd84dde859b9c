use serde::{Deserialize, Serialize};

/// Mission lifecycle states.
///
/// Transitions are monotonic: `Open -> InProgress -> {Completed, Failed}`,
/// with no egress from the terminal states. Wire strings match the variant
/// names exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MissionStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Failed,
}

impl MissionStatus {
    pub fn allowed_transitions(&self) -> &'static [MissionStatus] {
        use MissionStatus::*;
        match self {
            Open => &[InProgress],
            InProgress => &[Completed, Failed],
            Completed => &[],
            Failed => &[],
        }
    }

    pub fn can_transition_to(&self, target: MissionStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Joins and leaves are accepted only outside `InProgress`; the server
    /// additionally treats `Completed` as closed.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Open | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(MissionStatus::Open.can_transition_to(MissionStatus::InProgress));
        assert!(MissionStatus::InProgress.can_transition_to(MissionStatus::Completed));
        assert!(MissionStatus::InProgress.can_transition_to(MissionStatus::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!MissionStatus::Open.can_transition_to(MissionStatus::Completed));
        assert!(!MissionStatus::Open.can_transition_to(MissionStatus::Failed));
        assert!(!MissionStatus::Completed.can_transition_to(MissionStatus::InProgress));
        assert!(!MissionStatus::Failed.can_transition_to(MissionStatus::Open));
        assert!(!MissionStatus::InProgress.can_transition_to(MissionStatus::Open));
    }

    #[test]
    fn test_terminal_states() {
        assert!(MissionStatus::Completed.is_terminal());
        assert!(MissionStatus::Failed.is_terminal());
        assert!(!MissionStatus::Open.is_terminal());
        assert!(!MissionStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_joinable_states() {
        assert!(MissionStatus::Open.is_joinable());
        assert!(MissionStatus::Failed.is_joinable());
        assert!(!MissionStatus::InProgress.is_joinable());
        assert!(!MissionStatus::Completed.is_joinable());
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(
            serde_json::to_string(&MissionStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
        let parsed: MissionStatus = serde_json::from_str("\"Failed\"").unwrap();
        assert_eq!(parsed, MissionStatus::Failed);
    }
}
