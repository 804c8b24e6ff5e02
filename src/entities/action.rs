use serde::{Deserialize, Serialize};

/// Reason sent with a rejection when the user leaves it blank.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Accept,
    Reject,
    Withdraw,
    AcceptCounter,
    DeclineCounter,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Withdraw => "withdraw",
            Self::AcceptCounter => "accept-counter",
            Self::DeclineCounter => "decline-counter",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Accept => "Bid accepted",
            Self::Reject => "Bid rejected",
            Self::Withdraw => "Bid withdrawn",
            Self::AcceptCounter => "Counter offer accepted",
            Self::DeclineCounter => "Counter offer declined",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Accept,
    Reject { reason: Option<String> },
    Withdraw,
    AcceptCounter,
    DeclineCounter { reason: Option<String> },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Accept => ActionKind::Accept,
            Self::Reject { reason: _ } => ActionKind::Reject,
            Self::Withdraw => ActionKind::Withdraw,
            Self::AcceptCounter => ActionKind::AcceptCounter,
            Self::DeclineCounter { reason: _ } => ActionKind::DeclineCounter,
        }
    }
}

/// Trims a user-entered reason, treating whitespace-only input as absent.
pub fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(String::from)
}
