use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::auth::Role;
use crate::entities::{ActionKind, BidRecord, Status};

/// Pending-like bids older than this drop to low priority.
pub const STALE_AFTER_HOURS: i64 = 24;

/// Visual emphasis only; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    Medium,
    High,
}

/// The screen a bid is rendered on. Each one has its own label table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    /// Cargo owner's list of bids received across their loads.
    OwnerBidsTab,
    /// Driver's list of bids they placed.
    DriverBidsPage,
    /// Cargo owner looking at the bids on one load.
    LoadDetail,
}

impl Context {
    pub fn role(&self) -> Role {
        match self {
            Self::OwnerBidsTab | Self::LoadDetail => Role::CargoOwner,
            Self::DriverBidsPage => Role::Driver,
        }
    }

    pub fn for_role(role: Role) -> Context {
        match role {
            Role::CargoOwner => Self::OwnerBidsTab,
            Role::Driver => Self::DriverBidsPage,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub display_label: &'static str,
    pub color_class: &'static str,
    pub priority: Priority,
    pub allowed_actions: Vec<ActionKind>,
}

pub fn classify(bid: &BidRecord, now: DateTime<Utc>, context: Context) -> Classification {
    Classification {
        display_label: display_label(bid.status, context),
        color_class: color_class(bid.status),
        priority: priority(bid, now),
        allowed_actions: allowed_actions(bid.status, context.role()),
    }
}

pub fn display_label(status: Status, context: Context) -> &'static str {
    match (context, status) {
        // the owner's bids tab has always shown fresh bids as "Pending"
        (Context::OwnerBidsTab, Status::Submitted) => "Pending",
        (_, Status::Submitted) => "Submitted",
        (_, Status::Viewed) => "Viewed",
        (_, Status::UnderReview) => "Under Review",
        (_, Status::Shortlisted) => "Shortlisted",
        (_, Status::CounterOffered) => "Counter Offered",
        (_, Status::Accepted) => "Accepted",
        (_, Status::Rejected) => "Rejected",
        (_, Status::Withdrawn) => "Withdrawn",
        (_, Status::Expired) => "Expired",
    }
}

pub fn color_class(status: Status) -> &'static str {
    match status {
        Status::Submitted => "bg-yellow-100 text-yellow-800",
        Status::Viewed => "bg-blue-100 text-blue-800",
        Status::UnderReview => "bg-indigo-100 text-indigo-800",
        Status::Shortlisted => "bg-purple-100 text-purple-800",
        Status::CounterOffered => "bg-orange-100 text-orange-800",
        Status::Accepted => "bg-green-100 text-green-800",
        Status::Rejected => "bg-red-100 text-red-800",
        Status::Withdrawn | Status::Expired => "bg-gray-100 text-gray-800",
    }
}

pub fn priority(bid: &BidRecord, now: DateTime<Utc>) -> Priority {
    match bid.status {
        Status::CounterOffered => Priority::High,
        Status::Shortlisted => Priority::Medium,
        status if status.is_pending_like() && is_stale(bid, now) => Priority::Low,
        _ => Priority::Normal,
    }
}

fn is_stale(bid: &BidRecord, now: DateTime<Utc>) -> bool {
    now - bid.created_at > Duration::hours(STALE_AFTER_HOURS)
}

pub fn allowed_actions(status: Status, role: Role) -> Vec<ActionKind> {
    match (status, role) {
        (status, Role::CargoOwner) if status.is_pending_like() => {
            vec![ActionKind::Accept, ActionKind::Reject]
        }
        (status, Role::Driver) if status.is_pending_like() => vec![ActionKind::Withdraw],
        (Status::CounterOffered, _) => {
            vec![ActionKind::AcceptCounter, ActionKind::DeclineCounter]
        }
        _ => vec![],
    }
}
