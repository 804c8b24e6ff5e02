mod action;
mod bid;
mod load;
mod vehicle;

pub use action::{normalize_reason, Action, ActionKind, DEFAULT_REJECTION_REASON};
pub use bid::{BidRecord, CounterOffer, Status, MAX_COVER_LETTER_LEN, MAX_MESSAGE_LEN};
pub use load::LoadSummary;
pub use vehicle::{Currency, VehicleDetails, VehicleType};
