use chrono::{DateTime, Utc};

use crate::{
    api::Envelope,
    entities::{Action, BidRecord},
    error::Error,
};

pub fn apply(bid: &mut BidRecord, action: &Action, now: DateTime<Utc>) -> Result<(), Error> {
    match action {
        Action::Accept => bid.accept(now),
        Action::Reject { reason: _ } => bid.reject(now),
        Action::Withdraw => bid.withdraw(now),
        Action::AcceptCounter => bid.accept_counter(now),
        Action::DeclineCounter { reason: _ } => bid.decline_counter(now),
    }
}

/// Builds the post-action record from a successful response.
///
/// A usable server record wins. Anything else (no body, a body that does not
/// parse, a record for another bid, a record that fails validation, a record
/// still in a status other than the one the action leads to) falls back to
/// applying the transition locally.
#[tracing::instrument(skip_all, fields(bid_id = %before.id))]
pub fn resolve(
    before: &BidRecord,
    action: &Action,
    envelope: &Envelope,
    now: DateTime<Utc>,
) -> Result<BidRecord, Error> {
    let mut local = before.clone();
    apply(&mut local, action, now)?;

    let server = envelope
        .bid()
        .filter(|server| server.id == before.id)
        .filter(|server| server.validate().is_ok())
        .filter(|server| server.status == local.status);

    match server {
        Some(mut server) => {
            if matches!(action, Action::AcceptCounter) {
                server.bid_amount = local.bid_amount;
            }
            Ok(server)
        }
        None => {
            if envelope.data.is_some() {
                tracing::warn!("response carried no usable bid, applying transition locally");
            }
            Ok(local)
        }
    }
}
