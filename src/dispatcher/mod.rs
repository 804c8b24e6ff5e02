mod actions;
mod helpers;

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    api::DynBidAPI,
    auth::{DynAuthManager, Role},
    classifier::allowed_actions,
    entities::{ActionKind, BidRecord},
    error::{
        action_in_progress_error, invalid_transition_error, permission_denied_error,
        session_expired_error, Error, ErrorKind,
    },
};

/// Requests slower than this are reported as timeouts.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns user actions on bids into calls against the bid service.
///
/// At most one action per bid id is in flight at a time. Every failure is
/// classified; an expired session also ends the local session.
pub struct Dispatcher {
    api: DynBidAPI,
    auth: DynAuthManager,
    role: Role,
    timeout: Duration,
    in_flight: Mutex<HashSet<String>>,
}

impl Dispatcher {
    pub fn new(api: DynBidAPI, auth: DynAuthManager, role: Role) -> Self {
        Self {
            api,
            auth,
            role,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_pending(&self, bid_id: &str) -> bool {
        self.in_flight.lock().contains(bid_id)
    }

    fn begin(&self, bid_id: &str) -> Result<InFlight<'_>, Error> {
        let mut in_flight = self.in_flight.lock();

        if !in_flight.insert(bid_id.to_string()) {
            tracing::info!(bid_id, "ignoring action while another is in flight");
            return Err(action_in_progress_error());
        }

        Ok(InFlight {
            set: &self.in_flight,
            bid_id: bid_id.to_string(),
        })
    }

    fn ensure_allowed(&self, bid: &BidRecord, kind: ActionKind) -> Result<(), Error> {
        if allowed_actions(bid.status, self.role).contains(&kind) {
            return Ok(());
        }

        if allowed_actions(bid.status, self.role.other()).contains(&kind) {
            return Err(permission_denied_error(format!(
                "a {} cannot {} a bid",
                self.role,
                kind.name()
            )));
        }

        Err(invalid_transition_error(format!(
            "cannot {} a {} bid",
            kind.name(),
            bid.status.name()
        )))
    }

    /// Refuses to act on a local copy that breaks the record invariants, such
    /// as a counter-offered bid with no counter offer attached.
    fn ensure_consistent(&self, bid: &BidRecord) -> Result<(), Error> {
        bid.validate().map_err(|err| {
            tracing::warn!(
                bid_id = %bid.id,
                message = ?err.message,
                "local bid is inconsistent, refresh required"
            );
            err
        })
    }

    fn token(&self) -> Result<String, Error> {
        match self.auth.token() {
            Some(token) => Ok(token),
            None => {
                tracing::warn!("no credential available, not contacting the bid service");
                self.auth.logout();
                Err(session_expired_error())
            }
        }
    }

    fn observe(&self, err: Error) -> Error {
        tracing::warn!(kind = ?err.kind, message = ?err.message, "bid service call failed");

        if err.kind == ErrorKind::SessionExpired {
            self.auth.logout();
        }

        err
    }
}

/// Clears the in-flight marker for a bid when the call ends, however it ends.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    bid_id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.bid_id);
    }
}
