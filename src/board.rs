use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    api::{BidPage, BidQuery, Pagination},
    assembler::{assemble, BidFilter},
    classifier::{classify, Classification, Context},
    dispatcher::Dispatcher,
    entities::{Action, ActionKind, BidRecord},
    error::{action_in_progress_error, not_found_error, Error, Recovery},
    summary::{summarize, BidSummary},
};

/// A bid as held by a view, with its client-side busy marker.
#[derive(Clone, Debug, PartialEq)]
pub struct BidView {
    pub record: BidRecord,
    pub pending_action: Option<ActionKind>,
}

impl BidView {
    pub fn new(record: BidRecord) -> Self {
        Self {
            record,
            pending_action: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_action.is_some()
    }
}

impl AsRef<BidRecord> for BidView {
    fn as_ref(&self) -> &BidRecord {
        &self.record
    }
}

/// What a view renders for one bid.
#[derive(Clone, Debug, PartialEq)]
pub struct BidRow {
    pub view: BidView,
    pub classification: Classification,
}

impl BidRow {
    /// Controls for this row are disabled while an action is in flight.
    pub fn busy(&self) -> bool {
        self.view.is_busy()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the user about the last thing that happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub detail: Option<String>,
    pub recovery: Recovery,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            detail: None,
            recovery: Recovery::None,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message().to_string(),
            detail: err.message.clone(),
            recovery: err.recovery(),
        }
    }
}

/// Issued by [`BidBoard::begin_refresh`]; hand it back with the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// The bid collection owned by one view.
///
/// The board never patches records optimistically: after a successful
/// action it re-fetches, so what it holds is always the server's version.
pub struct BidBoard {
    dispatcher: Arc<Dispatcher>,
    context: Context,
    query: BidQuery,
    filter: BidFilter,
    views: Vec<BidView>,
    pagination: Option<Pagination>,
    notice: Option<Notice>,
    issued: u64,
    applied: u64,
}

impl BidBoard {
    pub fn new(dispatcher: Arc<Dispatcher>, context: Context) -> Self {
        Self {
            dispatcher,
            context,
            query: BidQuery::default(),
            filter: BidFilter::default(),
            views: Vec::new(),
            pagination: None,
            notice: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn with_query(mut self, query: BidQuery) -> Self {
        self.query = query;
        self
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn query(&self) -> &BidQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: BidQuery) {
        self.query = query;
    }

    pub fn filter(&self) -> &BidFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: BidFilter) {
        self.filter = filter;
    }

    pub fn views(&self) -> &[BidView] {
        &self.views
    }

    pub fn get(&self, bid_id: &str) -> Option<&BidView> {
        self.views.iter().find(|view| view.record.id == bid_id)
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_loading(&self) -> bool {
        self.issued > self.applied
    }

    /// Filtered, ordered for review, and classified as of `now`.
    pub fn rows(&self, now: DateTime<Utc>) -> Vec<BidRow> {
        assemble(self.views.iter().cloned(), &self.filter)
            .into_iter()
            .map(|view| {
                let classification = classify(&view.record, now, self.context);
                BidRow {
                    view,
                    classification,
                }
            })
            .collect()
    }

    /// Over everything held, regardless of the filter.
    pub fn summary(&self) -> BidSummary {
        summarize(self.views.iter().map(|view| &view.record))
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Applies a fetched page unless a newer refresh has already landed.
    /// Busy markers survive. Returns whether the result was applied.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<BidPage, Error>,
    ) -> Result<bool, Error> {
        if ticket.0 < self.applied {
            tracing::info!(ticket = ticket.0, applied = self.applied, "discarding stale refresh");
            return Ok(false);
        }
        self.applied = ticket.0;

        let page = result?;

        let mut busy: HashMap<String, ActionKind> = self
            .views
            .iter()
            .filter_map(|view| Some((view.record.id.clone(), view.pending_action?)))
            .collect();

        self.views = page
            .bids
            .into_iter()
            .map(|record| {
                let pending_action = busy.remove(&record.id);
                BidView {
                    record,
                    pending_action,
                }
            })
            .collect();
        self.pagination = Some(page.pagination);

        Ok(true)
    }

    /// Re-fetches the collection, posting a notice if that fails.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        if let Err(err) = self.reload().await {
            self.notice = Some(Notice::from_error(&err));
            return Err(err);
        }

        Ok(())
    }

    async fn reload(&mut self) -> Result<(), Error> {
        let ticket = self.begin_refresh();
        let result = self.dispatcher.fetch_bids(&self.query).await;
        self.finish_refresh(ticket, result).map(|_| ())
    }

    /// Marks a bid busy and hands back the copy to act on.
    pub fn begin_action(&mut self, bid_id: &str, kind: ActionKind) -> Result<BidRecord, Error> {
        let view = self
            .views
            .iter_mut()
            .find(|view| view.record.id == bid_id)
            .ok_or_else(|| not_found_error(format!("bid {} is not on this board", bid_id)))?;

        if view.is_busy() {
            return Err(action_in_progress_error());
        }

        view.pending_action = Some(kind);
        Ok(view.record.clone())
    }

    /// Clears the busy marker and posts a notice. Returns whether the
    /// collection should be re-fetched.
    pub fn finish_action(
        &mut self,
        bid_id: &str,
        kind: ActionKind,
        result: &Result<BidRecord, Error>,
    ) -> bool {
        if let Some(view) = self.views.iter_mut().find(|view| view.record.id == bid_id) {
            view.pending_action = None;
        }

        match result {
            Ok(_) => {
                self.notice = Some(Notice::success(kind.past_tense()));
                true
            }
            Err(err) => {
                self.notice = Some(Notice::from_error(err));
                err.requires_refresh()
            }
        }
    }

    #[tracing::instrument(skip(self, action), fields(action = action.kind().name()))]
    pub async fn perform(&mut self, bid_id: &str, action: Action) -> Result<BidRecord, Error> {
        let kind = action.kind();
        let bid = self.begin_action(bid_id, kind)?;

        let result = self.dispatcher.dispatch(&bid, action).await;

        if self.finish_action(bid_id, kind, &result) {
            if let Err(err) = self.reload().await {
                tracing::warn!(kind = ?err.kind, "refresh after action failed");
            }
        }

        result
    }
}
