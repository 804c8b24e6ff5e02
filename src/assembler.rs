use crate::entities::{BidRecord, Status};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Any pending-like status.
    Pending,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status.is_pending_like(),
            Self::Only(only) => *only == status,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl BidFilter {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    pub fn matches(&self, bid: &BidRecord) -> bool {
        self.status.matches(bid.status) && matches_search(bid, &self.search)
    }
}

/// Case-insensitive substring search over the load title, both locations,
/// the bid message and the cargo type. A hit in any field is a match.
pub fn matches_search(bid: &BidRecord, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let load = bid.load.as_ref();
    let fields = [
        load.map(|load| load.title.as_str()),
        load.map(|load| load.pickup_location.as_str()),
        load.map(|load| load.delivery_location.as_str()),
        bid.message.as_deref(),
        load.map(|load| load.cargo_type.as_str()),
    ];

    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Bids awaiting review first, then newest first. Stable: equal keys keep
/// their incoming order.
pub fn sort_for_review<T: AsRef<BidRecord>>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());

        b.is_awaiting_review()
            .cmp(&a.is_awaiting_review())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    items
}

pub fn filter<T, I>(items: I, filter: &BidFilter) -> Vec<T>
where
    T: AsRef<BidRecord>,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| filter.matches(item.as_ref()))
        .collect()
}

/// Filter, then order for review.
pub fn assemble<T, I>(items: I, bid_filter: &BidFilter) -> Vec<T>
where
    T: AsRef<BidRecord>,
    I: IntoIterator<Item = T>,
{
    sort_for_review(filter(items, bid_filter))
}
