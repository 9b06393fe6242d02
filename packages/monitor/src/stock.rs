//! Stock data model and the snapshot diff engine.
//!
//! A `Snapshot` is the complete catalog state at one point in time, keyed by
//! product id. `diff` compares two consecutive snapshots and emits one event
//! per product that went from out-of-stock (or never seen) to in-stock —
//! with the rule that a first sighting never counts as a transition.

use indexmap::IndexMap;

/// Normalized projection of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: u64,
    pub name: String,
    pub in_stock: bool,
    /// Category names in upstream order (not re-sorted).
    pub categories: Vec<String>,
    pub url: String,
}

impl ProductRecord {
    /// Display form of the category list.
    pub fn categories_joined(&self) -> String {
        self.categories.join(", ")
    }
}

/// Point-in-time catalog state, keyed by product id.
///
/// IndexMap keeps the fetch's page/record order, which makes diff iteration
/// (and therefore event order) deterministic.
pub type Snapshot = IndexMap<u64, ProductRecord>;

/// Emitted when a product flips from out-of-stock to in-stock between two
/// consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChangeEvent {
    pub name: String,
    /// Comma-joined category names.
    pub categories: String,
    pub url: String,
}

/// Compare the previous snapshot against a fresh one.
///
/// Returns the back-in-stock events plus the snapshot to retain for the next
/// cycle, which is exactly `current`: products absent from the new fetch are
/// dropped from tracking, and a product seen for the first time is recorded
/// without an event (there is no prior state to transition from).
pub fn diff(previous: &Snapshot, current: Snapshot) -> (Vec<StockChangeEvent>, Snapshot) {
    let mut events = Vec::new();

    for (id, record) in &current {
        match previous.get(id) {
            // First sighting: track it, but never announce.
            None => {}
            Some(prev) => {
                if !prev.in_stock && record.in_stock {
                    events.push(StockChangeEvent {
                        name: record.name.clone(),
                        categories: record.categories_joined(),
                        url: record.url.clone(),
                    });
                }
            }
        }
    }

    (events, current)
}
