//! Change feed port
//!
//! Row-level insert/update/delete notifications on the `trips` relation.
//! Views subscribe explicitly and hold the subscription for as long as
//! they are alive; dropping it ends the subscription. There is no
//! implicit refetch-on-render anywhere in the app.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification on the trips relation
#[derive(Debug, Clone)]
pub struct TripChange {
    pub kind: ChangeKind,
    pub trip_id: Uuid,
    pub user_id: Uuid,
}

/// Change feed abstraction
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to trip changes, optionally filtered to one owner
    fn subscribe_trips(&self, owner: Option<Uuid>) -> TripSubscription;
}

/// A live subscription to trip changes
///
/// Owned by the subscribing view; dropping it releases the subscription.
pub struct TripSubscription {
    receiver: broadcast::Receiver<TripChange>,
    owner: Option<Uuid>,
}

impl TripSubscription {
    pub fn new(receiver: broadcast::Receiver<TripChange>, owner: Option<Uuid>) -> Self {
        Self { receiver, owner }
    }

    /// Wait for the next change matching this subscription's filter
    ///
    /// Returns `None` when the feed is closed. Lagged notifications are
    /// skipped; the caller refetches anyway, so missed intermediate
    /// events carry no information.
    pub async fn next(&mut self) -> Option<TripChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => {
                    if self.owner.map_or(true, |owner| change.user_id == owner) {
                        return Some(change);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
