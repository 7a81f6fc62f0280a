//! In-process change feed
//!
//! Publishes row-change notifications for the trips relation over a
//! broadcast channel. Backends publish their own committed mutations
//! into it; views refetch on every delivery. The hosted realtime socket
//! protocol is not carried, so changes made by other clients arrive at
//! the next explicit fetch instead.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ports::{ChangeFeed, ChangeKind, TripChange, TripSubscription};

/// Broadcast-backed change feed
pub struct LocalChangeFeed {
    sender: broadcast::Sender<TripChange>,
}

impl LocalChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Publish a committed mutation
    ///
    /// Delivery is best-effort: with no live subscribers the change is
    /// simply dropped.
    pub fn publish(&self, kind: ChangeKind, trip_id: Uuid, user_id: Uuid) {
        let _ = self.sender.send(TripChange {
            kind,
            trip_id,
            user_id,
        });
    }
}

impl Default for LocalChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for LocalChangeFeed {
    fn subscribe_trips(&self, owner: Option<Uuid>) -> TripSubscription {
        TripSubscription::new(self.sender.subscribe(), owner)
    }
}
