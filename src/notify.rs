//! Match-change notifications for real-time subscribers.

use crate::models::BracketMatch;
use tokio::sync::broadcast;

/// Fire-and-forget hook called after every match state change.
/// Implementations must not block and must not fail the caller.
pub trait MatchNotifier {
    fn notify_match_changed(&self, changed: &BracketMatch);
}

/// Discards notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl MatchNotifier for NoopNotifier {
    fn notify_match_changed(&self, _changed: &BracketMatch) {}
}

/// Publishes changed matches on a tokio broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<BracketMatch>,
}

impl BroadcastNotifier {
    /// `capacity` is how many changes a slow subscriber may lag before it skips ahead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BracketMatch> {
        self.sender.subscribe()
    }
}

impl MatchNotifier for BroadcastNotifier {
    fn notify_match_changed(&self, changed: &BracketMatch) {
        // No subscribers is not an error for the engine.
        if self.sender.send(changed.clone()).is_err() {
            log::debug!("No subscribers for match {} update", changed.id);
        }
    }
}
