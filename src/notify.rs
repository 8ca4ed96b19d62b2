use serde::Serialize;
use tracing::info;

/// A push message for one upcoming match.
///
/// `condition` is a topic-subscription expression; the downstream dispatcher
/// deduplicates by it, so a user subscribed to the event, the match and both
/// teams still receives a single notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub match_id: String,
    pub timestamp: Option<String>,
    pub stream_url: Option<String>,
    pub condition: String,
}

/// Boundary to the push-notification dispatch. Delivery and deduplication
/// semantics belong to the implementation, not to the scheduler.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, batch: Vec<Notification>);
}

/// Default notifier that only logs; used when no push backend is configured.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, batch: Vec<Notification>) {
        if batch.is_empty() {
            info!("no notifications to send");
            return;
        }
        for message in &batch {
            info!(
                match_id = %message.match_id,
                title = %message.title,
                condition = %message.condition,
                "would dispatch notification"
            );
        }
    }
}
