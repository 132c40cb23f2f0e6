//! Notification sink forwarding events over a channel.

use tokio::sync::mpsc;

use super::traits::NotificationSink;

/// Forwards each event name into an unbounded channel.
///
/// Sending never blocks; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl NotificationSink for ChannelSink {
    fn send(&self, event: &str) {
        if self.tx.send(event.to_string()).is_err() {
            log::debug!("Notification '{}' dropped, receiver closed", event);
        }
    }
}
