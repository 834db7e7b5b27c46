//! User-visible notifications.
//!
//! Every failure in the store, import and attachment flows ends here as a
//! short message; success side effects (install confirmation, finished
//! imports) use the same channel.

use tokio::sync::mpsc;

use crate::error::NovaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs the failure and hands a short message to the notifier.
pub(crate) fn report(notifier: &dyn Notifier, action: &str, err: &NovaError) {
    tracing::error!("{} failed: {}", action, err);
    notifier.notify(Notification::error(err.user_message()));
}

/// Writes notifications to the log. Used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::warn!("{}", notification.message),
        }
    }
}

/// Forwards notifications to a receiver, e.g. a UI toast queue.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody is listening any more
        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification dropped, receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_sends_user_message() {
        let (notifier, mut rx) = ChannelNotifier::new();
        report(
            &notifier,
            "Install plugin",
            &NovaError::api_error(409, "Already installed"),
        );
        let received = rx.try_recv().unwrap();
        assert_eq!(received, Notification::error("Already installed"));
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::success("done"));
    }
}
