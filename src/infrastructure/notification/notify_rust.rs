//! Desktop notices through notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};
use crate::application::session::NOTICE_TITLE;

/// Notices shorter than this disappear before they can be read
const DEFAULT_TIMEOUT_MS: u32 = 4000;

/// Desktop notifier, enabled with `--notify`
pub struct NotifyRustNotifier {
    timeout_ms: u32,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Override how long a notice stays on screen
    pub fn with_timeout_ms(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    fn build(&self, title: &str, message: &str, icon: NotificationIcon) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(NOTICE_TITLE)
            .summary(title)
            .body(message)
            .icon(icon.icon_name())
            .timeout(Timeout::Milliseconds(self.timeout_ms));
        notification
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        let notification = self.build(title, message, icon);

        // show() talks to the session bus and may block
        tokio::task::spawn_blocking(move || {
            notification
                .show()
                .map(|_| ())
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("notice task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires a notification daemon"]
    async fn shows_desktop_notification() {
        let notifier = NotifyRustNotifier::new();
        let result = notifier
            .notify(NOTICE_TITLE, "test notice", NotificationIcon::Info)
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn builds_notice_with_icon_and_body() {
        let notifier = NotifyRustNotifier::with_timeout_ms(1500);
        let notification = notifier.build("Title", "Saved", NotificationIcon::Success);
        assert_eq!(notification.summary, "Title");
        assert_eq!(notification.body, "Saved");
        assert_eq!(notification.icon, "dialog-ok");
        assert_eq!(notification.appname, NOTICE_TITLE);
    }
}
