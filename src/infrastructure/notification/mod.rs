//! Notification infrastructure module
//!
//! Notices always go to the terminal; desktop notifications through
//! notify-rust are optional.

mod notify_rust;
mod terminal;

pub use notify_rust::NotifyRustNotifier;
pub use terminal::TerminalNotifier;

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

/// Delivers each notice to every target, reporting the first failure
pub struct FanoutNotifier {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Box<dyn Notifier>>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        let mut first_error = None;
        for target in &self.targets {
            if let Err(e) = target.notify(title, message, icon).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Create the notifier for the interactive recorder
pub fn create_notifier(desktop: bool) -> Box<dyn Notifier> {
    if desktop {
        Box::new(FanoutNotifier::new(vec![
            Box::new(TerminalNotifier::new()),
            Box::new(NotifyRustNotifier::new()),
        ]))
    } else {
        Box::new(TerminalNotifier::new())
    }
}
