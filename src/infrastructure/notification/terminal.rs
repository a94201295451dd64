//! Terminal notice adapter

use async_trait::async_trait;
use colored::Colorize;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

/// Prints notices as colored status lines on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }

    fn format(message: &str, icon: NotificationIcon) -> String {
        match icon {
            NotificationIcon::Success => format!("{} {}", "✓".green(), message),
            NotificationIcon::Warning => format!("{} {}", "⚠".yellow(), message.yellow()),
            NotificationIcon::Error => format!("{} {}", "✗".red(), message.red()),
            NotificationIcon::Info => format!("{} {}", "ℹ".blue(), message),
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(
        &self,
        _title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        eprintln!("{}", Self::format(message, icon));
        Ok(())
    }
}
