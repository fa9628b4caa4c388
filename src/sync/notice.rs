//! User Notifications
//!
//! Toast-style outcomes of store operations. The UI layer decides how to
//! show them; nothing here blocks or retries.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Table the operation touched
    pub scope: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(scope: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            scope,
            message: message.into(),
        }
    }

    pub fn error(scope: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            scope,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}: {}", tag, self.scope, self.message)
    }
}

/// Sink for notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices to a channel the UI drains
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            log::debug!("notice dropped: receiver closed");
        }
    }
}
