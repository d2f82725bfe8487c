/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warn,
    Error,
}

/// User-facing messages. Never fatal to the caller.
pub trait NotificationPort: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NotificationLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.notify(NotificationLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}
