//! User notifications written to the log

use tracing::{error, info, warn};

use crate::application::ports::outbound::{NotificationLevel, NotificationPort};

pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info => info!(notification = true, "{}", message),
            NotificationLevel::Warn => warn!(notification = true, "{}", message),
            NotificationLevel::Error => error!(notification = true, "{}", message),
        }
    }
}
