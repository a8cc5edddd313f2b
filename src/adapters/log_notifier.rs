//! Notification sink that writes to the `notify` tracing target.

use crate::domain::error::VoltraderError;
use crate::ports::notify_port::NotifyPort;

#[derive(Debug, Default, Clone)]
pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
        }
    }
}

impl NotifyPort for LogNotifier {
    fn notify(&self, message: &str) -> Result<(), VoltraderError> {
        tracing::info!(target: "notify", channel = %self.channel, "{}", message);
        Ok(())
    }
}
