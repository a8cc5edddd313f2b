//! Human notification sink port trait.

use crate::domain::error::VoltraderError;

pub trait NotifyPort {
    fn notify(&self, message: &str) -> Result<(), VoltraderError>;
}

/// Deliver a message, logging instead of failing when the sink errors.
pub fn notify_best_effort(notifier: &dyn NotifyPort, message: &str) {
    if let Err(e) = notifier.notify(message) {
        tracing::warn!(error = %e, "notification dropped: {}", message);
    }
}
