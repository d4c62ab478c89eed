use tracing::{error, info};

/// User-facing notification channel (the toast layer, owned elsewhere).
/// Invoked with fixed, non-technical messages only.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier that routes through the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(target: "undugu::notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "undugu::notify", "{message}");
    }
}
