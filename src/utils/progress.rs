use tokio::sync::mpsc;
use tracing::debug;

/// Sends short status lines to whoever drives the spinner.
///
/// Services take one so they can report progress without knowing about the
/// terminal. A reporter without a channel only logs.
#[derive(Clone, Default)]
pub struct ProgressReporter(Option<mpsc::UnboundedSender<String>>);

impl ProgressReporter {
    pub fn new(tx: Option<mpsc::UnboundedSender<String>>) -> Self {
        Self(tx)
    }

    pub fn silent() -> Self {
        Self(None)
    }

    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(progress = %message);
        if let Some(tx) = &self.0 {
            let _ = tx.send(message);
        }
    }
}
