use tokio::sync::mpsc;

use super::AssistantError;

/// Notices for the user produced while a session works. The presentation
/// layer drains these after every action.
#[derive(Debug)]
pub enum Event {
    Error(AssistantError),
    Success(String),
    Warning(String),
}

impl Event {
    /// Queues the notice. A closed channel only loses the notice, the caller
    /// carries on with its result.
    pub fn notify(self, tx: &mpsc::UnboundedSender<Event>) {
        if let Err(err) = tx.send(self) {
            tracing::warn!(event = ?err.0, "Dropped notice, nobody is listening");
        }
    }
}
