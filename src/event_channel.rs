use tokio::sync::mpsc;

/// Channel for passing one-shot events from the core task to the UI.
///
/// Each event is received exactly once; a consumed event is gone.
pub struct EventChannel<T> {
    pub sender: mpsc::UnboundedSender<T>,
    pub receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
