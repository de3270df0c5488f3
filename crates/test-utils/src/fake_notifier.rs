use std::sync::{Arc, Mutex};

use modwatch::exec::Notifier;

/// A notifier that records every `(title, text)` it is asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pushed: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushed(&self) -> Vec<(String, String)> {
        self.pushed.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn push(&self, title: &str, text: &str) {
        self.pushed
            .lock()
            .unwrap()
            .push((title.to_string(), text.to_string()));
    }
}
