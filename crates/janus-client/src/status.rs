//! Status sink that keeps the text in memory and logs every change.

use janus_interfaces::StatusSink;
use log::info;
use parking_lot::Mutex;

#[derive(Default)]
pub struct LogStatusSink {
    text: Mutex<String>,
}

impl LogStatusSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for LogStatusSink {
    fn set_text(&self, text: &str) {
        let mut current = self.text.lock();
        current.clear();
        current.push_str(text);
        info!("Status: {}", current);
    }

    fn append_text(&self, text: &str) {
        let mut current = self.text.lock();
        current.push_str(text);
        info!("Status: {}", current);
    }

    fn text(&self) -> String {
        self.text.lock().clone()
    }
}
