use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters updated by every worker.
///
/// Only eventual totals matter, so all operations are relaxed.
#[derive(Debug, Default)]
pub struct RunCounters {
    processed: AtomicU64,
    commands: AtomicU64,
    response_bytes: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds logical items and returns the new total.
    pub fn add_processed(&self, items: u64) -> u64 {
        self.processed.fetch_add(items, Ordering::Relaxed) + items
    }

    pub fn add_commands(&self, commands: u64) {
        self.commands.fetch_add(commands, Ordering::Relaxed);
    }

    pub fn add_response_bytes(&self, bytes: u64) {
        self.response_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn commands(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    pub fn response_bytes(&self) -> u64 {
        self.response_bytes.load(Ordering::Relaxed)
    }
}
