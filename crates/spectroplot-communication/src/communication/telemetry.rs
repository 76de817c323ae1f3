//! Bounded telemetry buffer
//!
//! Holds raw non-status lines received from the plotter until a client
//! drains them. When full, the oldest line is evicted before the newest is
//! inserted.

use std::collections::VecDeque;

/// Default number of lines kept before eviction
pub const DEFAULT_TELEMETRY_CAPACITY: usize = 100;

/// Drop-oldest FIFO of raw device lines
#[derive(Debug, Clone)]
pub struct TelemetryBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    evicted: u64,
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TELEMETRY_CAPACITY)
    }
}

impl TelemetryBuffer {
    /// Create a buffer holding at most `capacity` lines (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Append a line, evicting the oldest one if the buffer is full
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line.into());
    }

    /// Remove and return every buffered line in arrival order
    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }

    /// Number of buffered lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of buffered lines
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines dropped because the buffer was full
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Iterate over buffered lines without draining
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
