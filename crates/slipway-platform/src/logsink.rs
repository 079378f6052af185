//! Progress log sink.
//!
//! Every phase transition in a command writes one human-readable line to
//! the sink. The calling platform records these against the execution; the
//! lines are not required for correctness.

use std::sync::Mutex;

use tracing::info;

pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Forwards progress lines to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append(&self, line: &str) {
        info!(target: "slipway::progress", "{line}");
    }
}

/// Buffers progress lines for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_buffers_in_order() {
        let sink = MemoryLogSink::new();
        sink.append("first");
        sink.append("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }
}
