//! Diagnostics module: where verbose walk lists report what they compile and walk.

use std::fmt;
use std::sync::Mutex;

/// Log target used by [`LogSink`].
pub const LOG_TARGET: &str = "treewalk::walk";

/// Receives diagnostic lines from verbose walk lists. Shared by every walk on every thread.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, message: fmt::Arguments<'_>);
}

impl fmt::Debug for dyn DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiagnosticSink")
    }
}

/// Forwards diagnostics to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, message: fmt::Arguments<'_>) {
        log::info!(target: LOG_TARGET, "{}", message);
    }
}

/// Keeps every diagnostic line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, message: fmt::Arguments<'_>) {
        let line = message.to_string();
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_lines() {
        let sink = MemorySink::new();
        sink.emit(format_args!("{}: {}", 1, "Up()"));
        sink.emit(format_args!("done"));
        assert_eq!(sink.lines(), vec!["1: Up()".to_string(), "done".to_string()]);
    }

    #[test]
    fn test_log_sink_does_not_panic_without_logger() {
        LogSink.emit(format_args!("nobody listens"));
    }
}
