//! Bounded log buffer fed by a tracing layer, shown in the log panel.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing_subscriber::Layer;

const MAX_LOG_LINES: usize = 2000;

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now(),
            level,
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// Shared ring buffer; clones see the same lines.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES))),
        }
    }

    /// Push a line, dropping the oldest once full.
    pub fn push(&self, line: LogLine) {
        // A poisoned lock only means a panic mid-push; the deque is still usable.
        let mut buffer = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if buffer.len() >= MAX_LOG_LINES {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }

    /// The last `count` lines, skipping the newest `skip`.
    pub fn tail(&self, count: usize, skip: usize) -> Vec<LogLine> {
        let buffer = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let end = buffer.len().saturating_sub(skip);
        let start = end.saturating_sub(count);
        buffer.range(start..end).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|buffer| buffer.len()).unwrap_or(0)
    }
}

/// Tracing layer that writes into a [`LogBuffer`].
pub struct LogBufferLayer {
    buffer: LogBuffer,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for LogBufferLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.buffer.push(LogLine::new(
            metadata.level().into(),
            metadata.target(),
            visitor.message.unwrap_or_default(),
        ));
    }
}

/// Pulls the `message` field out of an event, or its first field.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" || self.message.is_none() {
            self.message = Some(format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" || self.message.is_none() {
            self.message = Some(value.to_string());
        }
    }
}
