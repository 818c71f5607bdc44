//! Destinations for diagnostic records.

use std::sync::{Arc, Mutex};

use crate::Level;

/// Receives every record that passes level and silencing filters.
pub trait LogSink: Send + Sync {
    fn record(&self, logger: &str, level: Level, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str, Level, &str) + Send + Sync,
{
    fn record(&self, logger: &str, level: Level, message: &str) {
        self(logger, level, message)
    }
}

/// Forwards to the `log` facade, using the logger name as target.
pub(crate) struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn record(&self, logger: &str, level: Level, message: &str) {
        log::log!(target: logger, level.into(), "{}", message);
    }
}

/// A captured diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub logger: String,
    pub level: Level,
    pub message: String,
}

/// In-memory sink that keeps every record it receives.
///
/// Clones share the same buffer, so one clone can be installed with
/// [`Diagnostics::set_sink`](crate::Diagnostics::set_sink) and another kept
/// around for inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Records emitted at the given level.
    pub fn at_level(&self, level: Level) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl LogSink for RecordingSink {
    fn record(&self, logger: &str, level: Level, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Record {
                logger: logger.to_string(),
                level,
                message: message.to_string(),
            });
    }
}
