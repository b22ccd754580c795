//! Logging sinks for fault reports.
//!
//! Boundaries receive a sink handle at construction time. The process
//! default is [`TracingSink`]; tests inject a [`MemorySink`] and inspect
//! what was reported without touching any global state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::kind::FaultKind;

/// A single warning-level fault report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultRecord {
    /// Log message supplied by the boundary (may be empty).
    pub message: String,
    /// Kind of the reported fault.
    pub kind: FaultKind,
    /// Subsystem label bound on the fault, if any.
    pub system: Option<String>,
    /// Display form of the wrapped cause.
    pub error: String,
    /// Display form of the innermost cause in the chain.
    pub root: String,
}

/// Destination for fault reports. Implementations must tolerate
/// concurrent writers.
pub trait FaultSink: Send + Sync {
    /// Record one warning-level fault report.
    fn warn(&self, record: FaultRecord);
}

/// Sink that forwards every record to `tracing` at `WARN` level.
///
/// `system` is the process-wide label bound at startup; it is used for
/// records whose fault carries no label of its own.
#[derive(Debug, Clone)]
pub struct TracingSink {
    system: String,
}

impl TracingSink {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Wrap into the shared handle boundaries expect.
    pub fn shared(system: impl Into<String>) -> Arc<dyn FaultSink> {
        Arc::new(Self::new(system))
    }
}

impl FaultSink for TracingSink {
    fn warn(&self, record: FaultRecord) {
        let system = record.system.as_deref().unwrap_or(&self.system);
        tracing::warn!(
            system = %system,
            kind = %record.kind,
            error = %record.error,
            root = %record.root,
            "{}",
            record.message
        );
    }
}

/// In-memory sink that keeps every record for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    system: Option<String>,
    records: Arc<Mutex<Vec<FaultRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that fills in `system` for records without a label.
    pub fn with_system(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            records: Arc::default(),
        }
    }

    /// Snapshot of every record so far, oldest first.
    pub fn records(&self) -> Vec<FaultRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FaultRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaultSink for MemorySink {
    fn warn(&self, mut record: FaultRecord) {
        if record.system.is_none() {
            record.system.clone_from(&self.system);
        }
        self.lock().push(record);
    }
}
