// daml-sast-core/src/events.rs
// ============================================================================
// Module: Scan Events
// Description: Structured scan events and JSON-line event sinks.
// Purpose: Record pipeline progress without coupling the core to an output.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The scan pipeline reports progress through [`ScanEventSink`]. Events are
//! serialized as one JSON object per line with a millisecond timestamp. Sinks
//! never fail a scan: write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Pipeline stage reported by a [`ScanEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEventKind {
    /// The archive passed hardening checks and its entries were read.
    ArchiveRead {
        /// Number of `.dalf` entries extracted.
        dalf_entries: usize,
        /// Whether a manifest was present.
        has_manifest: bool,
    },
    /// A package was decoded and version-checked.
    PackageDecoded {
        /// Archive entry path.
        entry: String,
        /// Package id.
        package_id: String,
        /// Declared Daml-LF version.
        lf_version: String,
    },
    /// A package failed lowering and was skipped.
    PackageSkipped {
        /// Archive entry path.
        entry: String,
        /// Lowering failure.
        error: String,
    },
    /// A rule hook failed on a node.
    RuleWarning {
        /// Rule id.
        rule_id: String,
        /// Walker breadcrumb.
        path: String,
        /// Failure detail.
        message: String,
    },
    /// The scan finished.
    ScanCompleted {
        /// Packages analyzed.
        packages: usize,
        /// Findings emitted before filtering.
        findings: usize,
        /// Rule warnings recorded.
        warnings: usize,
    },
}

/// Timestamped scan event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    /// Event timestamp (unix millis).
    pub timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    pub kind: ScanEventKind,
}

impl ScanEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(kind: ScanEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            kind,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for scan events.
pub trait ScanEventSink: Send + Sync {
    /// Record a scan event.
    fn record(&self, event: &ScanEvent);
}

/// Event sink that discards all events.
pub struct NoopEventSink;

impl ScanEventSink for NoopEventSink {
    fn record(&self, _event: &ScanEvent) {}
}

/// Event sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl ScanEventSink for StderrEventSink {
    fn record(&self, event: &ScanEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Event sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ScanEventSink for FileEventSink {
    fn record(&self, event: &ScanEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Event sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<ScanEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded event payloads in arrival order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ScanEventKind> {
        self.events
            .lock()
            .map(|events| events.iter().map(|event| event.kind.clone()).collect())
            .unwrap_or_default()
    }
}

impl ScanEventSink for MemoryEventSink {
    fn record(&self, event: &ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
