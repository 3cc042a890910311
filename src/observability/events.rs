//! Structured session event stream.
//!
//! Typed events serialized as newline-delimited JSON with a sequence
//! number. Events carry phase and condition information only; survey
//! answers never leave the results export.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::study::{Condition, ConditionOrder};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a study session.
///
/// Serialized with a `"type"` tag so consumers can dispatch on the kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A session was seeded and entered its introduction.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Participant identifier.
        participant_id: String,
        /// Counterbalanced order.
        condition_order: ConditionOrder,
    },

    /// The controller entered a new phase.
    PhaseEntered {
        /// When the transition happened.
        timestamp: DateTime<Utc>,
        /// Participant identifier.
        participant_id: String,
        /// Phase entered (e.g. `"survey[1]"`).
        phase: String,
        /// Active condition, for condition-bound phases.
        condition: Option<Condition>,
    },

    /// A completion was refused; session state is unchanged.
    CompletionRejected {
        /// When the completion arrived.
        timestamp: DateTime<Utc>,
        /// Participant identifier.
        participant_id: String,
        /// Phase the session was in.
        phase: String,
        /// Why it was refused.
        reason: String,
    },

    /// An analysis attempt failed inside a condition view.
    AnalysisFailed {
        /// When the attempt failed.
        timestamp: DateTime<Utc>,
        /// Condition being viewed.
        condition: Condition,
        /// Document being analyzed.
        document: String,
        /// Failure description.
        error: String,
    },

    /// The results file was written.
    ResultsExported {
        /// When the file was written.
        timestamp: DateTime<Utc>,
        /// Participant identifier.
        participant_id: String,
        /// Output path.
        path: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped: the event stream must
/// never interrupt a participant's session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    pub(crate) struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        pub(crate) fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        pub(crate) fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }

        pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
            self.contents()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::SessionStarted {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            participant_id: "p-1".to_owned(),
            condition_order: ConditionOrder::OPAQUE_FIRST,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "SessionStarted");
        assert_eq!(parsed["participant_id"], "p-1");
        assert_eq!(parsed["condition_order"][0], "opaque");
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::ResultsExported {
            timestamp: Utc::now(),
            participant_id: "p-1".to_owned(),
            path: "out.json".to_owned(),
        });

        assert_eq!(emitter.event_count(), 2);

        let lines = tw.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["type"], "ResultsExported");
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let parsed = serde_json::to_value(&envelope).unwrap();
        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "SessionStarted");
        assert!(parsed.get("event").is_none());
    }

    #[test]
    fn noop_emitter_counts_but_discards() {
        let emitter = EventEmitter::noop();
        emitter.emit(sample_event());
        assert_eq!(emitter.event_count(), 1);
    }
}
