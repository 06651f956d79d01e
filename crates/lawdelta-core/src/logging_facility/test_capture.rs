//! In-memory event capture for logging assertions in tests
//!
//! Every field is stored as its rendered string, so assertions compare
//! `"42"` rather than typed values.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::schema::{FIELD_EVENT, FIELD_OP};

#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    /// `start`, `end` or `end_error` for boundary events
    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

/// Strings are kept verbatim; everything else, numbers included, through
/// its `Debug` rendering.
struct Fields<'a>(&'a mut HashMap<String, String>);

impl Visit for Fields<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut Fields(&mut fields));
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(CapturedEvent {
                level: *event.metadata().level(),
                fields,
            });
        }
    }
}

/// Read handle onto the captured events
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Events for one operation name, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.op() == Some(op))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.buffer
            .lock()
            .map(|events| events.iter().filter(|e| predicate(e)).count())
            .unwrap_or_default()
    }

    /// # Panics
    ///
    /// Panics if no `op`/`event` pair was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let found = self.count_events(|e| e.is(op, event));
        assert!(found > 0, "Expected event op={op} event={event} was not captured");
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the process-wide subscriber on first use and
/// return a handle to it.
///
/// The buffer is shared by every test in the binary, so assertions filter on
/// an operation name or a document number that is unique to the test.
///
/// ```
/// use lawdelta_core::logging_facility::test_capture::init_test_capture;
/// use lawdelta_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_example");
/// capture.assert_event_exists("doc_capture_example", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            tracing_subscriber::registry()
                .with(CaptureLayer {
                    buffer: buffer.clone(),
                })
                .init();
            TestCapture { buffer }
        })
        .clone()
}
