//! In-memory event capture for logging assertions in tests
//!
//! Events are indexed by the correlation fields the timeline builder emits
//! (`op`, `run_id`, `step_id`) so a test can pick out its own run even when
//! other tests log through the same process-wide subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use liquidsim_core_types::schema::{
    FIELD_ERR_CODE, FIELD_EVENT, FIELD_OP, FIELD_RUN_ID, FIELD_STEP_ID,
};

/// One captured log event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub run_id: Option<String>,
    pub step_id: Option<String>,
    /// `err.code` of a failed step
    pub err_code: Option<String>,
    /// Every field, rendered as text
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

// Strings are kept unquoted; everything else goes through `Debug`.
#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let fields = visitor.0;
        let get = |key: &str| fields.get(key).cloned();

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: get(FIELD_OP),
            event: get(FIELD_EVENT),
            run_id: get(FIELD_RUN_ID),
            step_id: get(FIELD_STEP_ID),
            err_code: get(FIELD_ERR_CODE),
            fields,
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Handle for reading captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn matching(&self, keep: impl Fn(&CapturedEvent) -> bool) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| keep(e)).collect()
    }

    /// Events for one operation, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.op.as_deref() == Some(op))
    }

    /// Events sharing one timeline run id
    pub fn events_for_run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.run_id.as_deref() == Some(run_id))
    }

    /// Events that name a step
    pub fn events_for_step(&self, step_id: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.step_id.as_deref() == Some(step_id))
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Assert that `op` emitted an event of kind `event`
    ///
    /// # Panics
    ///
    /// Panics if no such event was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={op} event={event} not found in {} captured events",
            events.len()
        );
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once per process)
///
/// ```
/// use liquidsim_core::logging_facility::test_capture::init_test_capture;
/// use liquidsim_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op", run_id = "doc-run");
/// capture.assert_event_exists("doc_capture_op", "start");
/// assert_eq!(capture.events_for_run("doc-run").len(), 1);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CommandCreatorError;

    #[test]
    fn test_failed_step_is_indexed_by_run_and_step() {
        let capture = init_test_capture();
        let errors = vec![CommandCreatorError::insufficient_tips("p300")];
        crate::log_op_error!(
            "capture_unit_op",
            "capture-step",
            errors,
            duration_ms = 1,
            run_id = "capture-run"
        );

        let events = capture.events_for_step("capture-step");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].run_id.as_deref(), Some("capture-run"));
        assert_eq!(events[0].err_code.as_deref(), Some("INSUFFICIENT_TIPS"));
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].fields.get("error_count"), Some(&"1".to_string()));
    }

    #[test]
    fn test_empty_error_list_logs_nothing() {
        let capture = init_test_capture();
        let errors: Vec<CommandCreatorError> = Vec::new();
        crate::log_op_error!("capture_empty_op", "quiet-step", errors, duration_ms = 0);

        assert!(capture.events_for_op("capture_empty_op").is_empty());
    }
}
