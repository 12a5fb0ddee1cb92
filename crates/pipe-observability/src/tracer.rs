// tracer.rs — Lightweight spans for timing pipeline operations.
//
// Spans are plain values: the caller owns them, tags them, and hands them
// back to `Tracer::end_span`. Start and end are reported as debug events so
// a JSON log stream doubles as a trace stream.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::Component;

/// Terminal status of a span that finished normally.
pub const STATUS_OK: &str = "ok";
/// Terminal status of a span whose operation failed.
pub const STATUS_ERROR: &str = "error";
const STATUS_STARTED: &str = "started";

/// A named point in time inside a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

/// One timed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub operation: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,
}

impl Span {
    pub fn tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn add_event(&mut self, name: impl Into<String>) {
        self.events.push(SpanEvent {
            name: name.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Creates and finishes spans, logging both ends.
#[derive(Debug, Clone)]
pub struct Tracer {
    component: Component,
}

impl Tracer {
    /// A tracer logging under `<parent>.tracer`.
    pub fn new(parent: &Component) -> Self {
        Self {
            component: parent.child("tracer"),
        }
    }

    /// Start a span. A fresh trace id is generated when `trace_id` is `None`.
    pub fn start_span(&self, operation: &str, trace_id: Option<&str>) -> Span {
        let trace_id = match trace_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        let span = Span {
            trace_id,
            span_id: Uuid::new_v4().to_string(),
            parent_id: None,
            operation: operation.to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            tags: BTreeMap::new(),
            status: STATUS_STARTED.to_string(),
            events: Vec::new(),
        };
        tracing::debug!(
            component = %self.component,
            trace_id = %span.trace_id,
            span_id = %span.span_id,
            op = operation,
            "span started"
        );
        span
    }

    /// Start a span in the same trace as `parent`, linked to it.
    pub fn start_child(&self, parent: &Span, operation: &str) -> Span {
        let mut span = self.start_span(operation, Some(&parent.trace_id));
        span.parent_id = Some(parent.span_id.clone());
        span
    }

    /// Finish `span` with `status` and record its duration.
    pub fn end_span(&self, span: &mut Span, status: &str) {
        let end = Utc::now();
        let duration_ms = (end - span.start_time).num_milliseconds().max(0);
        span.end_time = Some(end);
        span.duration_ms = Some(duration_ms);
        span.status = status.to_string();
        tracing::debug!(
            component = %self.component,
            trace_id = %span.trace_id,
            span_id = %span.span_id,
            op = %span.operation,
            duration_ms,
            status,
            "span ended"
        );
    }
}
