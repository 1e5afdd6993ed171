// src/report.rs

//! Fire-and-forget interaction tracking.
//! Reporting never blocks rotation or rendering, never retries, and never
//! surfaces a failure to its caller.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, WidgetError};
use crate::http::track_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    View,
    Click,
    Dismiss,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Click => "click",
            EventKind::Dismiss => "dismiss",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    pub widget_id: String,
    pub kind: EventKind,
}

/// Body of `POST /api/widget/{widgetId}/track`
#[derive(Debug, Serialize)]
struct TrackBody {
    #[serde(rename = "type")]
    kind: EventKind,
}

/// Delivery channel for tracking events. `dispatch` must return immediately.
pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: TrackEvent);
}

/// Posts events to the widget API on detached tokio tasks
#[derive(Clone)]
pub struct HttpEventSink {
    client: reqwest::Client,
    api_base: String,
}

impl HttpEventSink {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    async fn post(client: reqwest::Client, api_base: String, event: TrackEvent) -> Result<()> {
        let url = track_url(&api_base, &event.widget_id)
            .map_err(|e| WidgetError::Reporting(e.to_string()))?;
        client
            .post(url)
            .json(&TrackBody { kind: event.kind })
            .send()
            .await
            .map_err(|e| WidgetError::Reporting(e.to_string()))?;
        // Response status and body are not inspected
        Ok(())
    }
}

impl EventSink for HttpEventSink {
    fn dispatch(&self, event: TrackEvent) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    "Tracking {} for {} dropped: no async runtime",
                    event.kind, event.widget_id
                );
                return;
            }
        };

        let client = self.client.clone();
        let api_base = self.api_base.clone();
        runtime.spawn(async move {
            let widget_id = event.widget_id.clone();
            let kind = event.kind;
            if let Err(e) = Self::post(client, api_base, event).await {
                warn!("Tracking {} for {} failed: {}", kind, widget_id, e);
            }
        });
    }
}

/// Sink that drops every event
pub struct NullSink;

impl EventSink for NullSink {
    fn dispatch(&self, _event: TrackEvent) {}
}

/// Reports widget lifecycle and interaction events
#[derive(Clone)]
pub struct EventReporter {
    sink: Arc<dyn EventSink>,
}

impl EventReporter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NullSink))
    }

    pub fn report(&self, widget_id: &str, kind: EventKind) {
        debug!("Tracking {} for widget {}", kind, widget_id);
        self.sink.dispatch(TrackEvent {
            widget_id: widget_id.to_string(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<TrackEvent>>,
    }

    impl EventSink for CollectingSink {
        fn dispatch(&self, event: TrackEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_track_body_shape() {
        let body = serde_json::to_string(&TrackBody { kind: EventKind::Dismiss }).unwrap();
        assert_eq!(body, r#"{"type":"dismiss"}"#);
    }

    #[test]
    fn test_reporter_forwards_to_sink() {
        let sink = Arc::new(CollectingSink::default());
        let reporter = EventReporter::new(sink.clone());
        reporter.report("w1", EventKind::View);
        reporter.report("w1", EventKind::Click);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TrackEvent { widget_id: "w1".to_string(), kind: EventKind::View });
        assert_eq!(events[1].kind, EventKind::Click);
    }

    #[test]
    fn test_http_sink_without_runtime_does_not_panic() {
        let sink = HttpEventSink::new(reqwest::Client::new(), "http://127.0.0.1:9");
        sink.dispatch(TrackEvent { widget_id: "w1".to_string(), kind: EventKind::View });
    }

    #[tokio::test]
    async fn test_post_failure_is_reporting_error() {
        let event = TrackEvent { widget_id: "w1".to_string(), kind: EventKind::View };
        let result = HttpEventSink::post(reqwest::Client::new(), "not a url".to_string(), event).await;
        assert!(matches!(result, Err(WidgetError::Reporting(_))));
    }

    #[tokio::test]
    async fn test_http_sink_failure_is_swallowed() {
        // Nothing listens on the discard port; the spawned task logs and ends
        let sink = HttpEventSink::new(reqwest::Client::new(), "http://127.0.0.1:9");
        sink.dispatch(TrackEvent { widget_id: "w1".to_string(), kind: EventKind::Click });
        tokio::task::yield_now().await;
    }
}
