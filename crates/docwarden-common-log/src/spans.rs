//! Span helpers for document operations.

use std::future::Future;
use tracing::{info_span, Instrument, Span};

/// Create a span for a caller-facing document operation.
pub fn document_span(operation: &str, path: &str, caller: Option<&str>) -> Span {
    info_span!(
        "document",
        op = %operation,
        path = %path,
        caller = caller.unwrap_or("anonymous"),
        error = tracing::field::Empty
    )
}

/// Create a span for an emulator lifecycle step (rule reload, data reset).
pub fn emulator_span(project_id: &str, step: &str) -> Span {
    info_span!("emulator", project = %project_id, step = %step)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    // Helper to capture tracing output for testing
    fn with_subscriber<F>(f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_span_nesting() {
        with_subscriber(|| {
            let emulator = emulator_span("emulator-rules", "load_rules");
            let _guard1 = emulator.enter();

            let document = document_span("get", "users/user_abc", Some("user_abc"));
            let _guard2 = document.enter();

            tracing::info!("nested operation");
        });
    }

    #[test]
    fn test_error_recording() {
        with_subscriber(|| {
            let span = document_span("delete", "todos/form123", None);
            let _guard = span.enter();

            let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
            record_error(&error);
        });
    }

    #[tokio::test]
    async fn test_context_propagation_across_async() {
        let outer = emulator_span("emulator-rules", "clear_data");
        let future = async {
            let inner = document_span("set", "todos/form123", Some("user_abc"));
            instrument_future(async { tracing::info!("inner") }, inner).await;
        };
        instrument_future(future, outer).await;
    }
}
