//! Store request metrics collection.

use metrics::histogram;
use std::time::Instant;

/// Record the duration of one store request.
pub fn record_request_duration(request_name: &str, duration_secs: f64) {
    histogram!(
        "store_request_duration_seconds",
        "request" => request_name.to_string()
    )
    .record(duration_secs);
}

/// Times a store request and records its duration on drop-by-`record`.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_user_by_email");
/// let result = store.select("users", "*", &filters, None, Some(1)).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    request_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(request_name: impl Into<String>) -> Self {
        Self {
            request_name: request_name.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_request_duration(&self.request_name, duration);
    }
}
