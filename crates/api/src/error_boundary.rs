//! Error boundary for fallible handler bodies.
//!
//! [`error_boundary`] awaits a future and, if it fails, records the failure
//! with the monitoring context and returns a fallback value instead. Panics
//! are handled separately by the router's `CatchPanicLayer`.

use std::fmt::Display;
use std::future::Future;

use jobs2go_events::MonitoringService;

/// Await `future`; on `Err`, track the error under `context` and return
/// `fallback(&err)`.
pub async fn error_boundary<T, E, Fut, Fb>(
    monitoring: &MonitoringService,
    context: &str,
    future: Fut,
    fallback: Fb,
) -> T
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    Fb: FnOnce(&E) -> T,
{
    match future.await {
        Ok(value) => value,
        Err(err) => {
            let mut details = serde_json::Map::new();
            details.insert("context".into(), context.into());
            monitoring.track_error(err.to_string(), details).await;
            fallback(&err)
        }
    }
}
