use std::future::Future;
use std::time::{Duration, SystemTime};
use tracing::info;

/// Await `operation` and log how long it took under `metric_name`.
///
/// The duration is logged whether the operation succeeds or fails; on success
/// `trace_log_fn` may add a short description of the result.
pub async fn measure_dur_async<F, Fut, T, E>(
    metric_name: &str,
    operation: F,
    trace_log_fn: Option<fn(&T) -> String>,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = SystemTime::now();
    let result = operation().await;
    let dur = start.elapsed().unwrap_or_else(|_| Duration::from_millis(0));
    let log_line = match &result {
        Ok(r) => trace_log_fn.map(|f| f(r)).unwrap_or_default(),
        Err(_) => "failed".to_string(),
    };
    info!("{} | {}, took={}", metric_name, log_line, dur.as_millis());
    result
}
