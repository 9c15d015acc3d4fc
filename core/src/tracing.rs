//! Tracing utilities for query construction, result caching and record bookkeeping.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and the model it selects.
///
/// ```ignore
/// quarry_trace_query!(&sql, spec.model());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($sql:expr, $model:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, model = %$model, "quarry.query");
    };
}

/// Emit a debug-level tracing event for result-cache lifecycle (fill, clear, hydrate).
///
/// ```ignore
/// quarry_trace_cache!("fill", spec.model(), ids.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_cache {
    ($event:literal, $model:expr, $count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(event = $event, model = %$model, count = $count, "quarry.cache");
    };
}

/// Emit an info-level tracing event for persisted query records (create, race, sweep).
///
/// ```ignore
/// quarry_trace_record!("created", &description);
/// ```
#[macro_export]
macro_rules! quarry_trace_record {
    ($event:literal, $description:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, description = %$description, "quarry.record");
    };
}

/// Emit a trace-level event when input is silently narrowed (caps, dropped enum values).
///
/// ```ignore
/// quarry_trace_truncate!("max_array", key, before, after);
/// ```
#[macro_export]
macro_rules! quarry_trace_truncate {
    ($limit:literal, $key:expr, $before:expr, $after:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            limit = $limit,
            key = %$key,
            before = $before,
            after = $after,
            "quarry.truncate"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (&$key, &$before, &$after);
    };
}
