use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way progress notifications, delivered at per-folder/per-item
/// granularity. The shell that owns the engine decides how to render them.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, message: &str, percent: f32);
}

impl<F> ProgressSink for F
where
    F: Fn(&str, f32) + Send + Sync,
{
    fn progress(&self, message: &str, percent: f32) {
        self(message, percent)
    }
}

/// Sink for headless runs and tests.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn progress(&self, _message: &str, _percent: f32) {}
}

/// Cooperative cancellation handle. Engines poll it between folder/item
/// iterations; an in-flight file operation is always allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
