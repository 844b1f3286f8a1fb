use std::sync::Arc;

/// Global loading indicator shown around a request's lifetime.
///
/// Purely observational; never affects the request outcome.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self, text: &str);
    fn hide(&self);
}

/// No-op indicator for headless use and tests.
pub struct NoopLoading;

impl LoadingIndicator for NoopLoading {
    fn show(&self, _text: &str) {}
    fn hide(&self) {}
}

/// Shows the indicator on creation and hides it on drop, so every exit path hides it.
pub struct LoadingGuard {
    indicator: Arc<dyn LoadingIndicator>,
}

impl LoadingGuard {
    pub fn new(indicator: Arc<dyn LoadingIndicator>, text: &str) -> Self {
        indicator.show(text);
        Self { indicator }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}
