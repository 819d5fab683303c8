use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Hands out preview handles and counts how many are still alive.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, source: impl Into<String>) -> Preview {
        self.live.fetch_add(1, Ordering::SeqCst);
        Preview {
            url: format!("preview://{}", Uuid::now_v7()),
            source: source.into(),
            live: Arc::clone(&self.live),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Revocable local reference to an upload's content. Released on drop.
pub struct Preview {
    url: String,
    source: String,
    live: Arc<AtomicUsize>,
}

impl Preview {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preview").field("url", &self.url).field("source", &self.source).finish()
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(preview = %self.url, source = %self.source, "preview released");
    }
}
