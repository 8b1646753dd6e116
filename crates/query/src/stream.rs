//! Must-close result streams
//!
//! Query results come back as streams that own whatever cursors fed
//! them. Callers should `close()` a stream when done; `Drop` is the
//! safety net for callers that forget, but relying on it delays the
//! release of secondary cursors (the merge path in particular holds two
//! at once).

/// Iterator wrapper with explicit close semantics
pub struct EntityStream<T> {
    inner: Box<dyn Iterator<Item = T> + Send>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
    closed: bool,
}

impl<T: Send + 'static> EntityStream<T> {
    /// Stream over an iterator
    pub fn new(inner: impl Iterator<Item = T> + Send + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            on_close: None,
            closed: false,
        }
    }

    /// Stream over already-materialized items
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::new(items.into_iter())
    }

    /// The empty stream
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Attach a hook to run exactly once when the stream closes
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Close the stream: release the underlying cursor and run the
    /// close hook
    ///
    /// Subsequent `next()` calls return `None`. Closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Dropping the inner iterator here (not at Drop time) is what
        // releases any sub-streams promptly.
        self.inner = Box::new(std::iter::empty());
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }

    /// Keep only items matching the predicate, preserving the close hook
    pub fn filter_items(
        mut self,
        predicate: impl FnMut(&T) -> bool + Send + 'static,
    ) -> EntityStream<T> {
        let hook = self.on_close.take();
        let inner = std::mem::replace(&mut self.inner, Box::new(std::iter::empty()));
        self.closed = true;
        EntityStream {
            inner: Box::new(inner.filter(predicate)),
            on_close: hook,
            closed: false,
        }
    }

    /// Map items, preserving the close hook
    pub fn map_items<U: Send + 'static>(
        mut self,
        f: impl FnMut(T) -> U + Send + 'static,
    ) -> EntityStream<U> {
        let hook = self.on_close.take();
        let inner = std::mem::replace(&mut self.inner, Box::new(std::iter::empty()));
        self.closed = true;
        EntityStream {
            inner: Box::new(inner.map(f)),
            on_close: hook,
            closed: false,
        }
    }
}

impl<T> Iterator for EntityStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.closed {
            return None;
        }
        self.inner.next()
    }
}

impl<T> Drop for EntityStream<T> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Some(hook) = self.on_close.take() {
                hook();
            }
        }
    }
}
