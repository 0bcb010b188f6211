//! Versioned reactive cells.
//!
//! A [`Signal`] is a mutable cell with a version counter that advances on every
//! write and a list of listeners notified after the write is published. A
//! [`Memo`] caches a derived value together with the dependency versions it was
//! computed from and recomputes only when one of them advances.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    value: RwLock<(T, u64)>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener: AtomicU64,
}

/// Shared mutable cell with a version counter.
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.value.read();
        f.debug_struct("Signal")
            .field("value", &guard.0)
            .field("version", &guard.1)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Create a signal at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                value: RwLock::new((value, 0)),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.inner.value.read().0.clone()
    }

    /// Current value and the version it belongs to, read atomically.
    pub fn snapshot(&self) -> (T, u64) {
        let guard = self.inner.value.read();
        (guard.0.clone(), guard.1)
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.inner.value.read().1
    }

    /// Replace the value, advance the version and notify listeners.
    ///
    /// Listeners run after the write lock is released, so they may read the
    /// signal (or others) freely.
    pub fn set(&self, value: T) {
        let notified = {
            let mut guard = self.inner.value.write();
            guard.0 = value;
            guard.1 += 1;
            guard.0.clone()
        };
        self.notify(&notified);
    }

    /// Modify the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let notified = {
            let mut guard = self.inner.value.write();
            f(&mut guard.0);
            guard.1 += 1;
            guard.0.clone()
        };
        self.notify(&notified);
    }

    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        let weak: Weak<SignalInner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.listeners.lock().retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Guard for a signal listener; unsubscribes on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Cached derived value keyed by dependency versions.
pub struct Memo<T> {
    cached: RwLock<Option<(Vec<u64>, Arc<T>)>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            cached: RwLock::new(None),
        }
    }
}

impl<T> Memo<T> {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if it was derived from exactly `versions`,
    /// otherwise compute, cache and return a fresh one.
    pub fn get_or_compute(&self, versions: &[u64], compute: impl FnOnce() -> T) -> Arc<T> {
        if let Some((cached_versions, value)) = self.cached.read().as_ref()
            && cached_versions.as_slice() == versions
        {
            return Arc::clone(value);
        }

        let mut guard = self.cached.write();
        // Another caller may have recomputed while we waited for the lock
        if let Some((cached_versions, value)) = guard.as_ref()
            && cached_versions.as_slice() == versions
        {
            return Arc::clone(value);
        }
        let value = Arc::new(compute());
        *guard = Some((versions.to_vec(), Arc::clone(&value)));
        value
    }

    /// Versions the cached value was derived from, if any.
    pub fn cached_versions(&self) -> Option<Vec<u64>> {
        self.cached.read().as_ref().map(|(v, _)| v.clone())
    }

    /// Drop the cached value.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }
}
