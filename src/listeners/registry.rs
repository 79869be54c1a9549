use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

struct Entry<T> {
    id: u64,
    active: AtomicBool,
    callback: Callback<T>,
}

struct Inner<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Arc<Entry<T>>>>,
}

/// Removal side of a registry, erased so `Subscription` stays non-generic
trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T: 'static> Detach for Inner<T> {
    fn detach(&self, id: u64) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
            let entry = entries.remove(pos);
            // A dispatch round may still hold a snapshot containing this entry
            entry.active.store(false, Ordering::SeqCst);
        }
    }
}

/// Ordered list of callbacks for one event category.
///
/// Callbacks run synchronously in registration order. The lock is released
/// before any callback runs, so callbacks may subscribe or unsubscribe.
pub struct ListenerRegistry<T> {
    inner: Arc<Inner<T>>,
}

impl<T: 'static> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a callback. The returned [`Subscription`] removes exactly this one.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(Entry {
            id,
            active: AtomicBool::new(true),
            callback: Arc::new(callback),
        });

        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);

        let detach: Weak<dyn Detach> = Arc::downgrade(&self.inner) as Weak<dyn Detach>;
        Subscription { registry: detach, id }
    }

    /// Invoke every live callback with `value`
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Arc<Entry<T>>> = {
            let entries = self
                .inner
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            entries.clone()
        };

        for entry in snapshot {
            if !entry.active.load(Ordering::SeqCst) {
                continue;
            }
            // Contain listener panics to the listener
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(value)));
            if let Err(payload) = outcome {
                tracing::error!(
                    "Listener {} panicked: {}",
                    entry.id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<T: 'static> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer returned by every `on_*` registration.
///
/// Dropping it keeps the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription {
    registry: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
