//! Object pooling subsystem.
//!
//! # Data Flow
//! ```text
//! handler start
//!     → Pool::acquire()  (pop from free list, or build a fresh value)
//!     → Pooled<T>         (exclusive owning handle, Deref/DerefMut)
//!     → handler mutates the value
//!     → Pooled::release() or drop
//!         → Reusable::reset()
//!         → push back onto the free list
//! ```
//!
//! # Design Decisions
//! - Unbounded free list; contention allocates instead of waiting
//! - Release consumes the handle, so a released value cannot be read again
//!   and cannot be released twice
//! - Values are reset on the way back in, so `acquire` always hands out a
//!   zeroed value
//! - Internally synchronized; callers never lock

pub mod client;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

pub use client::{ClientPool, HttpClient};

/// A value that can be returned to a [`Pool`] and handed out again.
pub trait Reusable: Send + 'static {
    /// Restore every field to its zero value.
    fn reset(&mut self);
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

struct Shared<T> {
    free: Mutex<Vec<T>>,
    factory: Factory<T>,
    created: AtomicUsize,
}

/// A shared free list of reusable values.
///
/// Cloning a `Pool` is cheap and yields a handle to the same free list.
pub struct Pool<T: Reusable> {
    shared: Arc<Shared<T>>,
}

impl<T: Reusable> Pool<T> {
    /// Create a pool that builds new values with `factory` when empty.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                free: Mutex::new(Vec::new()),
                factory: Box::new(factory),
                created: AtomicUsize::new(0),
            }),
        }
    }

    /// Check a value out of the pool.
    pub fn acquire(&self) -> Pooled<T> {
        let recycled = self.shared.free.lock().pop();
        let value = match recycled {
            Some(value) => value,
            None => {
                self.shared.created.fetch_add(1, Ordering::Relaxed);
                (self.shared.factory)()
            }
        };

        Pooled {
            value: Some(value),
            pool: self.shared.clone(),
        }
    }

    /// Return a value to the pool. Equivalent to dropping the handle.
    pub fn release(&self, item: Pooled<T>) {
        item.release();
    }

    /// Number of values currently parked in the free list.
    pub fn idle(&self) -> usize {
        self.shared.free.lock().len()
    }

    /// Number of values the factory has built over the pool's lifetime.
    pub fn created(&self) -> usize {
        self.shared.created.load(Ordering::Relaxed)
    }
}

impl<T: Reusable + Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: Reusable> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Reusable> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("created", &self.created())
            .finish()
    }
}

/// Exclusive handle to a pooled value.
///
/// The value goes back to its pool (reset) when the handle is released or
/// dropped.
pub struct Pooled<T: Reusable> {
    value: Option<T>,
    pool: Arc<Shared<T>>,
}

impl<T: Reusable> Pooled<T> {
    /// Return the value to its pool.
    pub fn release(self) {
        drop(self);
    }

    /// Take the value out of the pool for good.
    pub fn detach(mut self) -> T {
        // Always Some until drop.
        match self.value.take() {
            Some(value) => value,
            None => unreachable!("pooled value taken twice"),
        }
    }
}

impl<T: Reusable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value read after release"),
        }
    }
}

impl<T: Reusable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value written after release"),
        }
    }
}

impl<T: Reusable> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(mut value) = self.value.take() {
            value.reset();
            self.pool.free.lock().push(value);
        }
    }
}

impl<T: Reusable + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: Reusable + serde::Serialize> serde::Serialize for Pooled<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (**self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        hits: u32,
        tag: String,
    }

    impl Reusable for Counter {
        fn reset(&mut self) {
            self.hits = 0;
            self.tag.clear();
        }
    }

    #[test]
    fn test_release_resets_and_recycles() {
        let pool: Pool<Counter> = Pool::default();

        let mut item = pool.acquire();
        item.hits = 7;
        item.tag.push_str("dirty");
        pool.release(item);

        assert_eq!(pool.idle(), 1);

        let item = pool.acquire();
        assert_eq!(item.hits, 0);
        assert!(item.tag.is_empty());
        assert_eq!(pool.created(), 1);
    }

    #[test]
    fn test_drop_returns_to_pool() {
        let pool: Pool<Counter> = Pool::default();
        {
            let _a = pool.acquire();
            let _b = pool.acquire();
        }
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.created(), 2);
    }

    #[test]
    fn test_detach_leaves_pool() {
        let pool: Pool<Counter> = Pool::default();
        let mut item = pool.acquire();
        item.hits = 3;

        let owned = item.detach();
        assert_eq!(owned.hits, 3);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_concurrent_checkout() {
        let pool: Pool<Counter> = Pool::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let mut item = pool.acquire();
                        assert_eq!(item.hits, 0);
                        item.hits = i;
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.created() <= 8);
        assert_eq!(pool.idle(), pool.created());
    }
}
