use std::sync::{Mutex, PoisonError};

/// Objects that can be handed back to a [`ReusePool`].
pub trait Reusable {
    /// Clears the object so the next `get` observes a fresh value.
    fn reset(&mut self);
}

impl Reusable for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Thread-safe bounded free-list.
///
/// `get` pops a previously returned object or allocates a new one, `put`
/// resets the object and keeps it while the pool holds fewer than `capacity`
/// objects. Objects returned to a full pool are dropped.
pub struct ReusePool<T> {
    capacity: usize,
    items: Mutex<Vec<T>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Reusable> ReusePool<T> {
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            capacity,
            items: Mutex::new(Vec::with_capacity(capacity)),
            factory: Box::new(factory),
        }
    }

    pub fn get(&self) -> T {
        let pooled = self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        pooled.unwrap_or_else(|| (self.factory)())
    }

    pub fn put(&self, mut item: T) {
        item.reset();
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.len() < self.capacity {
            items.push(item);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T> std::fmt::Debug for ReusePool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReusePool")
            .field("capacity", &self.capacity)
            .finish()
    }
}
