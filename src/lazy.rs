//! Single-assignment memoized values.

use std::fmt;

use once_cell::sync::OnceCell;

/// A compute-once cell for expensive derived descriptor data.
///
/// Wraps a zero-argument computation that runs at most once durably; the
/// stored value becomes visible atomically to all subsequent readers and a
/// partial result is never observable. Concurrent first access blocks until
/// the winning computation completes.
///
/// Used for type closures and signatures, which are deterministic and
/// side-effect-free, so a fresh holder recomputing the same value is always
/// equivalent.
///
/// # Examples
///
/// ```rust
/// use canister::LazyValueHolder;
///
/// let holder = LazyValueHolder::new(|| "expensive".len());
/// assert!(holder.try_get().is_none());
/// assert_eq!(*holder.get(), 9);
/// assert_eq!(holder.try_get(), Some(&9));
/// ```
pub struct LazyValueHolder<T> {
    cell: OnceCell<T>,
    compute: Option<Box<dyn Fn() -> T + Send + Sync>>,
}

impl<T> LazyValueHolder<T> {
    /// Creates a holder that runs `compute` on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            compute: Some(Box::new(compute)),
        }
    }

    /// Creates a holder whose value is already known at construction.
    pub fn preset(value: T) -> Self {
        Self {
            cell: OnceCell::with_value(value),
            compute: None,
        }
    }

    /// The stored value, computing it on first access.
    pub fn get(&self) -> &T {
        self.cell.get_or_init(|| match &self.compute {
            Some(compute) => compute(),
            // a holder is always constructed preset or with a computation
            None => unreachable!("lazy holder has neither value nor computation"),
        })
    }

    /// The stored value only if it has already been computed.
    pub fn try_get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Whether the value has been computed.
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyValueHolder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyValueHolder").field(value).finish(),
            None => f.write_str("LazyValueHolder(<uncomputed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn computes_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let holder = LazyValueHolder::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(!holder.is_computed());
        assert_eq!(*holder.get(), 42);
        assert_eq!(*holder.get(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn preset_never_computes() {
        let holder = LazyValueHolder::preset("ready");
        assert!(holder.is_computed());
        assert_eq!(*holder.get(), "ready");
    }

    #[test]
    fn concurrent_first_access_is_single_assignment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let holder = Arc::new(LazyValueHolder::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            7usize
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let holder = holder.clone();
                std::thread::spawn(move || *holder.get())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
