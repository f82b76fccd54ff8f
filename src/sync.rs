//! Poison-recovering lock helpers.
//!
//! The crate keeps a few process-wide caches (parsed colors, measured text
//! widths) and the logger writes through a shared sink. All of them hold
//! data that is safe to reuse after a panicking thread released the lock:
//! a stale cache entry or a half-written log line is preferable to
//! aborting a layout run.
//!
//! | Scenario | Function |
//! |----------|----------|
//! | Production code | [`lock_recover`] |
//! | Need context while debugging | [`lock_recover_debug`] |
//! | Test code | `.lock().unwrap()` |

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poison if necessary.
///
/// # Example
///
/// ```rust
/// use std::sync::Mutex;
/// use pagegrid::sync::lock_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_recover(&mutex);
/// assert_eq!(*guard, 42);
/// ```
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Lock a mutex and report poison recovery in debug builds.
///
/// `context` names the call site (e.g. `"Color::parse cache"`).
#[inline]
pub fn lock_recover_debug<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        #[cfg(debug_assertions)]
        eprintln!("[pagegrid::sync] mutex poison recovered at: {context}");
        #[cfg(not(debug_assertions))]
        let _ = context;
        e.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_recover_normal() {
        let mutex = Mutex::new(vec![1, 2, 3]);
        let guard = lock_recover(&mutex);
        assert_eq!(*guard, vec![1, 2, 3]);
    }

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(mutex.is_poisoned());
        let guard = lock_recover(&mutex);
        assert_eq!(*guard, 7);
    }

    #[test]
    fn test_lock_recover_debug_returns_value() {
        let mutex = Mutex::new("cache");
        let guard = lock_recover_debug(&mutex, "test");
        assert_eq!(*guard, "cache");
    }
}
