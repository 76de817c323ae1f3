//! Type aliases for commonly used complex types.
//!
//! Shared state in SpectroPlot crosses threads (the link monitor runs on its
//! own thread), so everything here is `Send + Sync`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spectroplot_core::types::*;
//!
//! // Instead of: Arc<Mutex<Vec<String>>>
//! let queue: ThreadSafe<Vec<String>> = thread_safe(Vec::new());
//! ```

use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Cooperative cancellation flag checked by blocking waits.
///
/// Set it to `true` from any thread to abort the wait.
pub type CancelFlag = Arc<AtomicBool>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create an unset cancellation flag.
#[inline]
pub fn cancel_flag() -> CancelFlag {
    Arc::new(AtomicBool::new(false))
}
