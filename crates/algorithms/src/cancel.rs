//! Cooperative cancellation for long-running evaluations.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use airsurf_core::{Error, Result};

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a caller can keep one handle and pass
/// another into an evaluation running on a different thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Error::Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        assert!(other.check().is_ok());

        token.cancel();
        assert!(other.is_cancelled());
        assert_eq!(other.check(), Err(Error::Cancelled));
    }

    #[test]
    fn test_visible_across_threads() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
