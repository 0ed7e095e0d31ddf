//! Cooperative cancellation for navigation requests.
//!
//! The host invalidates an in-flight request by flipping a shared flag;
//! resolution code checks the flag at every step boundary and unwinds to
//! the silent no-result sentinel. Cancellation is not an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a request's cancellation flag.
///
/// All clones observe the same flag. A fresh token is live.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Requests cancellation; observed by every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `None` once cancellation has been requested, so callers can abort
    /// with `token.guard()?` inside `Option`-returning resolution code.
    pub fn guard(&self) -> Option<()> {
        if self.is_cancelled() { None } else { Some(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn fresh_token_is_live() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.guard(), Some(()));
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.guard(), None);
    }
}
