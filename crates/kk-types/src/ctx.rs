use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cancellation scope threaded through every blocking call.
///
/// A command opens a root scope and wires the interrupt signal to
/// [`Ctx::cancel`]; deadlines are child scopes that fire on their own. A
/// cancelled parent cancels all children, never the reverse.
#[derive(Debug, Clone)]
pub struct Ctx {
    token: CancellationToken,
}

impl Ctx {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the scope is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub fn child(&self) -> Ctx {
        Ctx {
            token: self.token.child_token(),
        }
    }

    /// Child scope that additionally cancels itself after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Ctx {
        let child = self.token.child_token();
        let timer = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(timeout) => timer.cancel(),
            }
        });
        Ctx { token: child }
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_propagates_to_children() {
        let root = Ctx::new();
        let child = root.child();
        assert!(!child.is_cancelled());
        root.cancel();
        child.cancelled().await;
        assert!(child.is_cancelled());
        assert!(root.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_cancel_leaves_parent_alive() {
        let root = Ctx::new();
        let child = root.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let root = Ctx::new();
        let scoped = root.with_timeout(Duration::from_secs(5));
        assert!(!scoped.is_cancelled());
        tokio::time::sleep(Duration::from_secs(6)).await;
        scoped.cancelled().await;
        assert!(!root.is_cancelled());
    }
}
