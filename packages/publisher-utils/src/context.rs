//! Per-run call context: cancellation and deadline shared by every remote call.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Carried explicitly into each remote call. Cloning shares the same
/// cancellation token and deadline.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel_token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Drives `fut` to completion unless the token fires or the deadline
    /// passes first, in which case the future is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| Interrupted::DeadlineExceeded),
                None => Ok(fut.await),
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(Interrupted::Cancelled),
            result = bounded => result,
        }
    }
}
