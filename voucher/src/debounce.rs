//! Trailing-edge debounce with an explicit cancellable handle.
//!
//! Each `schedule` cancels the pending timer (if any) and starts a new one, so
//! at most one callback fires per quiet period. The callback receives its own
//! token: owners that guard state with a lock should re-check
//! `token.is_cancelled()` after taking the lock, since a timer can wake up
//! just as it is being replaced.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending timer and schedule `fire` after the quiet period.
    pub fn schedule<F>(&mut self, runtime: &Handle, fire: F) -> CancellationToken
    where
        F: FnOnce(CancellationToken) + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let delay = self.delay;
        let timer_token = token.clone();
        runtime.spawn(async move {
            let watched = timer_token.clone();
            tokio::select! {
                _ = watched.cancelled() => {}
                _ = tokio::time::sleep(delay) => fire(timer_token),
            }
        });

        token
    }

    /// Cancel the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Claim the pending slot for a timer that just fired.
    ///
    /// Returns `false` if `token` was replaced or cancelled in the meantime, in
    /// which case the caller must drop its result. Every replacement cancels
    /// the previous token, so an uncancelled token is always the pending one.
    pub fn complete(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
