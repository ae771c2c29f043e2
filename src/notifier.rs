use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// One-shot broadcast signal.
///
/// `fire` flips the flag exactly once and wakes every waiter, whether it is
/// parked on the condvar (a thread) or on `Notify` (a tokio task). A waiter
/// that arrives after the fire sees the flag and returns immediately.
pub struct Notifier {
    fired: Mutex<bool>,
    cond: Condvar,
    notify: Notify,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            fired: Mutex::new(false),
            cond: Condvar::new(),
            notify: Notify::new(),
        }
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Releases all waiters. Returns `false` if the signal had already fired.
    pub fn fire(&self) -> bool {
        let mut fired = self.flag();
        if *fired {
            return false;
        }
        *fired = true;
        drop(fired);

        self.cond.notify_all();
        self.notify.notify_waiters();
        true
    }

    pub fn is_fired(&self) -> bool {
        *self.flag()
    }

    /// Blocks the current thread until the signal fires or `timeout` elapses.
    /// Returns whether it fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let fired = self.flag();
        let (fired, _) = self
            .cond
            .wait_timeout_while(fired, timeout, |fired| !*fired)
            .unwrap_or_else(PoisonError::into_inner);
        *fired
    }

    /// Async counterpart of [`Notifier::wait_timeout`].
    pub async fn wait_timeout_async(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent fire cannot slip between.
            notified.as_mut().enable();
            if self.is_fired() {
                return true;
            }

            let remaining = timeout.saturating_sub(start.elapsed());
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return self.is_fired();
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fire_releases_blocked_thread() {
        let signal = Arc::new(Notifier::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(50));
        assert!(signal.fire());
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn late_waiter_returns_immediately() {
        let signal = Notifier::new();
        signal.fire();

        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn fires_only_once() {
        let signal = Notifier::new();
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn wait_times_out_without_fire() {
        let signal = Notifier::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn fire_releases_async_waiter() {
        let signal = Arc::new(Notifier::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait_timeout_async(Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        signal.fire();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn async_wait_times_out() {
        let signal = Notifier::new();
        assert!(!signal.wait_timeout_async(Duration::from_millis(30)).await);
    }
}
