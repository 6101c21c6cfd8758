//! Interruptible waits used for the settle and hold phases.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity at which waits notice cancellation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A shared flag that ends any pending wait once set.
///
/// Cloning shares the flag. [`CancelToken::flag`] exposes it for `signal_hook::flag::register`.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration passed.
    Elapsed,
    /// The awaited condition became true.
    Ready,
    /// The condition never became true within the timeout.
    TimedOut,
    Cancelled,
}

/// Time left until `deadline`, capped at `step`. `None` once the deadline has passed.
///
/// A missing deadline (the duration overflowed `Instant`) never expires.
fn next_step(deadline: Option<Instant>, step: Duration) -> Option<Duration> {
    match deadline {
        Some(deadline) => {
            let now = Instant::now();
            (now < deadline).then(|| step.min(deadline - now))
        }
        None => Some(step),
    }
}

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// A duration too large to represent as a deadline waits until cancelled.
pub fn sleep(duration: Duration, token: &CancelToken) -> WaitOutcome {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if token.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        match next_step(deadline, POLL_INTERVAL) {
            Some(step) => thread::sleep(step),
            None => return WaitOutcome::Elapsed,
        }
    }
}

/// Polls `ready` every `interval` until it returns true, `timeout` passes, or `token` is
/// cancelled. An error from `ready` ends the wait.
pub fn poll_until<F>(
    timeout: Duration,
    interval: Duration,
    token: &CancelToken,
    mut ready: F,
) -> io::Result<WaitOutcome>
where
    F: FnMut() -> io::Result<bool>,
{
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if token.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }
        if ready()? {
            return Ok(WaitOutcome::Ready);
        }
        match next_step(deadline, interval) {
            Some(step) => thread::sleep(step),
            None => return Ok(WaitOutcome::TimedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sleep_elapses_immediately() {
        assert_eq!(sleep(Duration::ZERO, &CancelToken::new()), WaitOutcome::Elapsed);
    }

    #[test]
    fn cancelled_token_cuts_sleep_short() {
        let token = CancelToken::new();
        token.cancel();
        let start = Instant::now();
        assert_eq!(sleep(Duration::from_secs(300), &token), WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn unrepresentable_duration_still_honours_cancellation() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(sleep(Duration::MAX, &token), WaitOutcome::Cancelled);
        assert_eq!(
            sleep(Duration::from_secs(u64::MAX), &token),
            WaitOutcome::Cancelled
        );
    }

    #[test]
    fn unrepresentable_duration_waits_until_cancelled() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });
        assert_eq!(sleep(Duration::MAX, &token), WaitOutcome::Cancelled);
        handle.join().unwrap();
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });
        assert_eq!(sleep(Duration::from_secs(30), &token), WaitOutcome::Cancelled);
        handle.join().unwrap();
    }

    #[test]
    fn poll_reports_ready_and_timeout() {
        let token = CancelToken::new();
        let mut calls = 0;
        let outcome = poll_until(Duration::from_secs(5), Duration::from_millis(1), &token, || {
            calls += 1;
            Ok(calls == 3)
        })
        .unwrap();
        assert_eq!(outcome, WaitOutcome::Ready);
        assert_eq!(calls, 3);

        let outcome =
            poll_until(Duration::from_millis(20), Duration::from_millis(5), &token, || Ok(false))
                .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[test]
    fn poll_with_unrepresentable_timeout() {
        let token = CancelToken::new();
        let outcome = poll_until(Duration::MAX, Duration::from_millis(1), &token, || Ok(true))
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Ready);

        token.cancel();
        let outcome = poll_until(Duration::MAX, POLL_INTERVAL, &token, || Ok(false)).unwrap();
        assert_eq!(outcome, WaitOutcome::Cancelled);
    }

    #[test]
    fn poll_propagates_errors() {
        let err = poll_until(Duration::from_secs(1), POLL_INTERVAL, &CancelToken::new(), || {
            Err(io::Error::from(io::ErrorKind::Other))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
