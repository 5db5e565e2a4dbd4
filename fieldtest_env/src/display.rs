//! Display contract: a blocking render loop closable from another thread.

use crate::error::EnvError;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Idempotent, thread-safe request for a display to close.
///
/// Clones share state: closing any clone closes them all.
#[derive(Debug, Clone)]
pub struct CloseSignal {
    closed: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl CloseSignal {
    /// Creates an open signal.
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = channel::bounded(1);
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Requests the display to close. Calling it again has no effect.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.wake_tx.try_send(());
        }
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Waits up to `timeout` for the signal, returning whether it is closed.
    ///
    /// Render loops call this between frames instead of sleeping.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_closed() {
            return true;
        }
        let _ = self.wake_rx.recv_timeout(timeout);
        self.is_closed()
    }

    /// Blocks until the signal is closed.
    pub fn wait(&self) {
        while !self.wait_timeout(Duration::from_millis(100)) {}
    }
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A live visualization attached to a test run.
///
/// `show` owns the calling thread until the display is closed, either by the
/// user or through the [`CloseSignal`] returned by `close_signal`.
pub trait Display: Send {
    /// Returns a handle that closes this display from any thread.
    fn close_signal(&self) -> CloseSignal;

    /// Runs the blocking render loop; returns when the display is closed.
    fn show(&mut self) -> Result<(), EnvError>;

    /// Closes the display. Idempotent.
    fn close(&self) {
        self.close_signal().close();
    }
}

/// Display that renders nothing and blocks until closed.
///
/// Lets CI exercise the threaded path without a terminal.
#[derive(Debug, Default)]
pub struct SignalDisplay {
    signal: CloseSignal,
    shown: bool,
}

impl SignalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `show` has been entered.
    pub fn was_shown(&self) -> bool {
        self.shown
    }
}

impl Display for SignalDisplay {
    fn close_signal(&self) -> CloseSignal {
        self.signal.clone()
    }

    fn show(&mut self) -> Result<(), EnvError> {
        self.shown = true;
        self.signal.wait();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_close_is_idempotent() {
        let signal = CloseSignal::new();
        assert!(!signal.is_closed());

        signal.close();
        signal.close();

        assert!(signal.is_closed());
        assert!(signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_clones_share_state() {
        let signal = CloseSignal::new();
        let remote = signal.clone();

        remote.close();
        assert!(signal.is_closed());
    }

    #[test]
    fn test_signal_display_unblocks_from_other_thread() {
        let mut display = SignalDisplay::new();
        let signal = display.close_signal();

        let start = Instant::now();
        let closer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            signal.close();
        });

        display.show().unwrap();
        closer.join().unwrap();

        assert!(display.was_shown());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
