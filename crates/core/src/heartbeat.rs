//! Heartbeat runner - background thread that keeps an active method alive.

use crate::error::MethodError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Default interval between heartbeat calls.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(55);

/// Callback type for heartbeats.
pub type HeartbeatCallback = Arc<dyn Fn() -> Result<(), MethodError> + Send + Sync + 'static>;

/// Periodic invoker of a method's heartbeat callback.
///
/// The first call happens immediately on the background thread; later calls
/// follow every `interval` until [`Heartbeat::stop`] is called.
pub struct Heartbeat {
    method_name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Start invoking `callback` on a dedicated thread.
    pub fn start(method_name: &str, callback: HeartbeatCallback, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let name = method_name.to_string();

        let spawned = std::thread::Builder::new()
            .name(format!("heartbeat-{name}"))
            .spawn(move || run(&name, callback, interval, stop_rx));

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(method = %method_name, "failed to spawn heartbeat thread: {}", e);
                None
            }
        };

        Self {
            method_name: method_name.to_string(),
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    /// Stop the heartbeat. Returns once the background thread has exited,
    /// so no callback runs after this returns.
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the channel even if the thread is
        // busy inside the callback.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(method = %self.method_name, "heartbeat thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heartbeat")
            .field("method_name", &self.method_name)
            .field("running", &self.is_running())
            .finish()
    }
}

fn run(method_name: &str, callback: HeartbeatCallback, interval: Duration, stop_rx: Receiver<()>) {
    tracing::debug!(method = %method_name, ?interval, "heartbeat started");

    loop {
        match catch_unwind(AssertUnwindSafe(|| callback())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(method = %method_name, "heartbeat call failed: {}", e);
            }
            Err(_) => {
                tracing::warn!(method = %method_name, "heartbeat call panicked");
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!(method = %method_name, "heartbeat stopped");
}
