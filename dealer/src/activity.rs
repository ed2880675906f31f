use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

/// A named background thread that reports whether it is still running.
///
/// The flag is cleared when the thread body returns or unwinds, so a
/// panicking activity can never look alive.
pub struct Activity {
    name: &'static str,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

struct RunningGuard {
    name: &'static str,
    running: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        debug!(activity = self.name, "Activity finished");
    }
}

impl Activity {
    pub fn spawn(
        name: &'static str,
        body: impl FnOnce() + Send + 'static,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let guard = RunningGuard {
            name,
            running: running.clone(),
        };
        let handle = thread::Builder::new().name(name.into()).spawn(move || {
            let _guard = guard;
            body();
        })?;
        Ok(Self {
            name,
            running,
            handle,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Waits for the thread to finish. A panic is logged, not propagated.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!(activity = self.name, "Activity panicked");
        }
    }
}
