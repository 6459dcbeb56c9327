//! Per-path debounce timers
//!
//! Each scheduled path gets one timer task. Rescheduling a path cancels its
//! pending timer and starts a new one; a timer that already fired keeps
//! running its job to completion. Shutdown cancels every pending timer and
//! waits for in-flight jobs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Work run on the blocking pool once a path's timer fires
pub type Job = Arc<dyn Fn(&Path) + Send + Sync>;

struct Timer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Debouncer {
    delay: Duration,
    job: Job,
    shutdown: CancellationToken,
    timers: HashMap<PathBuf, Timer>,
    /// Superseded timers whose job may still be running
    retired: Vec<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration, job: Job) -> Self {
        Self {
            delay,
            job,
            shutdown: CancellationToken::new(),
            timers: HashMap::new(),
            retired: Vec::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Timers that have not yet fired
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|t| !t.handle.is_finished()).count()
    }

    /// Start (or restart) the timer for `path`
    pub fn schedule(&mut self, path: PathBuf) {
        if self.shutdown.is_cancelled() {
            return;
        }

        if let Some(previous) = self.timers.remove(&path) {
            previous.token.cancel();
            self.retired.push(previous.handle);
        }
        self.retired.retain(|h| !h.is_finished());

        let token = self.shutdown.child_token();
        let timer_token = token.clone();
        let job = Arc::clone(&self.job);
        let delay = self.delay;
        let timer_path = path.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = timer_token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            debug!("Debounce elapsed for {}", timer_path.display());
            let result = tokio::task::spawn_blocking(move || job(&timer_path)).await;
            if let Err(e) = result {
                warn!("Watch job panicked: {}", e);
            }
        });

        self.timers.insert(path, Timer { token, handle });
    }

    /// Cancel pending timers and wait for jobs already running
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        let handles = self
            .timers
            .drain()
            .map(|(_, timer)| timer.handle)
            .chain(self.retired.drain(..));
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Watch timer task failed: {}", e);
            }
        }
    }
}
