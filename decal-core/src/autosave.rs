//! Periodic autosave of a shared session.

use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::session::SharedSession;
use crate::{DesignError, DesignResult};

/// Shortest interval accepted by [`AutosaveScheduler::start`].
pub const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(100);

/// Runs a background task that saves the session whenever it changed.
///
/// Dropping the scheduler stops the task.
#[derive(Debug, Default)]
pub struct AutosaveScheduler {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AutosaveScheduler {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start saving `session` every `interval`, replacing any running task.
    ///
    /// The first tick fires one full interval after the start.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] when called outside a Tokio
    /// runtime.
    pub fn start(&mut self, session: SharedSession, interval: Duration) -> DesignResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DesignError::InvalidOperation(format!("autosave needs a Tokio runtime: {e}")))?;
        self.stop();

        let interval = interval.max(MIN_AUTOSAVE_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Don't fire immediately on start
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = &mut shutdown_rx => {
                        tracing::debug!("Autosave received shutdown signal");
                        break;
                    }

                    _ = ticker.tick() => {
                        autosave_tick(&session);
                    }
                }
            }
        });

        tracing::debug!(interval = ?interval, "Autosave started");
        self.handle = Some(handle);
        self.shutdown_tx = Some(shutdown_tx);
        Ok(())
    }

    /// Start saving `session` at its configured autosave interval.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] when called outside a Tokio
    /// runtime.
    pub fn start_configured(&mut self, session: SharedSession) -> DesignResult<()> {
        let interval = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .config()
            .autosave_interval();
        self.start(session, interval)
    }

    /// Signal the running task to stop. No-op when stopped.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have exited.
            let _ = tx.send(());
        }
        if self.handle.take().is_some() {
            tracing::debug!("Autosave stopped");
        }
    }

    /// Whether a task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Save the session if it changed. Returns whether a save was attempted.
fn autosave_tick(session: &SharedSession) -> bool {
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    if !session.has_changed() {
        return false;
    }
    if !session.save() {
        tracing::warn!("Autosave failed; will retry on next tick");
    }
    true
}
