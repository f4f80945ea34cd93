//! Trailing-edge debouncing of settings writes.
//!
//! Rapid edits coalesce into one persisted write once input goes quiet.

use std::future::Future;
use std::time::Duration;

use dotmatrix_engine::Settings;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::SettingsStore;

/// Quiet period before a settings edit is persisted.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

enum Command<T> {
    Update(T),
    Flush(oneshot::Sender<()>),
}

/// Coalesces values and hands only the latest one to an async callback.
///
/// Every `update` restarts the quiet period. The callback's future is awaited
/// before the next command is read, so `flush` and `shutdown` return only once
/// it has finished. Must be created inside a tokio runtime.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, on_fire: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, delay, on_fire));
        Self { tx, task }
    }

    /// Replace the pending value and restart the timer.
    pub fn update(&self, value: T) {
        if self.tx.send(Command::Update(value)).is_err() {
            error!("Debouncer task is gone, update dropped");
        }
    }

    /// Fire the pending value now, if any.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stop the timer task, firing any pending value first.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            error!(error = %e, "Debouncer task failed");
        }
    }
}

async fn run<T, F, Fut>(mut rx: mpsc::UnboundedReceiver<Command<T>>, delay: Duration, mut on_fire: F)
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;

    loop {
        let cmd = if pending.is_some() {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(cmd) => cmd,
                Err(_) => {
                    if let Some(value) = pending.take() {
                        on_fire(value).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match cmd {
            Some(Command::Update(value)) => pending = Some(value),
            Some(Command::Flush(done)) => {
                if let Some(value) = pending.take() {
                    on_fire(value).await;
                }
                let _ = done.send(());
            }
            None => {
                if let Some(value) = pending.take() {
                    on_fire(value).await;
                }
                break;
            }
        }
    }
}

/// Persists settings through a [`SettingsStore`] after edits settle.
pub struct DebouncedSettingsWriter {
    inner: Debouncer<Settings>,
}

impl DebouncedSettingsWriter {
    pub fn new(store: SettingsStore, delay: Duration) -> Self {
        let inner = Debouncer::new(delay, move |settings: Settings| {
            let store = store.clone();
            async move {
                // SQLite writes block, keep them off the async workers.
                match tokio::task::spawn_blocking(move || store.save(&settings)).await {
                    Ok(Ok(())) => debug!("Persisted debounced settings"),
                    Ok(Err(e)) => error!(error = %e, "Failed to persist settings"),
                    Err(e) => error!(error = %e, "Settings save task failed"),
                }
            }
        });
        Self { inner }
    }

    pub fn update(&self, settings: Settings) {
        self.inner.update(settings);
    }

    pub async fn flush(&self) {
        self.inner.flush().await;
    }

    pub async fn shutdown(self) {
        self.inner.shutdown().await;
    }
}
