//! Trailing-edge debouncer.
//!
//! Values pushed faster than the delay collapse to the last one; it is
//! emitted once no new value has arrived for the full delay. Requests
//! already started from earlier emissions are not cancelled.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::ClientConfig;

/// Input side of a debouncer. Dropping it flushes the pending value and
/// stops the task.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

/// Output side: receives settled values.
#[derive(Debug)]
pub struct Debounced<T> {
    rx: mpsc::Receiver<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debouncing task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(delay: Duration) -> (Self, Debounced<T>) {
        let (tx, mut input) = mpsc::unbounded_channel::<T>();
        let (output, rx) = mpsc::channel::<T>(16);

        tokio::spawn(async move {
            while let Some(mut latest) = input.recv().await {
                loop {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(value) => latest = value,
                            None => {
                                // Input closed: flush the pending value
                                let _ = output.send(latest).await;
                                return;
                            }
                        },
                        () = tokio::time::sleep(delay) => {
                            if output.send(latest).await.is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { tx }, Debounced { rx })
    }

    /// Spawn with the configured search debounce.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> (Self, Debounced<T>) {
        Self::spawn(config.search_debounce)
    }

    /// Push a new value, restarting the quiet period.
    ///
    /// Returns `false` if the debouncer has stopped.
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl<T> Debounced<T> {
    /// Next settled value; `None` after the debouncer is dropped and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}
