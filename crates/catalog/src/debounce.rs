//! Trailing-edge debouncing of rapidly changing input.
//!
//! A [`Debouncer`] forwards a value only once no newer value has arrived for
//! the configured window. Used to turn keystrokes into settled search queries.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::trace;

const SETTLED_BUFFER: usize = 16;

enum Input<T> {
    Value(T),
    Forget,
}

/// Handle to a background debouncing task.
///
/// Dropping the handle stops the task and discards any pending value.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<Input<T>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Start a debouncer; settled values arrive on the returned receiver.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn spawn(window: Duration) -> (Self, mpsc::Receiver<T>) {
        let (input, raw) = mpsc::unbounded_channel();
        let (settled_tx, settled) = mpsc::channel(SETTLED_BUFFER);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(settle(window, raw, settled_tx, cancel.clone()));
        (
            Self {
                input,
                cancel,
                task,
            },
            settled,
        )
    }

    /// Offer a new value, restarting the quiescence window.
    ///
    /// Returns `false` if the debouncer has stopped.
    pub fn push(&self, value: T) -> bool {
        self.input.send(Input::Value(value)).is_ok()
    }

    /// Drop the memory of the last emitted value.
    ///
    /// A settled value equal to the last one emitted is normally swallowed.
    /// Call this when whatever consumed that value has since been reset
    /// elsewhere, so the same value settling again is forwarded.
    pub fn forget(&self) {
        let _ = self.input.send(Input::Forget);
    }

    /// Stop the task without emitting the pending value.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn settle<T>(
    window: Duration,
    mut raw: mpsc::UnboundedReceiver<Input<T>>,
    settled: mpsc::Sender<T>,
    cancel: CancellationToken,
) where
    T: Clone + PartialEq,
{
    let mut pending: Option<T> = None;
    let mut last_emitted: Option<T> = None;
    let timer = sleep(window);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = raw.recv() => {
                match next {
                    Some(Input::Value(value)) => {
                        pending = Some(value);
                        timer.as_mut().reset(Instant::now() + window);
                    }
                    Some(Input::Forget) => last_emitted = None,
                    None => break,
                }
            }
            () = &mut timer, if pending.is_some() => {
                let Some(value) = pending.take() else { continue };
                if last_emitted.as_ref() == Some(&value) {
                    trace!("Settled value unchanged, not emitting");
                    continue;
                }
                if settled.send(value.clone()).await.is_err() {
                    break;
                }
                last_emitted = Some(value);
            }
        }
    }
}
