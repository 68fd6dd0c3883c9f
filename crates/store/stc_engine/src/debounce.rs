use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, Sender};

/// How long the inputs must stay unchanged before a recomputation is started.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

enum Command<T> {
    Trigger(T),
    Cancel,
    Flush(Sender<()>),
    Shutdown,
}

/// Coalesces bursts of [`Self::trigger`] calls into a single delayed call of the callback.
///
/// Only the latest triggered value is delivered, once no new trigger arrived for `delay`.
/// The callback runs on the debouncer's own thread.
/// Dropping the debouncer drops any pending value without delivering it.
pub struct Debouncer<T: Send + 'static> {
    cmds_tx: Sender<Command<T>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(
        name: impl Into<String>,
        delay: Duration,
        on_fire: impl FnMut(T) + Send + 'static,
    ) -> std::io::Result<Self> {
        let (cmds_tx, cmds_rx) = crossbeam::channel::unbounded();

        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || debounce_thread(&cmds_rx, delay, on_fire))?;

        Ok(Self {
            cmds_tx,
            handle: Some(handle),
        })
    }

    /// Replace the pending value and restart the quiet period.
    pub fn trigger(&self, value: T) {
        self.cmds_tx.send(Command::Trigger(value)).ok();
    }

    /// Forget the pending value, if any.
    pub fn cancel(&self) {
        self.cmds_tx.send(Command::Cancel).ok();
    }

    /// Deliver the pending value right away, and block until the callback has returned.
    ///
    /// Must not be called from within the callback.
    pub fn flush(&self) {
        let (tx, rx) = crossbeam::channel::bounded(0); // oneshot
        if self.cmds_tx.send(Command::Flush(tx)).is_ok() {
            // The thread drops `tx` when done; that is our signal.
            rx.recv().ok();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cmds_tx.send(Command::Shutdown).ok();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn debounce_thread<T>(cmds_rx: &Receiver<Command<T>>, delay: Duration, mut on_fire: impl FnMut(T)) {
    let mut pending: Option<T> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let timeout = match deadline {
            Some(deadline) => crossbeam::channel::at(deadline),
            None => crossbeam::channel::never(),
        };

        crossbeam::select! {
            recv(cmds_rx) -> cmd => match cmd {
                Ok(Command::Trigger(value)) => {
                    pending = Some(value);
                    deadline = Some(Instant::now() + delay);
                }
                Ok(Command::Cancel) => {
                    pending = None;
                    deadline = None;
                }
                Ok(Command::Flush(done)) => {
                    deadline = None;
                    if let Some(value) = pending.take() {
                        on_fire(value);
                    }
                    drop(done);
                }
                Ok(Command::Shutdown) | Err(_) => break,
            },

            recv(timeout) -> _ => {
                deadline = None;
                if let Some(value) = pending.take() {
                    on_fire(value);
                }
            },
        }
    }

    stc_log::trace!("Debouncer shutting down");
}
