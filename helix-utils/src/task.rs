//
// Helix — task handles for the single-writer control-task model (§5).
//
// Ported from the teacher's interval/timeout task wrappers: dropping a
// handle cancels the underlying tokio task, and timers can be reset
// in-place without re-spawning.
//

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task;
use tokio::time::Instant;
use tracing::error;

/// Handle for a plain spawned task. Dropping it cancels the task unless
/// [`Task::detach`] was called.
#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
    detached: bool,
}

/// Handle for a one-shot timer spawned by [`TimeoutTask::new`].
#[derive(Debug)]
pub struct TimeoutTask {
    _task: Task<()>,
    control: UnboundedSender<Message>,
    next: Arc<Mutex<Instant>>,
}

/// Handle for a repeating timer spawned by [`IntervalTask::new`].
#[derive(Debug)]
pub struct IntervalTask {
    _task: Task<()>,
    control: UnboundedSender<Message>,
    next: Arc<Mutex<Instant>>,
}

#[derive(Debug)]
enum Message {
    Reset(Option<Duration>),
}

impl<T> Task<T> {
    /// Spawns a new asynchronous task, returning a handle for it.
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future),
            detached: false,
        }
    }

    /// Runs the provided closure on a thread where blocking is acceptable.
    pub fn spawn_blocking<F>(f: F) -> Task<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn_blocking(f),
            detached: false,
        }
    }

    /// Detaches the task so dropping the handle no longer cancels it.
    pub fn detach(&mut self) {
        self.detached = true;
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, task::JoinError>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        Pin::new(&mut self.join_handle).poll(cx)
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        if !self.detached {
            self.join_handle.abort();
        }
    }
}

impl TimeoutTask {
    /// Spawns a one-shot timer that invokes `cb` after `timeout` elapses.
    pub fn new<F, Fut>(timeout: Duration, cb: F) -> TimeoutTask
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (control_tx, mut control_rx) = mpsc::unbounded_channel();

        let next = Arc::new(Mutex::new(Instant::now() + timeout));
        let next_child = next.clone();

        let task = Task::spawn(async move {
            let timeout_fut = tokio::time::sleep(timeout);
            tokio::pin!(timeout_fut);

            loop {
                tokio::select! {
                    () = &mut timeout_fut => {
                        cb().await;
                        break;
                    }
                    message = control_rx.recv() => {
                        match message {
                            Some(Message::Reset(new_timeout)) => {
                                let new_timeout = new_timeout.unwrap_or(timeout);
                                let deadline = Instant::now() + new_timeout;
                                *next_child.lock().unwrap() = deadline;
                                timeout_fut.as_mut().reset(deadline);
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        TimeoutTask {
            _task: task,
            control: control_tx,
            next,
        }
    }

    /// Resets the timer, optionally with a new timeout value.
    pub fn reset(&mut self, timeout: Option<Duration>) {
        let _ = self.control.send(Message::Reset(timeout));
    }

    /// Returns the instant at which the timer is next scheduled to fire.
    pub fn next(&self) -> Instant {
        *self.next.lock().unwrap()
    }
}

impl IntervalTask {
    /// Spawns a repeating timer that invokes `cb` every `period`.
    ///
    /// When `fire_immediately` is set, `cb` also runs once right away,
    /// matching the teacher's hello-interval semantics.
    pub fn new<F, Fut>(
        period: Duration,
        fire_immediately: bool,
        cb: F,
    ) -> IntervalTask
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (control_tx, mut control_rx) = mpsc::unbounded_channel();

        let next = Arc::new(Mutex::new(Instant::now() + period));
        let next_child = next.clone();

        let task = Task::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(
                tokio::time::MissedTickBehavior::Delay,
            );
            if fire_immediately {
                cb().await;
            }

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        *next_child.lock().unwrap() = Instant::now() + period;
                        cb().await;
                    }
                    message = control_rx.recv() => {
                        match message {
                            Some(Message::Reset(new_period)) => {
                                let new_period = new_period.unwrap_or(period);
                                interval = tokio::time::interval(new_period);
                                interval.set_missed_tick_behavior(
                                    tokio::time::MissedTickBehavior::Delay,
                                );
                                *next_child.lock().unwrap() =
                                    Instant::now() + new_period;
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        IntervalTask {
            _task: task,
            control: control_tx,
            next,
        }
    }

    /// Resets the interval, optionally with a new period.
    pub fn reset(&mut self, period: Option<Duration>) {
        let _ = self.control.send(Message::Reset(period));
    }

    /// Returns the instant at which the timer is next scheduled to fire.
    pub fn next(&self) -> Instant {
        *self.next.lock().unwrap()
    }
}

/// Logs an error produced by a task that has no other way to surface it.
pub fn log_task_error(context: &'static str, error: impl std::fmt::Display) {
    error!(%context, %error, "background task failed");
}
