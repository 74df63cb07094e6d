//! Cancellable timers owned by an explicit scheduler service.
//!
//! Periodic work (reminder polling, debounced saves) is registered on a scheduler
//! that is passed in by the caller. Nothing in the crate starts timers on its own.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use tokio::{
    runtime::Handle,
    task::AbortHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Repeating timers never fire more often than this.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled timer. Cloning shares the same timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    name: Arc<str>,
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl TimerHandle {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            cancelled: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer. A task already running finishes; no further runs start.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!(timer = %self.name, "timer cancelled");
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the timer will never fire again, either cancelled or spent.
    pub fn is_finished(&self) -> bool {
        self.is_cancelled() || self.task.as_ref().is_some_and(|task| task.is_finished())
    }
}

pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, name: &str, period: Duration, task: RepeatingTask)
        -> TimerHandle;
    fn schedule_once(&self, name: &str, delay: Duration, task: OnceTask) -> TimerHandle;
}

/// Runs timers as tasks on a tokio runtime. Dropping the scheduler cancels every
/// timer it started.
pub struct RuntimeScheduler {
    runtime: Handle,
    timers: Mutex<Vec<TimerHandle>>,
}

impl RuntimeScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            timers: Mutex::new(Vec::new()),
        }
    }

    /// A scheduler on the runtime the caller is running in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Timers that can still fire.
    pub fn active(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|timer| !timer.is_finished())
            .count()
    }

    pub fn cancel_all(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        for timer in timers.drain(..) {
            timer.cancel();
        }
    }

    fn track(&self, name: &str, task: AbortHandle, cancelled: Arc<AtomicBool>) -> TimerHandle {
        let handle = TimerHandle {
            name: Arc::from(name),
            cancelled,
            task: Some(task),
        };
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(|timer| !timer.is_finished());
        timers.push(handle.clone());
        handle
    }
}

impl Scheduler for RuntimeScheduler {
    fn schedule_repeating(
        &self,
        name: &str,
        period: Duration,
        mut task: RepeatingTask,
    ) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let stop = cancelled.clone();
        let timer: Arc<str> = Arc::from(name);
        let join = self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                debug!(%timer, "timer fired");
                task();
            }
        });
        self.track(name, join.abort_handle(), cancelled)
    }

    fn schedule_once(&self, name: &str, delay: Duration, task: OnceTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let stop = cancelled.clone();
        let timer: Arc<str> = Arc::from(name);
        let join = self.runtime.spawn(async move {
            time::sleep(delay).await;
            if !stop.load(Ordering::SeqCst) {
                debug!(%timer, "one-shot timer fired");
                task();
            }
        });
        self.track(name, join.abort_handle(), cancelled)
    }
}

impl Drop for RuntimeScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

enum ManualTask {
    Repeating(Duration, RepeatingTask),
    Once(OnceTask),
}

struct ManualTimer {
    id: u64,
    handle: TimerHandle,
    due: Duration,
    /// `None` while the task is running or once a one-shot has fired.
    task: Option<ManualTask>,
    spent: bool,
}

impl ManualTimer {
    fn is_live(&self) -> bool {
        !self.spent && !self.handle.is_cancelled()
    }
}

/// Virtual-time scheduler that fires timers only when [`advance`](Self::advance) is
/// called. Tasks run on the caller's thread.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    elapsed: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

impl ManualState {
    fn prune(&mut self) {
        self.timers.retain(ManualTimer::is_live);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves virtual time forward, running every timer that falls due in order.
    ///
    /// Returns how many task runs happened.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state().elapsed + by;
        let mut runs = 0;
        while let Some((id, due, task)) = self.take_next_due(target) {
            match task {
                ManualTask::Repeating(period, mut run) => {
                    run();
                    let mut state = self.state();
                    if let Some(timer) = state.timers.iter_mut().find(|timer| timer.id == id) {
                        timer.due = due + period;
                        timer.task = Some(ManualTask::Repeating(period, run));
                    }
                }
                ManualTask::Once(run) => run(),
            }
            runs += 1;
        }
        let mut state = self.state();
        state.elapsed = target;
        state.prune();
        runs
    }

    /// Timers that can still fire.
    pub fn pending(&self) -> usize {
        self.state().timers.iter().filter(|timer| timer.is_live()).count()
    }

    /// Timers still held in memory, live or not yet pruned.
    pub fn tracked(&self) -> usize {
        self.state().timers.len()
    }

    fn take_next_due(&self, target: Duration) -> Option<(u64, Duration, ManualTask)> {
        let mut state = self.state();
        let timer = state
            .timers
            .iter_mut()
            .filter(|timer| timer.is_live() && timer.task.is_some() && timer.due <= target)
            .min_by_key(|timer| (timer.due, timer.id))?;
        let task = timer.task.take()?;
        if matches!(task, ManualTask::Once(_)) {
            timer.spent = true;
        }
        let (id, due) = (timer.id, timer.due);
        state.elapsed = due;
        Some((id, due, task))
    }

    fn register(&self, name: &str, delay: Duration, task: ManualTask) -> TimerHandle {
        let handle = TimerHandle::new(name);
        let mut state = self.state();
        state.prune();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.elapsed + delay;
        state.timers.push(ManualTimer {
            id,
            handle: handle.clone(),
            due,
            task: Some(task),
            spent: false,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        name: &str,
        period: Duration,
        task: RepeatingTask,
    ) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.register(name, period, ManualTask::Repeating(period, task))
    }

    fn schedule_once(&self, name: &str, delay: Duration, task: OnceTask) -> TimerHandle {
        self.register(name, delay, ManualTask::Once(task))
    }
}
