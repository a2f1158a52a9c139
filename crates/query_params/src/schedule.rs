//! Deferred task scheduling and trailing-edge debounce for URL writes.
//!
//! A zero delay means "run on the next scheduler turn", after the current synchronous batch of
//! mutations has finished. That turn is the batching point that lets several mutations in one
//! event collapse into a single URL write.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Handle identifying a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a scheduler-specific handle.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the scheduler-specific handle.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Host timer service.
///
/// Implementations must never run `task` from inside `schedule`; it runs on a later turn.
pub trait Scheduler {
    /// Runs `task` once after `delay_ms` milliseconds (next turn for `0`).
    ///
    /// Returns `None` when the host refused the timer; `task` is dropped without running.
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TaskId>;

    /// Cancels a task that has not run yet. Unknown or finished ids are ignored.
    fn cancel(&self, id: TaskId);
}

struct ManualTask {
    id: TaskId,
    due_ms: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualClock {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<ManualTask>,
}

impl ManualClock {
    /// Removes the earliest task due at or before `limit_ms`, ties broken by schedule order.
    fn pop_due(&mut self, limit_ms: Option<u64>) -> Option<ManualTask> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| limit_ms.map_or(true, |limit| task.due_ms <= limit))
            .min_by_key(|(_, task)| (task.due_ms, task.id.0))
            .map(|(index, _)| index)?;
        Some(self.tasks.remove(index))
    }
}

/// Virtual-clock scheduler for tests and headless hosts.
///
/// Time only moves through [`ManualScheduler::advance`] and [`ManualScheduler::run_until_idle`].
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now_ms", &self.now_ms())
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.clock.borrow().tasks.len()
    }

    /// Moves the clock forward by `ms`, running every task that becomes due, in due order.
    ///
    /// Tasks scheduled by running tasks also run when they fall inside the window. Returns the
    /// number of tasks run.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms().saturating_add(ms);
        let mut ran = 0;
        loop {
            let next = self.clock.borrow_mut().pop_due(Some(target));
            let Some(task) = next else {
                break;
            };
            let now = self.now_ms();
            self.clock.borrow_mut().now_ms = task.due_ms.max(now);
            (task.task)();
            ran += 1;
        }
        self.clock.borrow_mut().now_ms = target;
        ran
    }

    /// Runs tasks until the queue is empty, jumping the clock to each due time.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.clock.borrow_mut().pop_due(None);
            let Some(task) = next else {
                break;
            };
            let now = self.now_ms();
            self.clock.borrow_mut().now_ms = task.due_ms.max(now);
            (task.task)();
            ran += 1;
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TaskId> {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = TaskId(clock.next_id);
        let due_ms = clock.now_ms.saturating_add(u64::from(delay_ms));
        clock.tasks.push(ManualTask { id, due_ms, task });
        Some(id)
    }

    fn cancel(&self, id: TaskId) {
        self.clock.borrow_mut().tasks.retain(|task| task.id != id);
    }
}

struct DebounceState<T> {
    pending: Cell<Option<TaskId>>,
    last: RefCell<Option<T>>,
}

/// Coalesces calls to `task` through a [`Scheduler`].
///
/// With a non-zero delay every call restarts the timer (trailing edge). With a zero delay the
/// first call schedules a next-turn run and later calls in the same turn join it. Each call
/// returns the result of the previous completed run. A call the scheduler refuses leaves nothing
/// pending, so the next call tries again.
pub struct Debouncer<T> {
    scheduler: Rc<dyn Scheduler>,
    delay_ms: u32,
    task: Rc<dyn Fn() -> T>,
    state: Rc<DebounceState<T>>,
}

impl<T: Clone + 'static> Debouncer<T> {
    /// Creates a debouncer for `task`.
    pub fn new(scheduler: Rc<dyn Scheduler>, delay_ms: u32, task: impl Fn() -> T + 'static) -> Self {
        Self {
            scheduler,
            delay_ms,
            task: Rc::new(task),
            state: Rc::new(DebounceState {
                pending: Cell::new(None),
                last: RefCell::new(None),
            }),
        }
    }

    /// Requests a run, returning the previous run's result.
    pub fn call(&self) -> Option<T> {
        let previous = self.last_result();
        if let Some(id) = self.state.pending.get() {
            if self.delay_ms == 0 {
                return previous;
            }
            self.scheduler.cancel(id);
        }

        let state = Rc::clone(&self.state);
        let task = Rc::clone(&self.task);
        let id = self.scheduler.schedule(
            self.delay_ms,
            Box::new(move || {
                state.pending.set(None);
                let output = task();
                *state.last.borrow_mut() = Some(output);
            }),
        );
        self.state.pending.set(id);
        previous
    }

    /// Drops a pending run; returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.state.pending.take() {
            Some(id) => {
                self.scheduler.cancel(id);
                true
            }
            None => false,
        }
    }

    /// Whether a run is scheduled.
    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    /// Result of the most recent completed run.
    pub fn last_result(&self) -> Option<T> {
        self.state.last.borrow().clone()
    }

    /// Configured delay.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn counting_debouncer(scheduler: &ManualScheduler, delay_ms: u32) -> (Debouncer<u32>, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let debouncer = Debouncer::new(Rc::new(scheduler.clone()), delay_ms, move || {
            counter.set(counter.get() + 1);
            counter.get()
        });
        (debouncer, runs)
    }

    #[test]
    fn manual_scheduler_runs_tasks_in_due_order() {
        let scheduler = ManualScheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(30, "c"), (10, "a"), (10, "b")] {
            let log = Rc::clone(&log);
            scheduler.schedule(delay, Box::new(move || log.borrow_mut().push(label)));
        }

        assert_eq!(scheduler.advance(10), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.now_ms(), 10);
        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now_ms(), 30);
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let scheduler = ManualScheduler::default();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let id = scheduler
            .schedule(0, Box::new(move || flag.set(true)))
            .expect("manual scheduler accepts every task");
        scheduler.cancel(id);

        assert_eq!(scheduler.run_until_idle(), 0);
        assert!(!ran.get());
    }

    #[test]
    fn trailing_debounce_resets_timer_on_each_call() {
        let scheduler = ManualScheduler::default();
        let (debouncer, runs) = counting_debouncer(&scheduler, 100);

        debouncer.call();
        scheduler.advance(60);
        debouncer.call();
        scheduler.advance(60);
        assert_eq!(runs.get(), 0, "timer should have been reset");
        debouncer.call();
        scheduler.advance(100);

        assert_eq!(runs.get(), 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn zero_delay_coalesces_calls_in_one_turn() {
        let scheduler = ManualScheduler::default();
        let (debouncer, runs) = counting_debouncer(&scheduler, 0);

        debouncer.call();
        debouncer.call();
        debouncer.call();
        assert_eq!(runs.get(), 0, "zero delay still waits for the next turn");
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(0);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn calls_return_the_previous_result() {
        let scheduler = ManualScheduler::default();
        let (debouncer, _) = counting_debouncer(&scheduler, 5);

        assert_eq!(debouncer.call(), None);
        scheduler.advance(5);
        assert_eq!(debouncer.call(), Some(1));
        assert_eq!(debouncer.call(), Some(1));
        scheduler.advance(5);
        assert_eq!(debouncer.last_result(), Some(2));
    }

    #[test]
    fn cancel_drops_pending_run() {
        let scheduler = ManualScheduler::default();
        let (debouncer, runs) = counting_debouncer(&scheduler, 10);

        debouncer.call();
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        scheduler.run_until_idle();
        assert_eq!(runs.get(), 0);
    }

    #[derive(Default)]
    struct FlakyScheduler {
        inner: ManualScheduler,
        refuse_next: Cell<bool>,
    }

    impl Scheduler for FlakyScheduler {
        fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<TaskId> {
            if self.refuse_next.replace(false) {
                return None;
            }
            self.inner.schedule(delay_ms, task)
        }

        fn cancel(&self, id: TaskId) {
            self.inner.cancel(id);
        }
    }

    #[test]
    fn refused_schedule_leaves_nothing_pending() {
        let scheduler = Rc::new(FlakyScheduler::default());
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let debouncer = Debouncer::new(Rc::clone(&scheduler) as Rc<dyn Scheduler>, 0, move || {
            counter.set(counter.get() + 1);
            counter.get()
        });

        scheduler.refuse_next.set(true);
        debouncer.call();
        assert!(!debouncer.is_pending());

        debouncer.call();
        assert!(debouncer.is_pending());
        assert_eq!(scheduler.inner.run_until_idle(), 1);
        assert_eq!(runs.get(), 1);
    }
}
