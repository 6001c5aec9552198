// Cooperative task scheduler
//
// Everything that "waits" in the simulation (animation sequences, the deferred
// pie release, enemy walk and blink loops) is a named task owned here. Tasks
// never block: the game pops each due task, runs it, and hands back a
// `TaskStatus` saying whether it should run again.

/// Unique identifier for a scheduled task
pub type TaskId = u64;

/// Slack applied when comparing due times, so a delay that is an exact
/// multiple of the tick length is not pushed one tick late by rounding.
const DUE_EPSILON: f64 = 1e-6;

/// What a task wants after it has run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskStatus {
    /// Remove the task
    Done,
    /// Run again on the next tick
    Continue,
    /// Run again after the given delay in seconds
    Again(f64),
}

/// A task waiting in (or just popped from) the scheduler
#[derive(Debug, Clone)]
pub struct ScheduledTask<T> {
    pub id: TaskId,
    pub name: String,
    pub payload: T,
    due_at: f64,
    not_before_tick: u64,
}

/// Named, cancellable tasks driven by the simulation clock
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: Vec<ScheduledTask<T>>,
    now: f64,
    tick: u64,
    next_id: TaskId,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            now: 0.0,
            tick: 0,
            next_id: 0,
        }
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Add a task that runs every tick, starting with the next one
    pub fn add(&mut self, name: impl Into<String>, payload: T) -> TaskId {
        self.insert(name.into(), payload, self.now)
    }

    /// Add a task that runs once `delay` seconds from now
    pub fn do_later(&mut self, delay: f64, name: impl Into<String>, payload: T) -> TaskId {
        self.insert(name.into(), payload, self.now + delay.max(0.0))
    }

    fn insert(&mut self, name: String, payload: T, due_at: f64) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            name,
            payload,
            due_at,
            not_before_tick: self.tick + 1,
        });
        id
    }

    /// Move the clock forward by one tick
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.now += dt;
    }

    /// Take the earliest task that is due on the current tick.
    ///
    /// Tasks rescheduled or added while the tick is being processed are not
    /// returned again until the next tick.
    pub fn pop_due(&mut self) -> Option<ScheduledTask<T>> {
        let now = self.now;
        let tick = self.tick;
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.not_before_tick <= tick && task.due_at <= now + DUE_EPSILON)
            .min_by(|(_, a), (_, b)| {
                a.due_at
                    .total_cmp(&b.due_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(index, _)| index)?;

        Some(self.tasks.remove(index))
    }

    /// Return a popped task to the scheduler according to its status
    pub fn finish(&mut self, mut task: ScheduledTask<T>, status: TaskStatus) {
        match status {
            TaskStatus::Done => {}
            TaskStatus::Continue => {
                task.due_at = self.now;
                task.not_before_tick = self.tick + 1;
                self.tasks.push(task);
            }
            TaskStatus::Again(delay) => {
                task.due_at = self.now + delay.max(0.0);
                task.not_before_tick = self.tick + 1;
                self.tasks.push(task);
            }
        }
    }

    /// Remove every pending task with this name. Safe to call when nothing
    /// by that name is scheduled. Returns how many tasks were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.name != name);
        before - self.tasks.len()
    }

    /// Remove every pending task whose payload matches the predicate
    pub fn remove_matching(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !predicate(&task.payload));
        before - self.tasks.len()
    }

    /// Check if a task with this name is pending
    pub fn has(&self, name: &str) -> bool {
        self.tasks.iter().any(|task| task.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    /// Run one tick, finishing every due task with the status chosen by `run`
    fn run_tick<T: Clone>(
        scheduler: &mut Scheduler<T>,
        mut run: impl FnMut(&ScheduledTask<T>) -> TaskStatus,
    ) -> Vec<T> {
        scheduler.advance(DT);
        let mut fired = Vec::new();
        while let Some(task) = scheduler.pop_due() {
            fired.push(task.payload.clone());
            let status = run(&task);
            scheduler.finish(task, status);
        }
        fired
    }

    #[test]
    fn test_do_later_fires_once_at_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.do_later(0.5, "later", 7);

        let mut fired_at = Vec::new();
        for tick in 1..=60 {
            if !run_tick(&mut scheduler, |_| TaskStatus::Done).is_empty() {
                fired_at.push(tick);
            }
        }

        assert_eq!(fired_at, vec![30]);
        assert!(!scheduler.has("later"));
    }

    #[test]
    fn test_continue_runs_every_tick_but_once_per_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.add("loop", ());

        for _ in 0..5 {
            let fired = run_tick(&mut scheduler, |_| TaskStatus::Continue);
            assert_eq!(fired.len(), 1);
        }
        assert!(scheduler.has("loop"));
    }

    #[test]
    fn test_again_reschedules_with_new_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.do_later(0.1, "blink", ());

        let mut count = 0;
        for _ in 0..60 {
            count += run_tick(&mut scheduler, |_| TaskStatus::Again(0.25)).len();
        }
        // Fires at 0.1, 0.35, 0.6, 0.85
        assert_eq!(count, 4);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut scheduler = Scheduler::new();
        scheduler.add("walk", 1);
        scheduler.add("walk", 2);
        scheduler.add("blink", 3);

        assert_eq!(scheduler.remove("walk"), 2);
        assert_eq!(scheduler.remove("walk"), 0);
        assert_eq!(scheduler.remove("never-added"), 0);
        assert!(scheduler.has("blink"));
    }

    #[test]
    fn test_remove_matching_payload() {
        let mut scheduler = Scheduler::new();
        scheduler.add("a", 1);
        scheduler.add("b", 2);
        scheduler.do_later(3.0, "c", 1);

        assert_eq!(scheduler.remove_matching(|p| *p == 1), 2);
        assert!(scheduler.has("b"));
    }

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.do_later(0.02, "second", 2);
        scheduler.do_later(0.01, "first", 1);

        let mut fired = Vec::new();
        for _ in 0..3 {
            fired.extend(run_tick(&mut scheduler, |_| TaskStatus::Done));
        }
        assert_eq!(fired, vec![1, 2]);
    }

    #[test]
    fn test_task_added_during_tick_waits_for_next_tick() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.advance(DT);
        scheduler.add("late", 9);
        assert!(scheduler.pop_due().is_none());

        scheduler.advance(DT);
        assert_eq!(scheduler.pop_due().map(|t| t.payload), Some(9));
    }

    #[test]
    fn test_clock_advances_by_tick_length() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        for _ in 0..30 {
            scheduler.advance(DT);
        }
        assert!((scheduler.now() - 0.5).abs() < 1e-9);
    }
}
