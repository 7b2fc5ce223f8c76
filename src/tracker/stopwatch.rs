use super::clock::TickScheduler;
use super::store::TaskStore;
use crate::domain::{duration, Task, TaskId, TaskPatch};
use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Duration, Utc};

/// One emission of the live duration while a timer runs
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvent {
    pub task_id: TaskId,
    /// Stored duration plus elapsed time, in seconds
    pub seconds: u64,
    /// `seconds` encoded as `HH:MM:SS`
    pub text: String,
}

pub type SubscriptionId = u64;

type TickCallback = Box<dyn FnMut(&TickEvent)>;

struct Subscription {
    id: SubscriptionId,
    task_id: TaskId,
    callback: TickCallback,
}

#[derive(Debug, Clone)]
struct ActiveTimer {
    task_id: TaskId,
    started_at: DateTime<Utc>,
}

/// Whole seconds between `start` and `now`, zero if the clock stepped backwards
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_seconds().max(0) as u64
}

/// The single process-wide timer slot
pub struct Stopwatch {
    active: Option<ActiveTimer>,
    scheduler: Box<dyn TickScheduler>,
    period: Duration,
    subscriptions: Vec<Subscription>,
    next_subscription: SubscriptionId,
}

impl Stopwatch {
    pub fn new(scheduler: Box<dyn TickScheduler>, period: Duration) -> Self {
        Self {
            active: None,
            scheduler,
            period,
            subscriptions: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn active_task(&self) -> Option<&TaskId> {
        self.active.as_ref().map(|a| &a.task_id)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.started_at)
    }

    pub fn is_active(&self, id: &TaskId) -> bool {
        self.active_task() == Some(id)
    }

    /// Uncommitted seconds of the running timer
    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        self.started_at()
            .map(|start| elapsed_seconds(start, now))
            .unwrap_or(0)
    }

    /// Stored duration plus uncommitted time when `task` owns the timer
    pub fn live_duration(&self, task: &Task, now: DateTime<Utc>) -> u64 {
        if self.is_active(&task.id) {
            task.duration.saturating_add(self.elapsed(now))
        } else {
            task.duration
        }
    }

    /// Start timing `id`, stopping and committing any other running timer first
    ///
    /// Returns the previously running task after its commit, if there was one.
    /// Starting the task that already owns the timer changes nothing.
    pub fn start(
        &mut self,
        store: &mut TaskStore,
        id: &TaskId,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Task>> {
        if !store.contains(id) {
            return Err(TrackerError::NotFound(id.clone()));
        }
        if self.is_active(id) {
            return Ok(None);
        }

        // Stopping the previous timer cancels its tick
        let previous = match self.active_task().cloned() {
            Some(previous_id) => self.stop(store, &previous_id, now)?,
            None => {
                self.scheduler.cancel();
                None
            }
        };

        self.active = Some(ActiveTimer {
            task_id: id.clone(),
            started_at: now,
        });
        self.scheduler.schedule(self.period, now);
        tracing::info!(id = %id, "timer started");

        Ok(previous)
    }

    /// Stop timing `id` and add the elapsed seconds to its stored duration
    ///
    /// A no-op returning `None` unless `id` owns the timer.
    pub fn stop(
        &mut self,
        store: &mut TaskStore,
        id: &TaskId,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Task>> {
        if !self.is_active(id) {
            return Ok(None);
        }
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        self.scheduler.cancel();

        let elapsed = elapsed_seconds(active.started_at, now);
        let stored = store
            .find(id)
            .map(|t| t.duration)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        let task = store.update(id, TaskPatch::duration(stored.saturating_add(elapsed)))?;
        tracing::info!(id = %id, elapsed, total = task.duration, "timer stopped");

        Ok(Some(task))
    }

    /// Drop the running timer without committing. Returns the task it belonged to.
    pub fn reset(&mut self) -> Option<TaskId> {
        let active = self.active.take()?;
        self.scheduler.cancel();
        tracing::info!(id = %active.task_id, "timer discarded");
        Some(active.task_id)
    }

    /// Receive tick events for `task_id`
    pub fn subscribe(
        &mut self,
        task_id: TaskId,
        callback: impl FnMut(&TickEvent) + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            task_id,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Emit a tick if one is due, recomputed from the start instant
    pub fn poll(&mut self, store: &TaskStore, now: DateTime<Utc>) -> Option<TickEvent> {
        if !self.scheduler.poll(now) {
            return None;
        }
        let active = self.active.clone()?;
        let task = store.find(&active.task_id)?;

        let seconds = task
            .duration
            .saturating_add(elapsed_seconds(active.started_at, now));
        let event = TickEvent {
            task_id: active.task_id,
            seconds,
            text: duration::encode(seconds),
        };

        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.task_id == event.task_id)
        {
            (subscription.callback)(&event);
        }

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::kv::MemoryKv;
    use crate::tracker::clock::manual::{ManualClock, ManualScheduler};
    use crate::tracker::clock::Clock;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        store: TaskStore,
        stopwatch: Stopwatch,
        clock: ManualClock,
        scheduler: ManualScheduler,
    }

    fn fixture() -> Fixture {
        let scheduler = ManualScheduler::default();
        Fixture {
            store: TaskStore::load(Box::new(MemoryKv::new())),
            stopwatch: Stopwatch::new(Box::new(scheduler.clone()), Duration::seconds(1)),
            clock: ManualClock::new(),
            scheduler,
        }
    }

    #[test]
    fn test_elapsed_seconds_floors_and_clamps() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance_millis(2_999);
        assert_eq!(elapsed_seconds(start, clock.now()), 2);
        assert_eq!(elapsed_seconds(clock.now(), start), 0);
    }

    #[test]
    fn test_start_unknown_task() {
        let mut fx = fixture();
        let err = fx
            .stopwatch
            .start(&mut fx.store, &TaskId::from("nope"), fx.clock.now())
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
        assert!(fx.stopwatch.active_task().is_none());
    }

    #[test]
    fn test_stop_commits_elapsed() {
        let mut fx = fixture();
        let task = fx.store.create("x").unwrap();
        fx.store.update(&task.id, TaskPatch::duration(10)).unwrap();

        fx.stopwatch.start(&mut fx.store, &task.id, fx.clock.now()).unwrap();
        fx.clock.advance(5);

        let live = fx.stopwatch.live_duration(fx.store.find(&task.id).unwrap(), fx.clock.now());
        assert_eq!(duration::encode(live), "00:00:15");
        assert_eq!(fx.store.find(&task.id).unwrap().duration, 10);

        let stopped = fx.stopwatch.stop(&mut fx.store, &task.id, fx.clock.now()).unwrap();
        assert_eq!(stopped.map(|t| t.duration), Some(15));

        fx.clock.advance(30);
        assert!(fx.stopwatch.stop(&mut fx.store, &task.id, fx.clock.now()).unwrap().is_none());
        assert_eq!(fx.store.find(&task.id).unwrap().duration, 15);
        assert!(!fx.scheduler.0.borrow().scheduled);
    }

    #[test]
    fn test_start_other_task_commits_previous_first() {
        let mut fx = fixture();
        let a = fx.store.create("a").unwrap();
        let b = fx.store.create("b").unwrap();

        fx.stopwatch.start(&mut fx.store, &b.id, fx.clock.now()).unwrap();
        fx.clock.advance(7);
        let previous = fx.stopwatch.start(&mut fx.store, &a.id, fx.clock.now()).unwrap();

        assert_eq!(previous.map(|t| (t.id, t.duration)), Some((b.id.clone(), 7)));
        assert!(fx.stopwatch.is_active(&a.id));
        assert!(!fx.stopwatch.is_active(&b.id));

        let log = fx.scheduler.0.borrow();
        assert!(log.scheduled);
        assert_eq!(log.schedules, 2);
        // once before the first start, once when b stopped
        assert_eq!(log.cancels, 2);
    }

    #[test]
    fn test_start_same_task_keeps_start_instant() {
        let mut fx = fixture();
        let task = fx.store.create("x").unwrap();

        fx.stopwatch.start(&mut fx.store, &task.id, fx.clock.now()).unwrap();
        let started = fx.stopwatch.started_at();
        fx.clock.advance(3);
        assert!(fx.stopwatch.start(&mut fx.store, &task.id, fx.clock.now()).unwrap().is_none());

        assert_eq!(fx.stopwatch.started_at(), started);
        assert_eq!(fx.scheduler.0.borrow().schedules, 1);
    }

    #[test]
    fn test_stop_other_task_is_noop() {
        let mut fx = fixture();
        let a = fx.store.create("a").unwrap();
        let b = fx.store.create("b").unwrap();

        fx.stopwatch.start(&mut fx.store, &a.id, fx.clock.now()).unwrap();
        fx.clock.advance(4);
        assert!(fx.stopwatch.stop(&mut fx.store, &b.id, fx.clock.now()).unwrap().is_none());
        assert!(fx.stopwatch.is_active(&a.id));
        assert_eq!(fx.store.find(&b.id).unwrap().duration, 0);
    }

    #[test]
    fn test_reset_discards() {
        let mut fx = fixture();
        let task = fx.store.create("x").unwrap();
        fx.stopwatch.start(&mut fx.store, &task.id, fx.clock.now()).unwrap();
        fx.clock.advance(60);

        assert_eq!(fx.stopwatch.reset(), Some(task.id.clone()));
        assert!(fx.stopwatch.reset().is_none());
        assert_eq!(fx.store.find(&task.id).unwrap().duration, 0);
        assert!(!fx.scheduler.0.borrow().scheduled);
    }

    #[test]
    fn test_poll_notifies_subscribers_of_active_task() {
        let mut fx = fixture();
        let a = fx.store.create("a").unwrap();
        let b = fx.store.create("b").unwrap();
        fx.store.update(&a.id, TaskPatch::duration(100)).unwrap();

        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let sink = seen_a.clone();
        let sub_a = fx.stopwatch.subscribe(a.id.clone(), move |e| sink.borrow_mut().push(e.text.clone()));
        let sink = seen_b.clone();
        fx.stopwatch.subscribe(b.id.clone(), move |e| sink.borrow_mut().push(e.text.clone()));

        assert!(fx.stopwatch.poll(&fx.store, fx.clock.now()).is_none());

        fx.stopwatch.start(&mut fx.store, &a.id, fx.clock.now()).unwrap();
        fx.clock.advance(1);
        let event = fx.stopwatch.poll(&fx.store, fx.clock.now()).unwrap();
        assert_eq!(event.seconds, 101);
        fx.clock.advance(1);
        fx.stopwatch.poll(&fx.store, fx.clock.now());

        assert_eq!(*seen_a.borrow(), vec!["00:01:41".to_string(), "00:01:42".to_string()]);
        assert!(seen_b.borrow().is_empty());

        assert!(fx.stopwatch.unsubscribe(sub_a));
        assert!(!fx.stopwatch.unsubscribe(sub_a));
        fx.clock.advance(1);
        fx.stopwatch.poll(&fx.store, fx.clock.now());
        assert_eq!(seen_a.borrow().len(), 2);
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let mut fx = fixture();
        let task = fx.store.create("x").unwrap();
        fx.stopwatch.start(&mut fx.store, &task.id, fx.clock.now()).unwrap();
        fx.stopwatch.stop(&mut fx.store, &task.id, fx.clock.now()).unwrap();

        fx.clock.advance(5);
        assert!(fx.stopwatch.poll(&fx.store, fx.clock.now()).is_none());
    }
}
