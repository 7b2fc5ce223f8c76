//! Task management core: the store, the global stopwatch and edit sessions
//! behind one owner, so every mutation goes through the same rules.

pub mod clock;
pub mod session;
pub mod stopwatch;
pub mod store;

pub use clock::{Clock, IntervalScheduler, SystemClock, TickScheduler};
pub use session::{Draft, EditSessions, EditState};
pub use stopwatch::{Stopwatch, SubscriptionId, TickEvent};
pub use store::TaskStore;

use crate::domain::{duration, filter, Comment, StatusFilter, Task, TaskId, TaskPatch};
use crate::error::{TrackerError, TrackerResult};
use crate::persistence::KeyValueStore;
use crate::ticker;

pub struct Tracker {
    store: TaskStore,
    stopwatch: Stopwatch,
    sessions: EditSessions,
    clock: Box<dyn Clock>,
}

impl Tracker {
    pub fn new(
        kv: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn TickScheduler>,
    ) -> Self {
        Self {
            store: TaskStore::load(kv),
            stopwatch: Stopwatch::new(scheduler, ticker::stopwatch_period()),
            sessions: EditSessions::new(),
            clock,
        }
    }

    /// Tracker on the system clock with a loop-polled scheduler
    pub fn with_system_clock(kv: Box<dyn KeyValueStore>) -> Self {
        Self::new(kv, Box::new(SystemClock), Box::new(IntervalScheduler::new()))
    }

    // ---- queries ----

    pub fn all(&self) -> &[Task] {
        self.store.all()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.store.find(id)
    }

    pub fn visible(&self, status: StatusFilter, tag_filter: &str) -> Vec<&Task> {
        filter::visible(self.store.all(), status, tag_filter)
    }

    // ---- store operations ----

    pub fn create_task(&mut self, text: &str) -> TrackerResult<Task> {
        self.store.create(text)
    }

    #[cfg(test)]
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> TrackerResult<Task> {
        self.store.update(id, patch)
    }

    pub fn toggle_complete(&mut self, id: &TaskId) -> TrackerResult<Task> {
        let completed = self
            .store
            .find(id)
            .map(|t| t.completed)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        self.store.update(id, TaskPatch::completed(!completed))
    }

    /// Delete a task. Its running timer is discarded and its draft dropped first.
    pub fn delete_task(&mut self, id: &TaskId) -> TrackerResult<bool> {
        if self.stopwatch.is_active(id) {
            self.stopwatch.reset();
        }
        self.sessions.end(id);
        self.store.delete(id)
    }

    pub fn add_comment(&mut self, id: &TaskId, text: &str) -> TrackerResult<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TrackerError::Validation("comment is empty".to_string()));
        }
        let comment = Comment {
            text: text.to_string(),
            timestamp: self.clock.now(),
        };
        self.store.append_comment(id, comment)
    }

    // ---- stopwatch ----

    /// Start the timer for `id`; returns the task whose timer was stopped to make room
    pub fn start_timer(&mut self, id: &TaskId) -> TrackerResult<Option<Task>> {
        let now = self.clock.now();
        let previous = self.stopwatch.active_task().filter(|a| *a != id).cloned();
        let result = self.stopwatch.start(&mut self.store, id, now);
        if let Some(previous) = previous {
            if !self.stopwatch.is_active(&previous) {
                self.sync_draft_duration(&previous);
            }
        }
        result
    }

    /// Stop the timer for `id`; `None` when it was not running
    pub fn stop_timer(&mut self, id: &TaskId) -> TrackerResult<Option<Task>> {
        let now = self.clock.now();
        let was_active = self.stopwatch.is_active(id);
        let result = self.stopwatch.stop(&mut self.store, id, now);
        if was_active {
            self.sync_draft_duration(id);
        }
        result
    }

    /// Point an open draft's duration at the committed value
    ///
    /// Runs after every commit, including one whose write failed, since the
    /// in-memory duration is updated either way.
    fn sync_draft_duration(&mut self, id: &TaskId) {
        if let (Some(task), Some(draft)) = (self.store.find(id), self.sessions.draft_mut(id)) {
            draft.duration = duration::encode(task.duration);
        }
    }

    /// Start when stopped, stop when running
    pub fn toggle_timer(&mut self, id: &TaskId) -> TrackerResult<Option<Task>> {
        if self.stopwatch.is_active(id) {
            self.stop_timer(id)
        } else {
            self.start_timer(id)
        }
    }

    pub fn is_timer_active(&self, id: &TaskId) -> bool {
        self.stopwatch.is_active(id)
    }

    pub fn active_timer(&self) -> Option<&TaskId> {
        self.stopwatch.active_task()
    }

    /// Stored duration plus the running timer's elapsed time
    pub fn live_duration(&self, id: &TaskId) -> Option<u64> {
        let task = self.store.find(id)?;
        Some(self.stopwatch.live_duration(task, self.clock.now()))
    }

    pub fn live_duration_text(&self, id: &TaskId) -> Option<String> {
        self.live_duration(id).map(duration::encode)
    }

    pub fn subscribe_tick(
        &mut self,
        id: TaskId,
        callback: impl FnMut(&TickEvent) + 'static,
    ) -> SubscriptionId {
        self.stopwatch.subscribe(id, callback)
    }

    pub fn unsubscribe_tick(&mut self, subscription: SubscriptionId) -> bool {
        self.stopwatch.unsubscribe(subscription)
    }

    /// Called by the host loop; emits a tick when one is due
    pub fn poll_tick(&mut self) -> Option<TickEvent> {
        let now = self.clock.now();
        self.stopwatch.poll(&self.store, now)
    }

    /// Stop and commit the running timer, if any
    pub fn shutdown(&mut self) -> TrackerResult<Option<Task>> {
        match self.stopwatch.active_task().cloned() {
            Some(id) => self.stop_timer(&id),
            None => Ok(None),
        }
    }

    // ---- edit sessions ----

    pub fn edit_state(&self, id: &TaskId) -> EditState {
        self.sessions.state(id)
    }

    /// Enter edit mode, capturing the task's fields (with live duration) as a draft
    pub fn begin_edit(&mut self, id: &TaskId) -> TrackerResult<&Draft> {
        let task = self
            .store
            .find(id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        let live = self.stopwatch.live_duration(task, self.clock.now());
        self.sessions.begin(task, live)
    }

    pub fn draft(&self, id: &TaskId) -> Option<&Draft> {
        self.sessions.draft(id)
    }

    pub fn draft_mut(&mut self, id: &TaskId) -> Option<&mut Draft> {
        self.sessions.draft_mut(id)
    }

    /// Leave edit mode without saving
    pub fn cancel_edit(&mut self, id: &TaskId) -> bool {
        self.sessions.end(id).is_some()
    }

    /// Validate `draft` and save it, leaving edit mode
    ///
    /// When the task owns the running timer, the timer is stopped first and
    /// the committed duration replaces whatever the draft's duration says.
    /// On any failure the session stays open with `draft` kept.
    pub fn commit_edit(&mut self, id: &TaskId, draft: Draft) -> TrackerResult<Task> {
        if !self.store.contains(id) || !self.sessions.is_editing(id) {
            return Err(TrackerError::NotFound(id.clone()));
        }

        let timer_running = self.stopwatch.is_active(id);
        let patch = draft.to_patch(timer_running);
        self.sessions.replace(id, draft);
        let patch = patch?;

        // The session outlives a failed write so the save can be retried
        if timer_running {
            self.stop_timer(id)?;
        }
        let saved = self.store.update(id, patch)?;
        self.sessions.end(id);
        Ok(saved)
    }

    /// Commit the draft held by the session
    pub fn commit_open_draft(&mut self, id: &TaskId) -> TrackerResult<Task> {
        let draft = self
            .sessions
            .draft(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(id.clone()))?;
        self.commit_edit(id, draft)
    }
}
