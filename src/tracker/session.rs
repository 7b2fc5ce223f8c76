use crate::domain::{duration, parse_tags, Task, TaskId, TaskPatch, TaskStatus};
use crate::error::{TrackerError, TrackerResult};
use std::collections::HashMap;

/// Edit state of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
}

/// In-progress field values of a task being edited
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub text: String,
    pub status: TaskStatus,
    /// Comma-separated tags
    pub tags: String,
    /// `HH:MM:SS`, or the shorter `MM:SS` / `SS` forms
    pub duration: String,
    pub attachment: String,
}

impl Draft {
    /// Capture a task's fields; `live_seconds` includes any running timer
    pub fn capture(task: &Task, live_seconds: u64) -> Self {
        Self {
            text: task.text.clone(),
            status: task.status,
            tags: task.tags_joined(),
            duration: duration::encode(live_seconds),
            attachment: task.attachment.clone(),
        }
    }

    /// Validate and normalize into a patch
    ///
    /// With `timer_running` the duration text is ignored, since the stopwatch
    /// commit supplies the duration.
    pub fn to_patch(&self, timer_running: bool) -> TrackerResult<TaskPatch> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(TrackerError::Validation("task text is empty".to_string()));
        }

        let duration = if timer_running {
            None
        } else {
            Some(duration::decode(&self.duration)?)
        };

        Ok(TaskPatch {
            text: Some(text.to_string()),
            completed: None,
            status: Some(self.status),
            tags: Some(parse_tags(&self.tags)),
            duration,
            attachment: Some(self.attachment.trim().to_string()),
        })
    }
}

/// Open drafts, keyed by task. Several tasks may be edited at once.
#[derive(Debug, Default)]
pub struct EditSessions {
    drafts: HashMap<TaskId, Draft>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &TaskId) -> EditState {
        if self.drafts.contains_key(id) {
            EditState::Editing
        } else {
            EditState::Viewing
        }
    }

    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.state(id) == EditState::Editing
    }

    /// Open a draft; an existing draft is left untouched
    pub fn begin(&mut self, task: &Task, live_seconds: u64) -> TrackerResult<&Draft> {
        if self.drafts.contains_key(&task.id) {
            return Err(TrackerError::AlreadyEditing(task.id.clone()));
        }
        Ok(self
            .drafts
            .entry(task.id.clone())
            .or_insert_with(|| Draft::capture(task, live_seconds)))
    }

    pub fn draft(&self, id: &TaskId) -> Option<&Draft> {
        self.drafts.get(id)
    }

    pub fn draft_mut(&mut self, id: &TaskId) -> Option<&mut Draft> {
        self.drafts.get_mut(id)
    }

    /// Replace the stored draft of an open session
    pub fn replace(&mut self, id: &TaskId, draft: Draft) {
        if let Some(slot) = self.drafts.get_mut(id) {
            *slot = draft;
        }
    }

    /// Close a session, returning its draft
    pub fn end(&mut self, id: &TaskId) -> Option<Draft> {
        self.drafts.remove(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }
}
