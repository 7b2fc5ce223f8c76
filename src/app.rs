use crate::domain::{duration, StatusFilter, Task, TaskId, UiMode};
use crate::error::{TrackerError, TrackerResult};
use crate::persistence::{load_metadata, save_metadata, AppMetadata, KeyValueStore};
use crate::tracker::{SubscriptionId, TickEvent, Tracker};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// Which single-line form is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewTask,
    Comment,
}

/// Single-line input form state (new task, new comment)
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub kind: FormKind,
    pub value: String,
}

/// Fields of the edit form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Text,
    Status,
    Tags,
    Duration,
    Attachment,
}

impl EditField {
    pub const ALL: [EditField; 5] = [
        EditField::Text,
        EditField::Status,
        EditField::Tags,
        EditField::Duration,
        EditField::Attachment,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            EditField::Text => "Text",
            EditField::Status => "Status",
            EditField::Tags => "Tags (comma-separated)",
            EditField::Duration => "Duration (HH:MM:SS)",
            EditField::Attachment => "Attachment",
        }
    }
}

/// Edit form bound to the tracker's draft for `task_id`
#[derive(Debug, Clone)]
pub struct EditFormState {
    pub task_id: TaskId,
    pub field: EditField,
    /// Tick subscription feeding `live` while the form is open
    subscription: SubscriptionId,
    /// Last ticked duration text of the task's running timer
    live: Rc<RefCell<Option<String>>>,
}

/// Filter form state; applied on submit
#[derive(Debug, Clone)]
pub struct FilterFormState {
    pub status: StatusFilter,
    pub tags: String,
}

/// Main application state
pub struct AppState {
    pub tracker: Tracker,
    meta_kv: Box<dyn KeyValueStore>,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub edit_form: Option<EditFormState>,
    pub filter_form: Option<FilterFormState>,
    pub status_filter: StatusFilter,
    pub tag_filter: String,
    pub show_details: bool,
    /// Latest tick of the running timer
    pub live_tick: Option<TickEvent>,
    /// Status line message (errors, confirmations)
    pub message: Option<String>,
    pub needs_save: bool,
}

impl AppState {
    pub fn new(tracker: Tracker, meta_kv: Box<dyn KeyValueStore>) -> Self {
        let metadata = load_metadata(meta_kv.as_ref());
        let status_filter = metadata.status_filter.parse().unwrap_or_else(|_| {
            tracing::warn!(filter = %metadata.status_filter, "unknown saved status filter");
            StatusFilter::All
        });

        Self {
            tracker,
            meta_kv,
            selected_index: 0,
            ui_mode: UiMode::Normal,
            input_form: None,
            edit_form: None,
            filter_form: None,
            status_filter,
            tag_filter: metadata.tag_filter,
            show_details: metadata.show_details,
            live_tick: None,
            message: None,
            needs_save: false,
        }
    }

    /// Save view preferences
    pub fn save(&mut self) -> Result<()> {
        let metadata = AppMetadata {
            status_filter: self.status_filter.label().to_string(),
            tag_filter: self.tag_filter.clone(),
            show_details: self.show_details,
        };
        save_metadata(self.meta_kv.as_mut(), &metadata)?;
        self.needs_save = false;
        Ok(())
    }

    /// Report a tracker result on the status line; returns the success value
    fn report<T>(&mut self, result: TrackerResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) if e.is_silent() => None,
            Err(e) => {
                tracing::debug!(error = %e, "operation rejected");
                self.message = Some(e.to_string());
                None
            }
        }
    }

    // ---- list and selection ----

    /// Tasks shown in the list under the current filters
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tracker.visible(self.status_filter, &self.tag_filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected_index).copied()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id.clone())
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.visible_tasks().len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_tasks().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    fn select_task(&mut self, id: &TaskId) {
        if let Some(idx) = self.visible_tasks().iter().position(|t| &t.id == id) {
            self.selected_index = idx;
        }
    }

    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
        self.needs_save = true;
    }

    // ---- task actions ----

    /// Start or stop the stopwatch of the selected task
    pub fn toggle_timer_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.toggle_timer(&id);
        }
    }

    fn toggle_timer(&mut self, id: &TaskId) {
        let was_running = self.tracker.is_timer_active(id);
        let result = self.tracker.toggle_timer(id);
        if let Some(committed) = self.report(result) {
            self.live_tick = None;
            if let Some(form) = &self.edit_form {
                form.live.replace(None);
            }
            self.message = committed.map(|task| {
                let verb = if was_running { "Stopped" } else { "Switched from" };
                format!(
                    "{} \"{}\" at {}",
                    verb,
                    task.text,
                    duration::encode(task.duration)
                )
            });
        }
    }

    pub fn toggle_complete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.tracker.toggle_complete(&id);
            self.report(result);
            self.clamp_selection();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.tracker.delete_task(&id);
            if self.report(result) == Some(true) {
                if self.edit_form.as_ref().is_some_and(|f| f.task_id == id) {
                    self.close_edit_form();
                    self.ui_mode = UiMode::Normal;
                }
                self.live_tick = self.live_tick.take().filter(|t| t.task_id != id);
                self.message = Some("Task deleted".to_string());
            }
            self.clamp_selection();
        }
    }

    // ---- single-line forms ----

    pub fn start_add_task(&mut self) {
        self.input_form = Some(InputFormState {
            kind: FormKind::NewTask,
            value: String::new(),
        });
        self.ui_mode = UiMode::AddingTask;
    }

    pub fn start_add_comment(&mut self) {
        if self.selected_task().is_none() {
            return;
        }
        self.input_form = Some(InputFormState {
            kind: FormKind::Comment,
            value: String::new(),
        });
        self.ui_mode = UiMode::AddingComment;
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            form.value.push(c);
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.value.pop();
        }
    }

    /// Submit the open form; it stays open when the input is rejected
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.clone() else {
            return;
        };

        let accepted = match form.kind {
            FormKind::NewTask => {
                let result = self.tracker.create_task(&form.value);
                match self.report(result) {
                    Some(task) => {
                        self.select_task(&task.id);
                        true
                    }
                    None => false,
                }
            }
            FormKind::Comment => match self.selected_id() {
                Some(id) => {
                    let result = self.tracker.add_comment(&id, &form.value);
                    self.report(result).is_some()
                }
                None => true,
            },
        };

        if accepted {
            self.input_form = None;
            self.ui_mode = UiMode::Normal;
            self.message = None;
        }
    }

    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    // ---- edit form ----

    /// Enter edit mode for the selected task
    pub fn start_edit_task(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.tracker.begin_edit(&id).map(|_| ());
        match result {
            Ok(()) => {}
            // An earlier session for this task is still open: resume it
            Err(TrackerError::AlreadyEditing(_)) => {}
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        }

        let live = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&live);
        let subscription = self
            .tracker
            .subscribe_tick(id.clone(), move |event| {
                sink.replace(Some(event.text.clone()));
            });

        self.edit_form = Some(EditFormState {
            task_id: id,
            field: EditField::Text,
            subscription,
            live,
        });
        self.ui_mode = UiMode::EditingTask;
    }

    /// Drop the edit form and its tick subscription
    fn close_edit_form(&mut self) -> Option<EditFormState> {
        let form = self.edit_form.take()?;
        self.tracker.unsubscribe_tick(form.subscription);
        Some(form)
    }

    /// Live duration text for the edit form while the task's timer runs
    pub fn edit_live_text(&self) -> Option<String> {
        let form = self.edit_form.as_ref()?;
        if !self.tracker.is_timer_active(&form.task_id) {
            return None;
        }
        let ticked = form.live.borrow().clone();
        ticked.or_else(|| self.tracker.live_duration_text(&form.task_id))
    }

    pub fn edit_form_next_field(&mut self) {
        if let Some(form) = &mut self.edit_form {
            form.field = form.field.next();
        }
    }

    /// Whether the duration field is locked because the task's timer runs
    pub fn edit_duration_locked(&self) -> bool {
        self.edit_form
            .as_ref()
            .is_some_and(|f| self.tracker.is_timer_active(&f.task_id))
    }

    pub fn edit_form_add_char(&mut self, c: char) {
        let locked = self.edit_duration_locked();
        let Some(form) = &self.edit_form else {
            return;
        };
        let field = form.field;
        let Some(draft) = self.tracker.draft_mut(&form.task_id) else {
            return;
        };
        match field {
            EditField::Text => draft.text.push(c),
            EditField::Tags => draft.tags.push(c),
            EditField::Duration if !locked => draft.duration.push(c),
            EditField::Attachment => draft.attachment.push(c),
            EditField::Status => {
                if c == ' ' {
                    draft.status = draft.status.next();
                }
            }
            EditField::Duration => {}
        }
    }

    pub fn edit_form_backspace(&mut self) {
        let locked = self.edit_duration_locked();
        let Some(form) = &self.edit_form else {
            return;
        };
        let field = form.field;
        let Some(draft) = self.tracker.draft_mut(&form.task_id) else {
            return;
        };
        match field {
            EditField::Text => {
                draft.text.pop();
            }
            EditField::Tags => {
                draft.tags.pop();
            }
            EditField::Duration if !locked => {
                draft.duration.pop();
            }
            EditField::Attachment => {
                draft.attachment.pop();
            }
            EditField::Status | EditField::Duration => {}
        }
    }

    /// Cycle the draft's status when the status field is focused
    pub fn edit_form_cycle_status(&mut self, forward: bool) {
        let Some(form) = &self.edit_form else {
            return;
        };
        if form.field != EditField::Status {
            return;
        }
        if let Some(draft) = self.tracker.draft_mut(&form.task_id) {
            draft.status = if forward {
                draft.status.next()
            } else {
                draft.status.prev()
            };
        }
    }

    /// Start or stop the timer of the task being edited
    pub fn edit_form_toggle_timer(&mut self) {
        if let Some(id) = self.edit_form.as_ref().map(|f| f.task_id.clone()) {
            self.toggle_timer(&id);
        }
    }

    /// Save the draft; the form stays open when validation or the write fails
    pub fn submit_edit_form(&mut self) {
        let Some(id) = self.edit_form.as_ref().map(|f| f.task_id.clone()) else {
            return;
        };
        let result = self.tracker.commit_open_draft(&id);
        if let Some(task) = self.report(result) {
            self.close_edit_form();
            self.ui_mode = UiMode::Normal;
            self.live_tick = None;
            self.message = None;
            self.select_task(&task.id);
            self.clamp_selection();
        }
    }

    pub fn cancel_edit_form(&mut self) {
        if let Some(form) = self.close_edit_form() {
            self.tracker.cancel_edit(&form.task_id);
        }
        self.ui_mode = UiMode::Normal;
    }

    // ---- filters ----

    pub fn start_filter_edit(&mut self) {
        self.filter_form = Some(FilterFormState {
            status: self.status_filter,
            tags: self.tag_filter.clone(),
        });
        self.ui_mode = UiMode::EditingFilter;
    }

    pub fn filter_form_cycle_status(&mut self) {
        if let Some(form) = &mut self.filter_form {
            form.status = form.status.next();
        }
    }

    pub fn filter_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.filter_form {
            form.tags.push(c);
        }
    }

    pub fn filter_form_backspace(&mut self) {
        if let Some(form) = &mut self.filter_form {
            form.tags.pop();
        }
    }

    pub fn submit_filter_form(&mut self) {
        if let Some(form) = self.filter_form.take() {
            self.apply_filters(form.status, form.tags);
        }
        self.ui_mode = UiMode::Normal;
    }

    pub fn cancel_filter_form(&mut self) {
        self.filter_form = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn clear_filters(&mut self) {
        self.apply_filters(StatusFilter::All, String::new());
    }

    fn apply_filters(&mut self, status: StatusFilter, tags: String) {
        let keep = self.selected_id();
        self.status_filter = status;
        self.tag_filter = tags;
        self.needs_save = true;
        self.selected_index = 0;
        if let Some(id) = keep {
            self.select_task(&id);
        }
        self.clamp_selection();
    }

    // ---- timers ----

    /// Poll the stopwatch; keeps the latest live value for the view
    pub fn tick(&mut self) {
        if let Some(event) = self.tracker.poll_tick() {
            self.live_tick = Some(event);
        }
    }

    /// Duration text of a task, `HH:MM:SS`; the running task shows its last tick
    pub fn duration_text(&self, task: &Task) -> String {
        match &self.live_tick {
            Some(tick) if tick.task_id == task.id && self.tracker.is_timer_active(&task.id) => {
                duration::encode(tick.seconds)
            }
            _ => self
                .tracker
                .live_duration_text(&task.id)
                .unwrap_or_else(|| duration::encode(task.duration)),
        }
    }

    /// Commit the running timer before exit
    pub fn shutdown(&mut self) {
        let result = self.tracker.shutdown();
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to commit running timer on exit");
        }
    }
}
