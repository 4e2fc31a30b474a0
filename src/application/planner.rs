use crate::application::bootstrap::bootstrap_workspace;
use crate::domain::gesture::{Dial, GestureContext, Intent};
use crate::domain::ids::{IdGenerator, TimestampIdGenerator};
use crate::domain::models::{DaySchedule, NewTask, Task, TaskPatch};
use crate::domain::monitor::{self, ClockReading, FocusStatus};
use crate::domain::schedule::{Mutation, apply_mutation, find_task};
use crate::domain::time_angle::DisplayMode;
use crate::infrastructure::config::{PlannerSettings, load_app_config, save_display_mode};
use crate::infrastructure::day_store::{DayStore, SqliteDayStore};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::export;
use chrono::{Duration, Local, NaiveDate, NaiveTime, Utc};
use log::{error, info};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

/// Everything the day screen shows, as one immutable value.
///
/// Planner operations consume a view and hand back the next one; nothing
/// about the current date, selection or display mode lives in the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    pub selected: Option<String>,
    /// Unplaced task waiting for a tap on the dial.
    pub placing: Option<String>,
    pub editing: Option<String>,
    pub display_mode: DisplayMode,
    /// Uncommitted result of an in-progress drag, for rendering only.
    pub drag_preview: Option<Mutation>,
}

impl DayView {
    pub fn new(date: NaiveDate, tasks: Vec<Task>, display_mode: DisplayMode) -> Self {
        Self {
            date,
            tasks,
            selected: None,
            placing: None,
            editing: None,
            display_mode,
            drag_preview: None,
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected
            .as_deref()
            .and_then(|task_id| find_task(&self.tasks, task_id))
    }

    pub fn gesture_context<'a>(&'a self, dial: &'a Dial) -> GestureContext<'a> {
        GestureContext {
            dial,
            tasks: &self.tasks,
            mode: self.display_mode,
            placing: self.placing.is_some(),
        }
    }
}

pub struct Planner<S: DayStore> {
    store: S,
    ids: Box<dyn IdGenerator>,
    settings: PlannerSettings,
    config_dir: Option<PathBuf>,
    logs_dir: PathBuf,
    log_guard: Mutex<()>,
}

impl Planner<SqliteDayStore> {
    /// Bootstraps `workspace_root` and opens the SQLite-backed planner.
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let now_minute = ClockReading::from_time(&Local::now().time()).minute;
        let settings = load_app_config(&bootstrap.config_dir)?.settings(now_minute)?;

        Ok(Self {
            store: SqliteDayStore::new(&bootstrap.database_path),
            ids: Box::new(TimestampIdGenerator::default()),
            settings,
            config_dir: Some(bootstrap.config_dir),
            logs_dir: bootstrap.logs_dir,
            log_guard: Mutex::new(()),
        })
    }
}

impl<S: DayStore> Planner<S> {
    /// Planner over an arbitrary store. Display-mode changes are not written
    /// back to any config file.
    pub fn with_store(
        store: S,
        settings: PlannerSettings,
        logs_dir: PathBuf,
    ) -> Result<Self, InfraError> {
        fs::create_dir_all(&logs_dir)?;
        Ok(Self {
            store,
            ids: Box::new(TimestampIdGenerator::default()),
            settings,
            config_dir: None,
            logs_dir,
            log_guard: Mutex::new(()),
        })
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn command_log_path(&self) -> PathBuf {
        self.logs_dir.join("commands.log")
    }

    pub fn open_day(&self, date: NaiveDate) -> Result<DayView, InfraError> {
        self.load_view(date, self.settings.display_mode, "open_day")
    }

    /// Moves to another date, keeping the display mode and dropping all transient state.
    pub fn shift_day(&self, view: DayView, days: i64) -> Result<DayView, InfraError> {
        let date = view
            .date
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| {
                self.command_error(
                    "shift_day",
                    InfraError::InvalidInput(format!("date out of range: {} + {days}d", view.date)),
                )
            })?;
        self.load_view(date, view.display_mode, "shift_day")
    }

    /// Creation-form draft seeded with the configured default duration.
    pub fn new_draft(&self, title: impl Into<String>) -> NewTask {
        NewTask::new(title, self.settings.default_duration_minutes)
    }

    pub fn create_task(&self, view: DayView, draft: NewTask) -> Result<DayView, InfraError> {
        let task = draft
            .into_task(self.ids.next_id("tsk"))
            .map_err(|message| self.command_error("create_task", InfraError::InvalidInput(message)))?;
        let task_id = task.id.clone();

        let mut tasks = view.tasks.clone();
        tasks.push(task);
        let next = DayView { tasks, ..view };
        self.persist("create_task", &next)?;
        self.log_info("create_task", &format!("date={} task_id={task_id}", next.date));
        Ok(next)
    }

    /// Edits the non-positional fields of a task. Placement is left untouched.
    pub fn update_task(
        &self,
        view: DayView,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<DayView, InfraError> {
        let Some(current) = find_task(&view.tasks, task_id) else {
            return Err(self.command_error(
                "update_task",
                InfraError::InvalidInput(format!("task not found: {task_id}")),
            ));
        };
        let updated = patch
            .apply_to(current)
            .map_err(|message| self.command_error("update_task", InfraError::InvalidInput(message)))?;

        let tasks = view
            .tasks
            .iter()
            .map(|task| {
                if task.id == task_id {
                    updated.clone()
                } else {
                    task.clone()
                }
            })
            .collect();
        let editing = view.editing.clone().filter(|editing| editing != task_id);
        let next = DayView {
            tasks,
            editing,
            ..view
        };
        self.persist("update_task", &next)?;
        self.log_info("update_task", &format!("date={} task_id={task_id}", next.date));
        Ok(next)
    }

    /// Arms placement of an unplaced task; the next tap on empty dial space places it.
    pub fn begin_placing(&self, view: DayView, task_id: &str) -> Result<DayView, InfraError> {
        match find_task(&view.tasks, task_id) {
            Some(task) if !task.is_placed() => {}
            Some(_) => {
                return Err(self.command_error(
                    "begin_placing",
                    InfraError::InvalidInput(format!("task is already placed: {task_id}")),
                ));
            }
            None => {
                return Err(self.command_error(
                    "begin_placing",
                    InfraError::InvalidInput(format!("task not found: {task_id}")),
                ));
            }
        }
        self.log_info("begin_placing", &format!("task_id={task_id}"));
        Ok(DayView {
            placing: Some(task_id.to_string()),
            ..view
        })
    }

    pub fn cancel_placing(&self, view: DayView) -> DayView {
        DayView {
            placing: None,
            ..view
        }
    }

    /// Selecting an id that is not in the view leaves the selection unchanged.
    pub fn select(&self, view: DayView, task_id: &str) -> DayView {
        if find_task(&view.tasks, task_id).is_none() {
            return view;
        }
        DayView {
            selected: Some(task_id.to_string()),
            ..view
        }
    }

    pub fn deselect(&self, view: DayView) -> DayView {
        DayView {
            selected: None,
            editing: None,
            ..view
        }
    }

    pub fn set_display_mode(&self, view: DayView, mode: DisplayMode) -> DayView {
        if let Some(config_dir) = self.config_dir.as_deref() {
            self.remember_display_mode(config_dir, mode);
        }
        self.log_info("set_display_mode", &format!("mode={}", mode.as_str()));
        DayView {
            display_mode: mode,
            ..view
        }
    }

    pub fn toggle_display_mode(&self, view: DayView, now: NaiveTime) -> DayView {
        let now_minute = ClockReading::from_time(&now).minute;
        let mode = view.display_mode.toggle(now_minute);
        self.set_display_mode(view, mode)
    }

    /// Applies a schedule mutation and persists the day when it took effect.
    ///
    /// Refused mutations (unknown id, overlap rejection, split of an unplaced
    /// task) return the view with its tasks untouched.
    pub fn mutate(&self, view: DayView, mutation: Mutation) -> Result<DayView, InfraError> {
        let command = mutation.name();
        let outcome = apply_mutation(
            &view.tasks,
            &mutation,
            &self.settings.schedule_policy,
            self.ids.as_ref(),
        );
        if !outcome.is_applied() {
            self.log_info(
                command,
                &format!(
                    "skipped task_id={} status={:?}",
                    mutation.task_id(),
                    outcome.status
                ),
            );
            return Ok(DayView {
                drag_preview: None,
                ..view
            });
        }

        let target = mutation.task_id();
        let removes_target = matches!(
            mutation,
            Mutation::Split { .. } | Mutation::Delete { .. }
        );
        let clears_selection = match mutation {
            Mutation::Split { .. } => true,
            Mutation::Delete { .. } | Mutation::Unschedule { .. } => {
                view.selected.as_deref() == Some(target)
            }
            _ => false,
        };
        let clears_placing = view.placing.as_deref() == Some(target)
            && !matches!(mutation, Mutation::Unschedule { .. });

        let next = DayView {
            tasks: outcome.tasks,
            selected: if clears_selection {
                None
            } else {
                view.selected.clone()
            },
            placing: if clears_placing {
                None
            } else {
                view.placing.clone()
            },
            editing: view
                .editing
                .clone()
                .filter(|editing| !(removes_target && editing == target)),
            drag_preview: None,
            ..view
        };
        self.persist(command, &next)?;
        self.log_info(command, &format!("date={} task_id={target}", next.date));
        Ok(next)
    }

    /// Routes a recognizer intent to the matching planner operation.
    pub fn handle_intent(&self, view: DayView, intent: Intent) -> Result<DayView, InfraError> {
        match intent {
            Intent::PlaceAt { minute } => match view.placing.clone() {
                Some(task_id) => self.mutate(
                    view,
                    Mutation::Place {
                        task_id,
                        start_min: minute,
                    },
                ),
                None => Ok(view),
            },
            Intent::Select { task_id } => Ok(self.select(view, &task_id)),
            Intent::Deselect => Ok(self.deselect(view)),
            Intent::EditRequest { task_id } => {
                if find_task(&view.tasks, &task_id).is_none() {
                    return Ok(view);
                }
                Ok(DayView {
                    selected: Some(task_id.clone()),
                    editing: Some(task_id),
                    ..view
                })
            }
            Intent::SplitRequest { task_id, minute } => self.mutate(
                view,
                Mutation::Split {
                    task_id,
                    at_min: minute,
                },
            ),
            Intent::DragStart { .. } | Intent::DragCancel { .. } => Ok(DayView {
                drag_preview: None,
                ..view
            }),
            Intent::DragMove { preview, .. } => Ok(DayView {
                drag_preview: Some(preview),
                ..view
            }),
            Intent::DragEnd { mutation } => self.mutate(view, mutation),
        }
    }

    pub fn schedule(&self, view: &DayView) -> DaySchedule {
        DaySchedule::from_tasks(&view.tasks)
    }

    pub fn focus_status(&self, view: &DayView, now: NaiveTime) -> Option<FocusStatus> {
        monitor::focus_status(view.selected_task(), ClockReading::from_time(&now))
    }

    pub fn export_ics(&self, view: &DayView) -> String {
        let calendar = export::to_ics(view.date, &view.tasks, Utc::now());
        self.log_info("export_ics", &format!("date={}", view.date));
        calendar
    }

    pub fn export_json(&self, view: &DayView) -> Result<String, InfraError> {
        let exported =
            export::to_json(view.date, &view.tasks).map_err(|error| self.command_error("export_json", error))?;
        self.log_info("export_json", &format!("date={}", view.date));
        Ok(exported)
    }

    pub fn google_calendar_url(&self, view: &DayView, task_id: &str) -> Result<Url, InfraError> {
        let Some(task) = find_task(&view.tasks, task_id) else {
            return Err(self.command_error(
                "google_calendar_url",
                InfraError::InvalidInput(format!("task not found: {task_id}")),
            ));
        };
        export::google_calendar_url(view.date, task)
            .map_err(|error| self.command_error("google_calendar_url", error))
    }

    pub fn command_error(&self, command: &str, error: InfraError) -> InfraError {
        self.log_error(command, &error.to_string());
        error
    }

    pub fn log_info(&self, command: &str, message: &str) {
        info!("command={command} {message}");
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        error!("command={command} {message}");
        self.append_log("error", command, message);
    }

    fn load_view(
        &self,
        date: NaiveDate,
        display_mode: DisplayMode,
        command: &str,
    ) -> Result<DayView, InfraError> {
        let tasks = self
            .store
            .load(date)
            .map_err(|error| self.command_error(command, error))?;
        self.log_info(command, &format!("date={date} tasks={}", tasks.len()));
        Ok(DayView::new(date, tasks, display_mode))
    }

    fn persist(&self, command: &str, view: &DayView) -> Result<(), InfraError> {
        self.store
            .save(view.date, &view.tasks)
            .map_err(|error| self.command_error(command, error))
    }

    fn remember_display_mode(&self, config_dir: &Path, mode: DisplayMode) {
        if let Err(error) = save_display_mode(config_dir, mode) {
            self.log_error("set_display_mode", &error.to_string());
        }
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.command_log_path())
        {
            let _ = writeln!(file, "{}", payload);
        }
    }
}
