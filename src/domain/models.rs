use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u16 = 1440;
pub const MIN_DURATION_MIN: u16 = 5;
pub const SNAP_MINUTES: u16 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Focus,
    Admin,
    Creative,
    Break,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Focus,
        Category::Admin,
        Category::Creative,
        Category::Break,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Admin => "admin",
            Self::Creative => "creative",
            Self::Break => "break",
        }
    }
}

/// Cosmetic palette token. Carries no behavior and is unrelated to [`Category`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    Coral,
    Amber,
    Sage,
    Sky,
    Lavender,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub duration_min: u16,
    pub category: Category,
    pub color: PaletteColor,
    /// Minute of day in `[0, 1440)`, or `None` while the task is unplaced.
    pub start_min: Option<u16>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        if self.duration_min < MIN_DURATION_MIN {
            return Err(format!("task.duration_min must be >= {MIN_DURATION_MIN}"));
        }
        if let Some(start) = self.start_min {
            if start >= MINUTES_PER_DAY {
                return Err(format!("task.start_min must be < {MINUTES_PER_DAY}"));
            }
        }
        Ok(())
    }

    pub fn is_placed(&self) -> bool {
        self.start_min.is_some()
    }

    /// End minute in the linear frame of the task's start, so it may exceed 1440.
    pub fn linear_end(&self) -> Option<u32> {
        self.start_min
            .map(|start| u32::from(start) + u32::from(self.duration_min))
    }
}

/// Input of the task-creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub icon: String,
    pub duration_min: u16,
    pub category: Category,
    pub color: PaletteColor,
}

impl NewTask {
    pub fn new(title: impl Into<String>, duration_min: u16) -> Self {
        Self {
            title: title.into(),
            icon: String::new(),
            duration_min,
            category: Category::Focus,
            color: PaletteColor::Sky,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_color(mut self, color: PaletteColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Builds an unplaced task. Durations are snapped to the grid and floored at the minimum.
    pub fn into_task(self, id: String) -> Result<Task, String> {
        let title = self.title.trim();
        validate_non_empty(title, "task.title")?;
        let task = Task {
            id,
            title: title.to_string(),
            icon: self.icon.trim().to_string(),
            duration_min: normalize_duration(self.duration_min),
            category: self.category,
            color: self.color,
            start_min: None,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Partial update coming from the task edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub duration_min: Option<u16>,
    pub category: Option<Category>,
    pub color: Option<PaletteColor>,
}

impl TaskPatch {
    pub fn apply_to(&self, task: &Task) -> Result<Task, String> {
        let mut updated = task.clone();
        if let Some(title) = self.title.as_deref() {
            let title = title.trim();
            validate_non_empty(title, "task.title")?;
            updated.title = title.to_string();
        }
        if let Some(icon) = self.icon.as_deref() {
            updated.icon = icon.trim().to_string();
        }
        if let Some(duration) = self.duration_min {
            updated.duration_min = normalize_duration(duration);
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(color) = self.color {
            updated.color = color;
        }
        updated.validate()?;
        Ok(updated)
    }
}

/// Read-only projection of one day's task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub scheduled: Vec<Task>,
    pub unplaced: Vec<Task>,
}

impl DaySchedule {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let (mut scheduled, unplaced): (Vec<Task>, Vec<Task>) =
            tasks.iter().cloned().partition(Task::is_placed);
        scheduled.sort_by_key(|task| task.start_min);
        Self {
            scheduled,
            unplaced,
        }
    }

    pub fn total_scheduled_minutes(&self) -> u32 {
        self.scheduled
            .iter()
            .map(|task| u32::from(task.duration_min))
            .sum()
    }

    pub fn category_minutes(&self, category: Category) -> u32 {
        self.scheduled
            .iter()
            .filter(|task| task.category == category)
            .map(|task| u32::from(task.duration_min))
            .sum()
    }

    pub fn category_totals(&self) -> Vec<(Category, u32)> {
        Category::ALL
            .iter()
            .map(|category| (*category, self.category_minutes(*category)))
            .collect()
    }
}

fn normalize_duration(duration_min: u16) -> u16 {
    let snapped = (duration_min.saturating_add(SNAP_MINUTES / 2) / SNAP_MINUTES) * SNAP_MINUTES;
    snapped.clamp(MIN_DURATION_MIN, MINUTES_PER_DAY)
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}
